//! Non-fatal scan diagnostics.
//!
//! A scan never fails on malformed source. The few conditions worth telling
//! the surrounding tool about are collected here and returned next to the
//! tree.

use crate::stream::Location;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A comment closer of the wrong style, e.g. `*)` ending a `{` comment.
    CommentStyleMismatch,
    /// A declaration header without a name.
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, at: Location, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: at.line,
            column: at.column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}
