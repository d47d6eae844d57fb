//! Scan configuration.

use serde::Deserialize;

/// Knobs for a single scan. `Default` matches Delphi conventions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScanOptions {
    /// Comments of the same style nest (Free Pascal FPC/ObjFPC modes).
    pub nested_comments: bool,
    /// Plain `{ ... }` comments count as documentation, not only `{! ... }`.
    pub brace_docs: bool,
    /// Maximum blank lines between a documentation comment and the
    /// declaration it documents. Past the limit the comment attaches to the
    /// preceding declaration instead. `None` means unlimited.
    pub doc_gap: Option<u32>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            nested_comments: false,
            brace_docs: true,
            doc_gap: None,
        }
    }
}
