//! Pascal/Delphi outline scanner.
//!
//! Turns one source file into a tree of [`Entry`] values: the units,
//! types, routines, members, constants and variables it declares, each with
//! its signature, source span and attached documentation comments. Nothing
//! is type checked and malformed input never fails a scan.

pub mod builder;
pub mod comment;
pub mod diagnostic;
pub mod entry;
pub mod lexer;
pub mod options;
pub mod prototype;
pub mod recognizer;
pub mod stream;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use entry::{Entry, EntryId, EntryKind, EntryTree, Visibility};
pub use options::ScanOptions;
pub use prototype::parse_prototype;
pub use stream::{Location, Span};

use serde::Serialize;

/// File extensions handled by [`PascalOutlineParser`].
pub const PASCAL_EXTENSIONS: &[&str] = &["pas", "pp", "p", "dpr", "dpk", "lpr", "inc"];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no outline parser for `.{0}` files")]
    UnsupportedExtension(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Result of scanning one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutput {
    pub tree: EntryTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scan one buffer. `file` names the source for the entries' location
/// fields and, without a module header, the root entry.
pub fn scan(file: &str, src: &str, options: &ScanOptions) -> ScanOutput {
    let (lexemes, mut diagnostics) = lexer::Lexer::tokenize(src, options);
    let (tree, more) = recognizer::recognize(file, src, &lexemes, options);
    diagnostics.extend(more);
    diagnostics.sort_by_key(|d| (d.line, d.column));
    tracing::trace!(
        file,
        lexemes = lexemes.len(),
        entries = tree.len(),
        diagnostics = diagnostics.len(),
        "scanned"
    );
    ScanOutput { tree, diagnostics }
}

// -- Language front ends ------------------------------------------------------

/// What a documentation tool needs from a language front end.
pub trait OutlineParser: Send + Sync {
    /// Build the outline of one file.
    fn scan_file(&self, file: &str, source: &str) -> ScanOutput;

    /// Whether files with this extension must go through a preprocessor
    /// before [`OutlineParser::scan_file`].
    fn needs_preprocessing(&self, extension: &str) -> bool;

    /// Parse a standalone routine or property signature.
    fn parse_prototype(&self, text: &str) -> Entry;
}

#[derive(Debug, Clone, Default)]
pub struct PascalOutlineParser {
    options: ScanOptions,
}

impl PascalOutlineParser {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }
}

impl OutlineParser for PascalOutlineParser {
    fn scan_file(&self, file: &str, source: &str) -> ScanOutput {
        scan(file, source, &self.options)
    }

    fn needs_preprocessing(&self, _extension: &str) -> bool {
        // Conditional directives are left in place as trivia.
        false
    }

    fn parse_prototype(&self, text: &str) -> Entry {
        prototype::parse_prototype(text)
    }
}

/// Pick the front end for a file extension (without the dot, any case).
pub fn outline_parser_for(extension: &str, options: &ScanOptions) -> Result<Box<dyn OutlineParser>> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    if PASCAL_EXTENSIONS.contains(&ext.as_str()) {
        Ok(Box::new(PascalOutlineParser::new(options.clone())))
    } else {
        Err(Error::UnsupportedExtension(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_by_extension() {
        let parser = outline_parser_for("PAS", &ScanOptions::default()).unwrap();
        assert!(!parser.needs_preprocessing("pas"));
        let out = parser.scan_file("a.pas", "unit A; interface implementation end.");
        assert_eq!(out.tree.root().name, "A");
        assert_eq!(parser.parse_prototype("procedure P;").name, "P");

        let err = outline_parser_for("rs", &ScanOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "no outline parser for `.rs` files");
    }

    #[test]
    fn diagnostics_are_sorted() {
        let out = scan("x.pas", "procedure ;\n{ a *) b }\n}", &ScanOptions::default());
        let lines: Vec<u32> = out.diagnostics.iter().map(|d| d.line).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
        assert!(out
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::EmptyName));
    }

    #[test]
    fn parser_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PascalOutlineParser>();
    }
}
