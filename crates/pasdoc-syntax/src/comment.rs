//! Documentation comment classification and text cleanup.
//!
//! A comment is documentation when its opener carries a doc marker:
//!
//! | opener          | doc when                          |
//! |-----------------|-----------------------------------|
//! | `{`             | `{!`, or any `{` with `brace_docs` |
//! | `(*`            | `(**` or `(*!`                    |
//! | `//`            | `///` (not `////`) or `//!`       |
//!
//! A `<` right after the marker makes it explicit trailing documentation.

use crate::lexer::{CommentStyle, Lexeme, LexemeKind};
use crate::options::ScanOptions;
use crate::stream::Span;
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

// `*` / `!` decoration at the start of a line, as in
//   (**
//    * text
//    *)
static RE_MARGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[*!]+(?:[ \t]|$)").unwrap());

// -- Classification -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    /// Cleaned text.
    pub text: String,
    /// Explicit `<` trailing marker.
    pub trailing: bool,
    /// Raw text span in the source, markers excluded.
    pub span: Span,
    pub line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentClass {
    Documentation(DocComment),
    Ordinary,
}

/// Classify a comment lexeme. Anything that is not a comment (directives
/// included) is ordinary.
pub fn classify(src: &str, lexeme: &Lexeme, options: &ScanOptions) -> CommentClass {
    let LexemeKind::Comment(parts) = &lexeme.kind else {
        return CommentClass::Ordinary;
    };
    let body = src.get(parts.body.start..parts.body.end).unwrap_or("");
    let bytes = body.as_bytes();

    let marker = match (parts.style, bytes.first()) {
        (CommentStyle::Brace, Some(b'!')) => 1,
        (CommentStyle::Brace, _) if options.brace_docs => 0,
        (CommentStyle::ParenStar, Some(b'*' | b'!')) => 1,
        (CommentStyle::Line, Some(b'/')) if bytes.get(1) != Some(&b'/') => 1,
        (CommentStyle::Line, Some(b'!')) => 1,
        _ => return CommentClass::Ordinary,
    };
    let trailing = bytes.get(marker) == Some(&b'<');
    let skip = marker + usize::from(trailing);

    let raw = &body[skip..];
    CommentClass::Documentation(DocComment {
        text: clean(raw, parts.style),
        trailing,
        span: Span::new(parts.body.start + skip, parts.body.end),
        line: lexeme.start.line,
        end_line: lexeme.end.line,
    })
}

/// Strip decoration from a comment body and normalize its lines.
pub fn clean(raw: &str, style: CommentStyle) -> String {
    let raw = match style {
        CommentStyle::Line => raw,
        // `(** text **)` and `{! text !}`, but not `**bold**`
        _ => {
            let trimmed = raw.trim_end();
            let stripped = trimmed.trim_end_matches(['*', '!']);
            if stripped.is_empty() || stripped.ends_with(char::is_whitespace) {
                stripped
            } else {
                trimmed
            }
        }
    };
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = normalized
        .split('\n')
        .map(|line| RE_MARGIN.replace(line, "").trim_end().to_string())
        .collect();

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let indent = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn classify_first(src: &str, options: &ScanOptions) -> CommentClass {
        let (lexemes, _) = Lexer::tokenize(src, options);
        let comment = lexemes
            .iter()
            .find(|l| matches!(l.kind, LexemeKind::Comment(_) | LexemeKind::Directive(_)))
            .expect("comment lexeme");
        classify(src, comment, options)
    }

    fn doc(src: &str) -> Option<DocComment> {
        match classify_first(src, &ScanOptions::default()) {
            CommentClass::Documentation(d) => Some(d),
            CommentClass::Ordinary => None,
        }
    }

    #[test]
    fn doc_openers() {
        assert_eq!(doc("{! text }").map(|d| d.text), Some("text".into()));
        assert_eq!(doc("(** text *)").map(|d| d.text), Some("text".into()));
        assert_eq!(doc("(*! text *)").map(|d| d.text), Some("text".into()));
        assert_eq!(doc("/// text").map(|d| d.text), Some("text".into()));
        assert_eq!(doc("//! text").map(|d| d.text), Some("text".into()));
    }

    #[test]
    fn ordinary_comments() {
        assert_eq!(doc("(* plain *)"), None);
        assert_eq!(doc("(**)"), None);
        assert_eq!(doc("// plain"), None);
        assert_eq!(doc("//// banner"), None);
        assert_eq!(doc("{$mode delphi}"), None);
    }

    #[test]
    fn plain_brace_follows_option() {
        assert_eq!(doc("{ desc }").map(|d| d.text), Some("desc".into()));
        let strict = ScanOptions {
            brace_docs: false,
            ..ScanOptions::default()
        };
        assert_eq!(classify_first("{ desc }", &strict), CommentClass::Ordinary);
        assert!(matches!(
            classify_first("{! desc }", &strict),
            CommentClass::Documentation(_)
        ));
    }

    #[test]
    fn trailing_marker() {
        let d = doc("//!< the count").unwrap();
        assert!(d.trailing);
        assert_eq!(d.text, "the count");
        assert!(doc("{!< x }").unwrap().trailing);
        assert!(!doc("{! x }").unwrap().trailing);
    }

    #[test]
    fn margin_stars_are_stripped() {
        let src = "(**\n * First line.\n *   indented\n *\n * Last.\n *)";
        assert_eq!(doc(src).unwrap().text, "First line.\n  indented\n\nLast.");
    }

    #[test]
    fn common_indentation_is_removed() {
        let src = "{!\n    one\n      two\n}";
        assert_eq!(doc(src).unwrap().text, "one\n  two");
    }

    #[test]
    fn trailing_decoration_stars() {
        assert_eq!(doc("(** boxed **)").unwrap().text, "boxed");
    }

    #[test]
    fn emphasis_is_not_margin() {
        assert_eq!(doc("(** **bold** *)").unwrap().text, "**bold**");
    }

    #[test]
    fn unterminated_doc_keeps_text_to_end_of_input() {
        let d = doc("{ unterminated").unwrap();
        assert_eq!(d.text, "unterminated");
    }

    #[test]
    fn span_and_lines() {
        let src = "x;\n{! a\n b }";
        let d = doc(src).unwrap();
        assert_eq!((d.line, d.end_line), (2, 3));
        assert_eq!(&src[d.span.start..d.span.end], " a\n b ");
    }
}
