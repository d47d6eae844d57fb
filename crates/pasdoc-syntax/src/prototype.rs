//! Standalone signature parsing, for prototypes that come from somewhere
//! other than a scanned file (cross references, command line).

use crate::entry::Entry;
use crate::lexer::Lexer;
use crate::options::ScanOptions;
use crate::recognizer::{property_header, routine_header, TokenCursor};

/// Parse one routine or property header. Input that is neither yields
/// `Entry::default()`.
pub fn parse_prototype(text: &str) -> Entry {
    let (lexemes, _) = Lexer::tokenize(text, &ScanOptions::default());
    let mut cur = TokenCursor::new(text, &lexemes);
    while cur.at_symbol("[") {
        skip_attribute(&mut cur);
    }
    let header = routine_header(&mut cur).or_else(|| property_header(&mut cur));
    match header {
        Some(header) if !header.name.is_empty() => header.into_entry(),
        _ => Entry::default(),
    }
}

fn skip_attribute(cur: &mut TokenCursor<'_>) {
    let mut depth = 0u32;
    while let Some(tok) = cur.bump() {
        match cur.text(tok) {
            "[" => depth += 1,
            "]" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn function_prototype() {
        let e = parse_prototype("function Add(a, b: Integer): Integer;");
        assert_eq!(e.kind, EntryKind::Function);
        assert_eq!(e.name, "Add");
        assert_eq!(e.signature, "function Add(a, b: Integer): Integer");
        assert_eq!(e.args, "(a, b: Integer)");
        assert_eq!(e.type_text, "Integer");
        assert_eq!(e.parent, None);
        assert!(e.doc.is_empty());
    }

    #[test]
    fn qualified_method_with_directives() {
        let e = parse_prototype("[Test] class procedure TFoo.Bar; static; inline;");
        assert_eq!(e.kind, EntryKind::Procedure);
        assert_eq!(e.qualifier.as_deref(), Some("TFoo"));
        assert_eq!(e.specifiers, vec!["class", "static", "inline"]);
    }

    #[test]
    fn property_prototype() {
        let e = parse_prototype("property Count: Integer read FCount");
        assert_eq!(e.kind, EntryKind::Property);
        assert_eq!(e.name, "Count");
        assert_eq!(e.specifiers, vec!["read FCount"]);
    }

    #[test]
    fn garbage_yields_default() {
        assert_eq!(parse_prototype("x := 1;"), Entry::default());
        assert_eq!(parse_prototype(""), Entry::default());
        assert_eq!(parse_prototype("procedure ;"), Entry::default());
    }
}
