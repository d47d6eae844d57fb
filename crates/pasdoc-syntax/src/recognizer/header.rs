//! Routine and property headers, and the token-skipping helpers shared by
//! the declaration forms.
//!
//! Everything here works on a [`TokenCursor`] alone, without a tree or
//! comment state, so prototype parsing reuses it as is.

use super::cursor::TokenCursor;
use crate::entry::{Entry, EntryKind};
use crate::lexer::{Keyword, LexemeKind};
use crate::stream::Location;

/// Words that may follow a routine header after its `;`.
const DIRECTIVES: &[&str] = &[
    "abstract",
    "assembler",
    "cdecl",
    "cvar",
    "delayed",
    "deprecated",
    "dispid",
    "dynamic",
    "experimental",
    "export",
    "external",
    "far",
    "final",
    "forward",
    "inline",
    "interrupt",
    "library",
    "local",
    "message",
    "near",
    "noreturn",
    "nostackframe",
    "overload",
    "override",
    "pascal",
    "platform",
    "register",
    "reintroduce",
    "safecall",
    "static",
    "stdcall",
    "unsafe",
    "varargs",
    "virtual",
    "winapi",
];

/// Property accessor clauses.
pub(crate) const ACCESSORS: &[&str] = &[
    "read",
    "write",
    "index",
    "default",
    "stored",
    "nodefault",
    "implements",
    "readonly",
    "writeonly",
    "dispid",
    "add",
    "remove",
];

/// Keywords that never occur inside a header or a type expression; a
/// declaration missing its `;` ends there.
pub(crate) fn is_hard_stop(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Begin
            | Keyword::Implementation
            | Keyword::Initialization
            | Keyword::Finalization
            | Keyword::Uses
            | Keyword::Unit
            | Keyword::Program
            | Keyword::Asm
            | Keyword::Exports
            | Keyword::Label
            | Keyword::ResourceString
            | Keyword::ThreadVar
            | Keyword::Constructor
            | Keyword::Destructor
            | Keyword::Property
    )
}

/// A parsed routine or property header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub kind: EntryKind,
    pub name: String,
    pub qualifier: Option<String>,
    pub signature: String,
    pub args: String,
    pub type_text: String,
    pub specifiers: Vec<String>,
    pub start: Location,
    /// End of the last consumed token, directives included.
    pub end: Location,
    pub name_at: Location,
}

impl Header {
    /// `forward` or `external`: declared here, defined elsewhere.
    pub fn has_forward_directive(&self) -> bool {
        self.specifiers.iter().any(|s| {
            s.split_whitespace()
                .next()
                .is_some_and(|w| w.eq_ignore_ascii_case("forward") || w.eq_ignore_ascii_case("external"))
        })
    }

    pub fn into_entry(self) -> Entry {
        Entry {
            kind: self.kind,
            name: self.name,
            qualifier: self.qualifier,
            signature: self.signature,
            args: self.args,
            type_text: self.type_text,
            specifiers: self.specifiers,
            start: self.start,
            end: self.end,
            ..Entry::default()
        }
    }
}

// -- Routine headers ----------------------------------------------------------

/// `[class] procedure|function|constructor|destructor|operator Name ...;`
/// followed by its directives. Leaves the cursor untouched when the current
/// tokens do not start a routine header.
pub fn routine_header(cur: &mut TokenCursor<'_>) -> Option<Header> {
    let first = cur.pos();
    let start = cur.location();
    let class_method = cur.eat_keyword(Keyword::Class);
    let kind = match cur.peek_keyword() {
        Some(Keyword::Procedure) => EntryKind::Procedure,
        Some(Keyword::Function) => EntryKind::Function,
        Some(Keyword::Constructor) => EntryKind::Constructor,
        Some(Keyword::Destructor) => EntryKind::Destructor,
        Some(Keyword::Operator) => EntryKind::Operator,
        _ => {
            cur.set_pos(first);
            return None;
        }
    };
    cur.bump();

    let name_at = cur.location();
    let (qualifier, name) = if kind == EntryKind::Operator {
        (None, operator_name(cur))
    } else {
        qualified_name(cur)
    };

    let args = if cur.at_symbol("(") {
        let (from, to) = balanced(cur, "(", ")");
        cur.render(from, to)
    } else {
        String::new()
    };

    // Free Pascal names the result of an operator: `operator +(a, b: T) r: T`
    if kind == EntryKind::Operator && cur.nth_is_ident(0) && cur.nth_is_symbol(1, ":") {
        cur.bump();
    }

    let type_text = if cur.eat_symbol(":") {
        let (from, to) = type_expr(cur, &[]);
        cur.render(from, to)
    } else {
        String::new()
    };

    skip_to_terminator(cur);
    let sig_end = cur.pos();
    cur.eat_symbol(";");

    let mut specifiers = Vec::new();
    if class_method {
        specifiers.push("class".to_string());
    }
    directives(cur, &mut specifiers);

    Some(Header {
        kind,
        name,
        qualifier,
        signature: cur.render(first, sig_end),
        args,
        type_text,
        specifiers,
        start,
        end: cur.prev_end(),
        name_at,
    })
}

fn operator_name(cur: &mut TokenCursor<'_>) -> String {
    let Some(tok) = cur.peek() else {
        return String::new();
    };
    let text = cur.text(tok);
    let is_name = match tok.kind {
        LexemeKind::Symbol => !matches!(text, "(" | ";" | ":"),
        LexemeKind::Ident { .. } => true,
        _ => false,
    };
    if is_name {
        cur.bump();
        text.to_string()
    } else {
        String::new()
    }
}

/// `A.B<T>.C` → (`Some("A.B<T>")`, `"C"`).
pub(crate) fn qualified_name(cur: &mut TokenCursor<'_>) -> (Option<String>, String) {
    let mut segments: Vec<(usize, usize, &str)> = Vec::new();
    while cur.nth_is_name(0) {
        let from = cur.pos();
        let text = cur.peek_text();
        cur.bump();
        if cur.at_symbol("<") {
            skip_generics(cur);
        }
        segments.push((from, cur.pos(), text));
        if cur.at_symbol(".") && cur.nth_is_name(1) {
            cur.bump();
        } else {
            break;
        }
    }
    match segments.as_slice() {
        [] => (None, String::new()),
        [only] => (None, only.2.to_string()),
        [head @ .., last] => {
            let qualifier = head
                .first()
                .zip(head.last())
                .map(|(first, prev)| cur.render(first.0, prev.1));
            (qualifier, last.2.to_string())
        }
    }
}

/// Skip a generic parameter list starting at `<`. Returns true when the
/// list ended in `>=`, i.e. the `=` of a type declaration was consumed too.
pub(crate) fn skip_generics(cur: &mut TokenCursor<'_>) -> bool {
    let mut depth = 0u32;
    while let Some(tok) = cur.peek() {
        if tok.kind == LexemeKind::Symbol {
            match cur.text(tok) {
                "<" => depth += 1,
                ">" | ">=" => {
                    let swallowed_eq = cur.text(tok) == ">=";
                    depth = depth.saturating_sub(1);
                    cur.bump();
                    if depth == 0 {
                        return swallowed_eq;
                    }
                    continue;
                }
                ";" | "=" | "(" | ")" | ":=" => return false,
                _ => {}
            }
        } else if matches!(
            tok.keyword(),
            Some(Keyword::Begin | Keyword::End | Keyword::Implementation)
        ) {
            return false;
        }
        cur.bump();
    }
    false
}

/// Consume a bracketed group starting at `open`, through its matching
/// `close`. Returns the consumed token range. Stops early at `end` or a hard
/// stop keyword.
pub(crate) fn balanced(cur: &mut TokenCursor<'_>, open: &str, close: &str) -> (usize, usize) {
    let from = cur.pos();
    let mut depth = 0u32;
    while let Some(tok) = cur.peek() {
        if tok.keyword().is_some_and(|kw| kw == Keyword::End || is_hard_stop(kw)) {
            break;
        }
        if tok.kind == LexemeKind::Symbol {
            let text = cur.text(tok);
            if text == open {
                depth += 1;
            } else if text == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    cur.bump();
                    break;
                }
            }
        }
        cur.bump();
    }
    (from, cur.pos())
}

/// Skip a type expression or value up to (not including) `;`, an unmatched
/// closing bracket, `end` at the outer level, a hard stop keyword, or one of
/// `stops` at the outer level. `record ... end` and `object ... end` are
/// skipped whole. Returns the consumed token range.
pub(crate) fn type_expr(cur: &mut TokenCursor<'_>, stops: &[&str]) -> (usize, usize) {
    let from = cur.pos();
    let mut brackets = 0u32;
    let mut blocks = 0u32;
    while let Some(tok) = cur.peek() {
        let text = cur.text(tok);
        let outer = brackets == 0 && blocks == 0;
        if outer && stops.iter().any(|s| text.eq_ignore_ascii_case(s)) {
            break;
        }
        match tok.kind {
            LexemeKind::Symbol => match text {
                "(" | "[" | "(." => brackets += 1,
                ")" | "]" | ".)" => {
                    if brackets == 0 {
                        break;
                    }
                    brackets -= 1;
                }
                ";" if outer => break,
                _ => {}
            },
            LexemeKind::Ident {
                keyword: Some(kw), ..
            } => {
                let after_of = cur.prev().and_then(|p| p.keyword()) == Some(Keyword::Of);
                match kw {
                    Keyword::Record => blocks += 1,
                    Keyword::Object if !after_of => blocks += 1,
                    Keyword::End => {
                        if blocks == 0 {
                            break;
                        }
                        blocks -= 1;
                    }
                    _ if is_hard_stop(kw) => break,
                    Keyword::Type | Keyword::Var if outer => break,
                    Keyword::Const if outer && !after_of => break,
                    _ => {}
                }
            }
            _ => {}
        }
        cur.bump();
    }
    (from, cur.pos())
}

/// Skip whatever is left before the `;` ending a header.
pub(crate) fn skip_to_terminator(cur: &mut TokenCursor<'_>) {
    while let Some(tok) = cur.peek() {
        if cur.at_symbol(";") || tok.keyword().is_some_and(|kw| kw == Keyword::End || is_hard_stop(kw)) {
            break;
        }
        cur.bump();
    }
}

// -- Directives ---------------------------------------------------------------

fn at_directive(cur: &TokenCursor<'_>) -> bool {
    let Some(tok) = cur.peek() else {
        return false;
    };
    if !matches!(tok.kind, LexemeKind::Ident { escaped: false, .. }) {
        return false;
    }
    let text = cur.text(tok);
    DIRECTIVES.iter().any(|d| text.eq_ignore_ascii_case(d))
        && ![":", ",", "=", ".", ":="]
            .iter()
            .any(|s| cur.nth_is_symbol(1, s))
}

/// Consume `; directive [args];` chunks following a header's terminator,
/// recording each chunk as a specifier.
pub(crate) fn directives(cur: &mut TokenCursor<'_>, out: &mut Vec<String>) {
    while at_directive(cur) {
        let from = cur.pos();
        cur.bump();
        while let Some(tok) = cur.peek() {
            if cur.at_symbol(";")
                || at_directive(cur)
                || tok.keyword().is_some_and(|kw| kw == Keyword::End || is_hard_stop(kw))
            {
                break;
            }
            cur.bump();
        }
        out.push(cur.render(from, cur.pos()));
        cur.eat_symbol(";");
    }
}

// -- Property headers ---------------------------------------------------------

/// `[class] property Name[index args]: Type accessors; [default;]`
pub fn property_header(cur: &mut TokenCursor<'_>) -> Option<Header> {
    let first = cur.pos();
    let start = cur.location();
    let class_property = cur.eat_keyword(Keyword::Class);
    if !cur.eat_keyword(Keyword::Property) {
        cur.set_pos(first);
        return None;
    }

    let name_at = cur.location();
    let name = if cur.nth_is_name(0) {
        let text = cur.peek_text().to_string();
        cur.bump();
        text
    } else {
        String::new()
    };

    let args = if cur.at_symbol("[") {
        let (from, to) = balanced(cur, "[", "]");
        cur.render(from, to)
    } else {
        String::new()
    };

    let type_text = if cur.eat_symbol(":") {
        let (from, to) = type_expr(cur, ACCESSORS);
        cur.render(from, to)
    } else {
        String::new()
    };

    let mut specifiers = Vec::new();
    if class_property {
        specifiers.push("class".to_string());
    }
    while ACCESSORS.iter().any(|w| cur.at_word(w)) {
        let from = cur.pos();
        cur.bump();
        type_expr(cur, ACCESSORS);
        specifiers.push(cur.render(from, cur.pos()));
    }

    skip_to_terminator(cur);
    let sig_end = cur.pos();
    cur.eat_symbol(";");

    // `default;` after the terminator marks the default array property.
    while cur.at_word("default") && cur.nth_is_symbol(1, ";") {
        specifiers.push("default".to_string());
        cur.bump();
        cur.bump();
    }
    directives(cur, &mut specifiers);

    Some(Header {
        kind: EntryKind::Property,
        name,
        qualifier: None,
        signature: cur.render(first, sig_end),
        args,
        type_text,
        specifiers,
        start,
        end: cur.prev_end(),
        name_at,
    })
}
