//! Lexical state machine.
//!
//! An explicit automaton over character classes. In [`LexMode::Code`] the
//! next one or two bytes select a transition into a comment or string mode;
//! inside those modes only the matching closer leads back to code, so a
//! comment opener inside a string or a quote inside a comment is plain text.
//!
//! Recovery is built in rather than reported: a string left open at the end
//! of a line is closed there, and any mode still open at end of input is
//! closed at end of input.

mod keyword;

pub use keyword::Keyword;

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::options::ScanOptions;
use crate::stream::{CharStream, Location, Span};
use serde::Serialize;

// -- Lexeme model -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CommentStyle {
    /// `{ ... }`
    Brace,
    /// `(* ... *)`
    ParenStar,
    /// `// ...` to end of line
    Line,
}

impl CommentStyle {
    pub fn opener(self) -> &'static str {
        match self {
            CommentStyle::Brace => "{",
            CommentStyle::ParenStar => "(*",
            CommentStyle::Line => "//",
        }
    }

    /// Closer of a block style; line comments end at the line terminator.
    pub fn closer(self) -> Option<&'static str> {
        match self {
            CommentStyle::Brace => Some("}"),
            CommentStyle::ParenStar => Some("*)"),
            CommentStyle::Line => None,
        }
    }
}

/// The current mode of the automaton. Exactly one is active at any position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    Code,
    LineComment,
    BlockComment { style: CommentStyle, depth: u32 },
    Str,
}

/// Opener, body and closer of a comment or directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentParts {
    pub style: CommentStyle,
    pub open: Span,
    pub body: Span,
    /// `None` when the comment was force-closed at end of input (or, for a
    /// line comment, at end of line).
    pub close: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexemeKind {
    Ident { keyword: Option<Keyword>, escaped: bool },
    Number,
    Str { terminated: bool },
    /// `#13`, `#$0A`
    CharCode,
    Symbol,
    Comment(CommentParts),
    /// Compiler directive such as `{$mode objfpc}`.
    Directive(CommentParts),
    Whitespace,
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: LexemeKind,
    pub span: Span,
    pub start: Location,
    pub end: Location,
}

impl Lexeme {
    /// Whitespace, line terminators, comments and directives.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            LexemeKind::Whitespace
                | LexemeKind::Newline
                | LexemeKind::Comment(_)
                | LexemeKind::Directive(_)
        )
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            LexemeKind::Ident { keyword, .. } => keyword,
            _ => None,
        }
    }
}

// -- Character classes --------------------------------------------------------

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn is_blank(b: u8) -> bool {
    (b < 0x20 && b != b'\n' && b != b'\r') || b == b' ' || b == 0x7F
}

const TWO_CHAR_SYMBOLS: &[&[u8; 2]] = &[
    b":=", b"..", b"<=", b">=", b"<>", b"><", b"**", b"+=", b"-=", b"*=", b"/=", b"(.", b".)",
    b"@@",
];

// -- Automaton ----------------------------------------------------------------

/// Streaming lexer. Iterate it for lexemes; diagnostics accumulate on the side.
pub struct Lexer<'a> {
    stream: CharStream<'a>,
    mode: LexMode,
    nested_comments: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, options: &ScanOptions) -> Self {
        Self {
            stream: CharStream::new(src),
            mode: LexMode::Code,
            nested_comments: options.nested_comments,
            diagnostics: Vec::new(),
        }
    }

    /// Lex the whole buffer.
    pub fn tokenize(src: &'a str, options: &ScanOptions) -> (Vec<Lexeme>, Vec<Diagnostic>) {
        let mut lexer = Lexer::new(src, options);
        let lexemes: Vec<Lexeme> = lexer.by_ref().collect();
        (lexemes, lexer.diagnostics)
    }

    pub fn mode(&self) -> LexMode {
        self.mode
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Location just past the last consumed byte.
    pub fn location(&self) -> Location {
        self.stream.location()
    }

    fn next_lexeme(&mut self) -> Option<Lexeme> {
        let start = self.stream.location();
        let b = self.stream.current()?;
        let next = self.stream.peek();

        let kind = match (b, next) {
            (b'\r', Some(b'\n')) => {
                self.stream.bump_n(2);
                LexemeKind::Newline
            }
            (b'\n' | b'\r', _) => {
                self.stream.bump();
                LexemeKind::Newline
            }
            _ if is_blank(b) => {
                self.stream.eat_while(is_blank);
                LexemeKind::Whitespace
            }
            (b'{', _) => self.comment(CommentStyle::Brace),
            (b'(', Some(b'*')) => self.comment(CommentStyle::ParenStar),
            (b'/', Some(b'/')) => self.comment(CommentStyle::Line),
            (b'\'', _) => self.string_literal(),
            (b'#', Some(n)) if n.is_ascii_digit() || n == b'$' => {
                self.stream.bump();
                if self.stream.current() == Some(b'$') {
                    self.stream.bump();
                }
                self.stream.eat_while(|c| c.is_ascii_hexdigit());
                LexemeKind::CharCode
            }
            (b'&', Some(n)) if is_ident_start(n) => {
                self.stream.bump();
                self.stream.eat_while(is_ident_continue);
                LexemeKind::Ident {
                    keyword: None,
                    escaped: true,
                }
            }
            (b'&', Some(b'0'..=b'7')) => {
                self.stream.bump();
                self.stream.eat_while(|c| matches!(c, b'0'..=b'7' | b'_'));
                LexemeKind::Number
            }
            (b'$', Some(n)) if n.is_ascii_hexdigit() => {
                self.stream.bump();
                self.stream.eat_while(|c| c.is_ascii_hexdigit() || c == b'_');
                LexemeKind::Number
            }
            (b'%', Some(b'0' | b'1')) => {
                self.stream.bump();
                self.stream.eat_while(|c| matches!(c, b'0' | b'1' | b'_'));
                LexemeKind::Number
            }
            _ if b.is_ascii_digit() => self.decimal(),
            _ if is_ident_start(b) => {
                self.stream.eat_while(is_ident_continue);
                let text = self.stream.slice(Span::new(start.offset, self.stream.pos()));
                LexemeKind::Ident {
                    keyword: Keyword::lookup(text),
                    escaped: false,
                }
            }
            (b'}', _) => {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::CommentStyleMismatch,
                    start,
                    "stray `}` outside of a comment",
                ));
                self.stream.bump();
                LexemeKind::Symbol
            }
            (b'*', Some(b')')) => {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::CommentStyleMismatch,
                    start,
                    "stray `*)` outside of a comment",
                ));
                self.stream.bump_n(2);
                LexemeKind::Symbol
            }
            _ => {
                let two = TWO_CHAR_SYMBOLS
                    .iter()
                    .any(|sym| self.stream.starts_with(&sym[..]));
                self.stream.bump_n(if two { 2 } else { 1 });
                LexemeKind::Symbol
            }
        };

        Some(Lexeme {
            kind,
            span: Span::new(start.offset, self.stream.pos()),
            start,
            end: self.stream.location(),
        })
    }

    /// Run the comment modes from the opener to the matching closer.
    fn comment(&mut self, style: CommentStyle) -> LexemeKind {
        let opened_at = self.stream.location();
        let open_start = self.stream.pos();
        self.stream.bump_n(style.opener().len());
        let open = Span::new(open_start, self.stream.pos());
        let directive = style != CommentStyle::Line && self.stream.current() == Some(b'$');

        self.mode = match style {
            CommentStyle::Line => LexMode::LineComment,
            _ => LexMode::BlockComment { style, depth: 1 },
        };

        let body_start = self.stream.pos();
        let mut wrong_closer: Option<Location> = None;
        // `(* ... *)` quoted inside a brace comment (or `{ }` inside `(* *)`).
        let mut quoted_depth = 0u32;
        let (body_end, close) = loop {
            match self.mode {
                LexMode::LineComment => match self.stream.current() {
                    None | Some(b'\n' | b'\r') => {
                        self.mode = LexMode::Code;
                        break (self.stream.pos(), None);
                    }
                    Some(_) => {
                        self.stream.bump();
                    }
                },
                LexMode::BlockComment { style, depth } => {
                    let (opener, closer, other_opener, other_closer): (&[u8], &[u8], &[u8], &[u8]) =
                        match style {
                            CommentStyle::ParenStar => (b"(*", b"*)", b"{", b"}"),
                            _ => (b"{", b"}", b"(*", b"*)"),
                        };
                    if self.stream.is_eof() {
                        self.mode = LexMode::Code;
                        break (self.stream.pos(), None);
                    }
                    if self.stream.starts_with(closer) {
                        let at = self.stream.pos();
                        self.stream.bump_n(closer.len());
                        if depth <= 1 {
                            self.mode = LexMode::Code;
                            break (at, Some(Span::new(at, self.stream.pos())));
                        }
                        self.mode = LexMode::BlockComment {
                            style,
                            depth: depth - 1,
                        };
                    } else if self.nested_comments && self.stream.starts_with(opener) {
                        self.stream.bump_n(opener.len());
                        self.mode = LexMode::BlockComment {
                            style,
                            depth: depth + 1,
                        };
                    } else if self.stream.starts_with(other_opener) {
                        quoted_depth += 1;
                        self.stream.bump_n(other_opener.len());
                    } else if self.stream.starts_with(other_closer) {
                        if quoted_depth > 0 {
                            quoted_depth -= 1;
                        } else if wrong_closer.is_none() {
                            wrong_closer = Some(self.stream.location());
                        }
                        self.stream.bump_n(other_closer.len());
                    } else {
                        self.stream.bump();
                    }
                }
                LexMode::Code | LexMode::Str => break (self.stream.pos(), None),
            }
        };

        if close.is_none() && style != CommentStyle::Line {
            tracing::debug!(
                line = opened_at.line,
                "unterminated `{}` comment closed at end of input",
                style.opener()
            );
        }
        // A wrong-style closer matters when the real one never comes, or only
        // comes on a later line and so swallows the code in between.
        let swallowed = match (wrong_closer, close) {
            (Some(_), None) => wrong_closer,
            (Some(at), Some(_)) if self.stream.location().line > at.line => wrong_closer,
            _ => None,
        };
        if let Some(at) = swallowed {
            let (closer, other) = match style {
                CommentStyle::ParenStar => ("*)", "}"),
                _ => ("}", "*)"),
            };
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::CommentStyleMismatch,
                at,
                format!(
                    "comment opened with `{}` at line {} is closed with `{}` instead of `{}`",
                    style.opener(),
                    opened_at.line,
                    other,
                    closer
                ),
            ));
        }

        let parts = CommentParts {
            style,
            open,
            body: Span::new(body_start, body_end),
            close,
        };
        if directive {
            LexemeKind::Directive(parts)
        } else {
            LexemeKind::Comment(parts)
        }
    }

    /// Single-quoted literal; `''` is an escaped quote.
    fn string_literal(&mut self) -> LexemeKind {
        self.stream.bump();
        self.mode = LexMode::Str;
        let terminated = loop {
            match (self.stream.current(), self.stream.peek()) {
                (None | Some(b'\n' | b'\r'), _) => {
                    tracing::debug!(
                        line = self.stream.location().line,
                        "unterminated string literal closed at end of line"
                    );
                    break false;
                }
                (Some(b'\''), Some(b'\'')) => self.stream.bump_n(2),
                (Some(b'\''), _) => {
                    self.stream.bump();
                    break true;
                }
                _ => {
                    self.stream.bump();
                }
            }
        };
        self.mode = LexMode::Code;
        LexemeKind::Str { terminated }
    }

    fn decimal(&mut self) -> LexemeKind {
        let digits = |c: u8| c.is_ascii_digit() || c == b'_';
        self.stream.eat_while(digits);
        // `1..5` is a range, not a real.
        if self.stream.current() == Some(b'.') && self.stream.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.stream.bump();
            self.stream.eat_while(digits);
        }
        if matches!(self.stream.current(), Some(b'e' | b'E')) {
            let exponent = match self.stream.peek() {
                Some(c) if c.is_ascii_digit() => true,
                Some(b'+' | b'-') => self.stream.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent {
                self.stream.bump_n(2);
                self.stream.eat_while(digits);
            }
        }
        LexemeKind::Number
    }
}

impl Iterator for Lexer<'_> {
    type Item = Lexeme;

    fn next(&mut self) -> Option<Lexeme> {
        self.next_lexeme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Lexeme> {
        Lexer::tokenize(src, &ScanOptions::default()).0
    }

    fn significant(src: &str) -> Vec<String> {
        lex(src)
            .into_iter()
            .filter(|l| !l.is_trivia())
            .map(|l| src[l.span.start..l.span.end].to_string())
            .collect()
    }

    fn comments(src: &str) -> Vec<CommentParts> {
        lex(src)
            .into_iter()
            .filter_map(|l| match l.kind {
                LexemeKind::Comment(parts) => Some(parts),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn identifiers_keywords_and_symbols() {
        assert_eq!(
            significant("procedure Foo(a: Integer) ;"),
            vec!["procedure", "Foo", "(", "a", ":", "Integer", ")", ";"]
        );
        let lexemes = lex("BEGIN x := 1 end.");
        assert_eq!(lexemes[0].keyword(), Some(Keyword::Begin));
        assert_eq!(significant("x := 1..5"), vec!["x", ":=", "1", "..", "5"]);
    }

    #[test]
    fn escaped_identifier_is_not_a_keyword() {
        let lexemes = lex("&begin");
        assert_eq!(lexemes.len(), 1);
        assert_eq!(
            lexemes[0].kind,
            LexemeKind::Ident {
                keyword: None,
                escaped: true
            }
        );
    }

    #[test]
    fn numbers_in_all_radixes() {
        assert_eq!(
            significant("$FF %1010 &17 1.5e-3 1_000"),
            vec!["$FF", "%1010", "&17", "1.5e-3", "1_000"]
        );
    }

    #[test]
    fn char_codes_and_adjacent_strings() {
        assert_eq!(significant("'a'#13#$0A'b'"), vec!["'a'", "#13", "#$0A", "'b'"]);
    }

    #[test]
    fn doubled_quote_does_not_end_string() {
        let src = "'it''s' x";
        assert_eq!(significant(src), vec!["'it''s'", "x"]);
    }

    #[test]
    fn comment_opener_inside_string_is_ignored() {
        let src = "s := '{ not a comment }';";
        assert!(comments(src).is_empty());
        assert_eq!(significant(src), vec!["s", ":=", "'{ not a comment }'", ";"]);
    }

    #[test]
    fn quote_inside_comment_is_ignored() {
        let src = "{ don't } x";
        let found = comments(src);
        assert_eq!(found.len(), 1);
        assert_eq!(&src[found[0].body.start..found[0].body.end], " don't ");
        assert_eq!(significant(src), vec!["x"]);
    }

    #[test]
    fn three_comment_styles() {
        let src = "{a} (*b*) //c\nx";
        let found = comments(src);
        let styles: Vec<_> = found.iter().map(|c| c.style).collect();
        assert_eq!(
            styles,
            vec![CommentStyle::Brace, CommentStyle::ParenStar, CommentStyle::Line]
        );
        assert_eq!(&src[found[2].body.start..found[2].body.end], "c");
    }

    #[test]
    fn styles_do_not_nest_with_each_other() {
        let src = "{ (* } x";
        assert_eq!(comments(src).len(), 1);
        assert_eq!(significant(src), vec!["x"]);
    }

    #[test]
    fn same_style_nesting_only_when_enabled() {
        let src = "{ a { b } c } x";
        assert_eq!(significant(src), vec!["c", "}", "x"]);

        let options = ScanOptions {
            nested_comments: true,
            ..ScanOptions::default()
        };
        let (lexemes, _) = Lexer::tokenize(src, &options);
        let rest: Vec<_> = lexemes
            .iter()
            .filter(|l| !l.is_trivia())
            .map(|l| &src[l.span.start..l.span.end])
            .collect();
        assert_eq!(rest, vec!["x"]);
    }

    #[test]
    fn directive_is_not_a_comment() {
        let lexemes = lex("{$mode objfpc}(*$H+*)");
        assert!(matches!(lexemes[0].kind, LexemeKind::Directive(_)));
        assert!(matches!(lexemes[1].kind, LexemeKind::Directive(_)));
    }

    #[test]
    fn unterminated_string_closes_at_end_of_line() {
        let src = "s := 'abc\nx";
        let lexemes = lex(src);
        let string = lexemes
            .iter()
            .find(|l| matches!(l.kind, LexemeKind::Str { .. }))
            .unwrap();
        assert_eq!(string.kind, LexemeKind::Str { terminated: false });
        assert_eq!(&src[string.span.start..string.span.end], "'abc");
        assert_eq!(significant(src).last().map(String::as_str), Some("x"));
    }

    #[test]
    fn unterminated_comment_runs_to_end_of_input() {
        let src = "{ unterminated";
        let found = comments(src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].close, None);
        assert_eq!(&src[found[0].body.start..found[0].body.end], " unterminated");
    }

    #[test]
    fn lexer_returns_to_code_after_each_lexeme() {
        let mut lexer = Lexer::new("{ open", &ScanOptions::default());
        while lexer.next().is_some() {
            assert_eq!(lexer.mode(), LexMode::Code);
        }
    }

    #[test]
    fn wrong_closer_is_reported() {
        let (_, diagnostics) = Lexer::tokenize("{ text *) more", &ScanOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::CommentStyleMismatch);
        assert_eq!(diagnostics[0].column, 8);
    }

    #[test]
    fn stray_brace_is_reported() {
        let (_, diagnostics) = Lexer::tokenize("(* a { b *) c }", &ScanOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("stray"));
    }

    #[test]
    fn wrong_closer_before_a_later_real_closer_is_reported() {
        let (lexemes, diagnostics) =
            Lexer::tokenize("{ x *)\nprocedure P;\n{ d }", &ScanOptions::default());
        assert_eq!(lexemes.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::CommentStyleMismatch);
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 5));
    }

    #[test]
    fn wrong_closer_on_the_closing_line_is_accepted() {
        let (_, diagnostics) = Lexer::tokenize("{ see a*) }\nx", &ScanOptions::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn quoted_other_style_comment_is_accepted() {
        let src = "{ was:\n  (* old *)\n}\n(* a {b}\n c *)";
        let (_, diagnostics) = Lexer::tokenize(src, &ScanOptions::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn stray_paren_star_closer_is_reported() {
        let (lexemes, diagnostics) = Lexer::tokenize("x *) y", &ScanOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("stray `*)`"));
        assert_eq!(lexemes.iter().filter(|l| !l.is_trivia()).count(), 3);
    }

    #[test]
    fn empty_paren_star_is_not_closed_by_its_own_star() {
        let src = "(*) x *) y";
        assert_eq!(significant(src), vec!["y"]);
    }

    #[test]
    fn lexeme_locations() {
        let lexemes = lex("a\n  b");
        let b = lexemes.last().unwrap();
        assert_eq!((b.start.line, b.start.column), (2, 3));
        assert_eq!(b.end.offset, 5);
    }
}
