//! Cursor over the significant (non-trivia) lexemes of a buffer.

use crate::lexer::{Keyword, Lexeme, LexemeKind};
use crate::stream::Location;

pub struct TokenCursor<'a> {
    src: &'a str,
    lexemes: &'a [Lexeme],
    /// Raw indices of the significant lexemes.
    significant: Vec<usize>,
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(src: &'a str, lexemes: &'a [Lexeme]) -> Self {
        let significant = lexemes
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            src,
            lexemes,
            significant,
            pos: 0,
        }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn lexemes(&self) -> &'a [Lexeme] {
        self.lexemes
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.significant.len()
    }

    /// Index of the current significant token.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.significant.len());
    }

    pub fn peek(&self) -> Option<&'a Lexeme> {
        self.nth(0)
    }

    pub fn nth(&self, n: usize) -> Option<&'a Lexeme> {
        let raw = *self.significant.get(self.pos + n)?;
        self.lexemes.get(raw)
    }

    pub fn bump(&mut self) -> Option<&'a Lexeme> {
        let lexeme = self.peek()?;
        self.pos += 1;
        Some(lexeme)
    }

    /// Last consumed significant token.
    pub fn prev(&self) -> Option<&'a Lexeme> {
        let raw = *self.significant.get(self.pos.checked_sub(1)?)?;
        self.lexemes.get(raw)
    }

    pub fn text(&self, lexeme: &Lexeme) -> &'a str {
        self.src.get(lexeme.span.start..lexeme.span.end).unwrap_or("")
    }

    /// Text of the `n`th token ahead, empty past the end.
    pub fn nth_text(&self, n: usize) -> &'a str {
        self.nth(n).map_or("", |l| self.text(l))
    }

    pub fn peek_text(&self) -> &'a str {
        self.nth_text(0)
    }

    pub fn nth_keyword(&self, n: usize) -> Option<Keyword> {
        self.nth(n).and_then(Lexeme::keyword)
    }

    pub fn peek_keyword(&self) -> Option<Keyword> {
        self.nth_keyword(0)
    }

    pub fn at_keyword(&self, kw: Keyword) -> bool {
        self.peek_keyword() == Some(kw)
    }

    pub fn nth_is_symbol(&self, n: usize, symbol: &str) -> bool {
        self.nth(n)
            .is_some_and(|l| l.kind == LexemeKind::Symbol && self.text(l) == symbol)
    }

    pub fn at_symbol(&self, symbol: &str) -> bool {
        self.nth_is_symbol(0, symbol)
    }

    /// Identifier (escaped or not) at `n`.
    pub fn nth_is_ident(&self, n: usize) -> bool {
        matches!(self.nth(n).map(|l| &l.kind), Some(LexemeKind::Ident { .. }))
    }

    /// Identifier usable as a declaration name: not a reserved keyword.
    pub fn nth_is_name(&self, n: usize) -> bool {
        match self.nth(n).map(|l| &l.kind) {
            Some(LexemeKind::Ident { keyword, .. }) => keyword.map_or(true, Keyword::is_contextual),
            _ => false,
        }
    }

    /// Unescaped identifier spelled `word` (case-insensitive) at `n`.
    pub fn nth_is_word(&self, n: usize, word: &str) -> bool {
        self.nth(n).is_some_and(|l| {
            matches!(l.kind, LexemeKind::Ident { escaped: false, .. })
                && self.text(l).eq_ignore_ascii_case(word)
        })
    }

    pub fn at_word(&self, word: &str) -> bool {
        self.nth_is_word(0, word)
    }

    pub fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.at_symbol(symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Raw lexeme index of the current token; the lexeme count at the end.
    pub fn raw_index(&self) -> usize {
        self.significant
            .get(self.pos)
            .copied()
            .unwrap_or(self.lexemes.len())
    }

    /// Start of the current token, or end of input.
    pub fn location(&self) -> Location {
        self.peek().map_or_else(|| self.eof(), |l| l.start)
    }

    /// End of the last consumed token.
    pub fn prev_end(&self) -> Location {
        self.prev().map_or(Location::START, |l| l.end)
    }

    pub fn eof(&self) -> Location {
        self.lexemes.last().map_or(Location::START, |l| l.end)
    }

    /// Source text of the significant tokens `from..to`, with a single space
    /// wherever trivia separated two tokens.
    pub fn render(&self, from: usize, to: usize) -> String {
        let to = to.min(self.significant.len());
        let mut out = String::new();
        let mut last_raw: Option<usize> = None;
        for &raw in self.significant.get(from..to).unwrap_or(&[]) {
            if last_raw.is_some_and(|prev| raw > prev + 1) {
                out.push(' ');
            }
            if let Some(l) = self.lexemes.get(raw) {
                out.push_str(self.text(l));
            }
            last_raw = Some(raw);
        }
        out
    }
}
