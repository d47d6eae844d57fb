//! Character stream over a borrowed source buffer.
//!
//! The stream walks the buffer byte-by-byte and keeps the current line and
//! column up to date. Every structural character of Pascal is ASCII, so the
//! lexer only ever stops on ASCII bytes; multi-byte UTF-8 sequences are
//! consumed whole as part of identifiers, comments or strings and every
//! span handed out lies on a character boundary.

use serde::Serialize;

/// A position in the source: 1-based line and column, 0-based byte offset.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Location {
    /// Location of the first character of a buffer.
    pub const START: Location = Location {
        line: 1,
        column: 1,
        offset: 0,
    };
}

/// Half-open byte range `[start, end)` into the source buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Cursor over the raw source with line/column tracking and short lookahead.
#[derive(Debug, Clone)]
pub struct CharStream<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> CharStream<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Byte at the current position, `None` at end of input.
    #[inline]
    pub fn current(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Byte one position ahead of current.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(1)
    }

    /// Byte `n` positions ahead of current (`peek_at(0)` is `current()`).
    #[inline]
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// True if the remaining input starts with `prefix`.
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes[self.pos.min(self.bytes.len())..].starts_with(prefix)
    }

    /// Consume one byte and return it, updating line and column.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.current()?;
        self.pos += 1;
        match b {
            b'\n' => self.new_line(),
            // A `\r` directly followed by `\n` is finished by the `\n`.
            b'\r' if self.current() != Some(b'\n') => self.new_line(),
            b'\r' => {}
            // UTF-8 continuation bytes do not start a new column.
            _ if b & 0xC0 == 0x80 => {}
            _ => self.column += 1,
        }
        Some(b)
    }

    /// Consume `n` bytes (fewer at end of input).
    pub fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    /// Consume bytes while `pred` holds.
    pub fn eat_while(&mut self, mut pred: impl FnMut(u8) -> bool) {
        while let Some(b) = self.current() {
            if !pred(b) {
                break;
            }
            self.bump();
        }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
            offset: self.pos,
        }
    }

    /// Source text of `span`; empty if the span is out of range.
    pub fn slice(&self, span: Span) -> &'a str {
        self.src.get(span.start..span.end).unwrap_or("")
    }

    pub fn source(&self) -> &'a str {
        self.src
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }
}
