//! Documentation attachment.
//!
//! Comments are examined lazily, in source order, whenever the recognizer is
//! about to create an entry or has just finished one. Everything between the
//! last examined lexeme and the cursor is processed in one go:
//!
//! - a documentation comment on the line where the last item finished, or
//!   one with the `<` marker, is trailing documentation of that item; a
//!   `<` comment with no such item is dropped;
//! - any other documentation comment becomes pending leading documentation;
//! - a code token discards pending documentation and forgets the last item.

use super::cursor::TokenCursor;
use crate::builder::TreeBuilder;
use crate::comment::{classify, CommentClass, DocComment};
use crate::entry::EntryId;
use crate::lexer::LexemeKind;
use crate::options::ScanOptions;

#[derive(Debug)]
struct Pending {
    text: String,
    last_line: u32,
}

/// The item trailing documentation attaches to. Several ids when one
/// declaration introduced several names (`a, b: Integer`).
#[derive(Debug)]
struct LastItem {
    ids: Vec<EntryId>,
    line: u32,
}

#[derive(Debug)]
pub(crate) struct DocAttacher {
    options: ScanOptions,
    /// Raw index of the first lexeme not yet examined.
    processed: usize,
    pending: Option<Pending>,
    last_item: Option<LastItem>,
}

impl DocAttacher {
    pub fn new(options: &ScanOptions) -> Self {
        Self {
            options: options.clone(),
            processed: 0,
            pending: None,
            last_item: None,
        }
    }

    /// Examine everything before the cursor's current token.
    pub fn sync(&mut self, cur: &TokenCursor<'_>, builder: &mut TreeBuilder) {
        self.process_to(cur, cur.raw_index(), builder);
    }

    /// Step over a keyword that does not break leading documentation
    /// (section and visibility keywords, attributes).
    pub fn bump_transparent(&mut self, cur: &mut TokenCursor<'_>, builder: &mut TreeBuilder) {
        self.sync(cur, builder);
        cur.bump();
        self.skip_transparent(cur, builder);
    }

    /// Mark the tokens up to the cursor as examined without letting them
    /// discard pending documentation.
    pub fn skip_transparent(&mut self, cur: &TokenCursor<'_>, builder: &mut TreeBuilder) {
        let target = self.raw_after_prev(cur);
        let lexemes = cur.lexemes();
        while self.processed < target {
            if let Some(LexemeKind::Comment(_)) = lexemes.get(self.processed).map(|l| &l.kind) {
                self.process_to(cur, self.processed + 1, builder);
            } else {
                self.processed += 1;
            }
        }
    }

    /// Take the leading documentation for a declaration starting at the
    /// cursor. Documentation separated from it by more blank lines than the
    /// gap limit goes to the preceding sibling instead.
    pub fn take_leading(&mut self, cur: &TokenCursor<'_>, builder: &mut TreeBuilder) -> String {
        self.sync(cur, builder);
        self.last_item = None;
        let Some(pending) = self.pending.take() else {
            return String::new();
        };
        let line = cur.location().line;
        if self.exceeds_gap(pending.last_line, line) {
            self.attach_orphan(pending.text, builder);
            return String::new();
        }
        pending.text
    }

    /// The entries `ids` were just created from the tokens before the cursor.
    /// Documentation inside that range trails them, as does documentation
    /// later on the same line as the last consumed token.
    pub fn item_done(&mut self, cur: &TokenCursor<'_>, builder: &mut TreeBuilder, ids: &[EntryId]) {
        if let Some(pending) = self.pending.take() {
            tracing::trace!(line = pending.last_line, "documentation discarded by intervening code");
        }
        let target = self.raw_after_prev(cur);
        let lexemes = cur.lexemes();
        while self.processed < target {
            if let Some(lexeme) = lexemes.get(self.processed) {
                if let CommentClass::Documentation(doc) = classify(cur.src(), lexeme, &self.options) {
                    for id in ids {
                        builder.append_doc(*id, &doc.text);
                    }
                }
            }
            self.processed += 1;
        }
        self.last_item = Some(LastItem {
            ids: ids.to_vec(),
            line: cur.prev_end().line,
        });
    }

    /// Flush at end of input: pending documentation goes to the innermost
    /// open entry.
    pub fn finish(&mut self, cur: &TokenCursor<'_>, builder: &mut TreeBuilder) {
        self.process_to(cur, cur.lexemes().len(), builder);
        if let Some(pending) = self.pending.take() {
            if let Some(top) = builder.top() {
                builder.append_doc(top, &pending.text);
            }
        }
    }

    fn process_to(&mut self, cur: &TokenCursor<'_>, target: usize, builder: &mut TreeBuilder) {
        let lexemes = cur.lexemes();
        while self.processed < target {
            let Some(lexeme) = lexemes.get(self.processed) else {
                break;
            };
            self.processed += 1;
            match &lexeme.kind {
                LexemeKind::Comment(_) => {
                    if let CommentClass::Documentation(doc) = classify(cur.src(), lexeme, &self.options) {
                        self.documentation(doc, builder);
                    }
                }
                LexemeKind::Whitespace | LexemeKind::Newline | LexemeKind::Directive(_) => {}
                _ => {
                    if let Some(pending) = self.pending.take() {
                        tracing::trace!(
                            line = pending.last_line,
                            "documentation discarded by intervening code"
                        );
                    }
                    self.last_item = None;
                }
            }
        }
    }

    fn documentation(&mut self, doc: DocComment, builder: &mut TreeBuilder) {
        if let Some(last) = &self.last_item {
            if doc.trailing || doc.line == last.line {
                for id in &last.ids {
                    builder.append_doc(*id, &doc.text);
                }
                return;
            }
        }
        if doc.trailing {
            tracing::trace!(line = doc.line, "trailing documentation with nothing before it discarded");
            return;
        }
        match self.pending.take() {
            Some(mut pending) if !self.exceeds_gap(pending.last_line, doc.line) => {
                let adjacent = doc.line <= pending.last_line + 1;
                if !pending.text.is_empty() && !doc.text.is_empty() {
                    pending.text.push_str(if adjacent { "\n" } else { "\n\n" });
                }
                pending.text.push_str(&doc.text);
                pending.last_line = doc.end_line;
                self.pending = Some(pending);
            }
            previous => {
                if let Some(previous) = previous {
                    self.attach_orphan(previous.text, builder);
                }
                self.pending = Some(Pending {
                    text: doc.text,
                    last_line: doc.end_line,
                });
            }
        }
    }

    fn exceeds_gap(&self, last_line: u32, next_line: u32) -> bool {
        let blank = next_line.saturating_sub(last_line + 1);
        self.options.doc_gap.is_some_and(|limit| blank > limit)
    }

    /// Documentation too far from anything that follows documents what came
    /// before it: the previous sibling, or the enclosing entry.
    fn attach_orphan(&self, text: String, builder: &mut TreeBuilder) {
        let Some(top) = builder.top() else {
            return;
        };
        let target = builder.last_child(top).unwrap_or(top);
        builder.append_doc(target, &text);
    }

    fn raw_after_prev(&self, cur: &TokenCursor<'_>) -> usize {
        // The trivia after the last consumed token belongs to whatever comes
        // next; stop right after that token.
        let end = cur.prev_end().offset;
        let lexemes = cur.lexemes();
        let mut raw = cur.raw_index().min(lexemes.len());
        while raw > self.processed && lexemes.get(raw - 1).is_some_and(|l| l.start.offset >= end) {
            raw -= 1;
        }
        raw
    }
}
