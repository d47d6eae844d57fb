//! Entry tree builder: the open-entry stack over the arena.
//!
//! The first pushed entry is the root. It stays at the bottom of the stack
//! until [`TreeBuilder::finish`], which stretches it over the whole input.

use crate::entry::{Entry, EntryId, EntryKind, EntryTree};
use crate::stream::Location;
use std::sync::Arc;

#[derive(Debug)]
pub struct TreeBuilder {
    file: Arc<str>,
    entries: Vec<Entry>,
    stack: Vec<EntryId>,
}

impl TreeBuilder {
    pub fn new(file: impl Into<Arc<str>>) -> Self {
        Self {
            file: file.into(),
            entries: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn has_root(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Add `entry` as a child of the current top and make it the new top.
    pub fn push(&mut self, entry: Entry) -> EntryId {
        let id = self.insert(entry);
        self.stack.push(id);
        id
    }

    /// Add a finalized child of the current top. Without a root the entry
    /// becomes the root instead.
    pub fn add_leaf(&mut self, entry: Entry) -> EntryId {
        if !self.has_root() {
            return self.push(entry);
        }
        let id = self.insert(entry);
        let end = self.entries[id.index()].end;
        self.close(id, end);
        id
    }

    /// Finalize the top entry at `end`. The root is never popped.
    pub fn pop(&mut self, end: Location) -> Option<EntryId> {
        if self.stack.len() <= 1 {
            return None;
        }
        let id = self.stack.pop()?;
        self.close(id, end);
        Some(id)
    }

    pub fn top(&self) -> Option<EntryId> {
        self.stack.last().copied()
    }

    /// Open entries, root first.
    pub fn open(&self) -> &[EntryId] {
        &self.stack
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.index())
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.get_mut(id.index())
    }

    pub fn last_child(&self, id: EntryId) -> Option<EntryId> {
        self.entry(id)?.children.last().copied()
    }

    /// Append documentation, separating paragraphs with a blank line.
    pub fn append_doc(&mut self, id: EntryId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(entry) = self.entry_mut(id) {
            if !entry.doc.is_empty() {
                entry.doc.push_str("\n\n");
            }
            entry.doc.push_str(text);
        }
    }

    /// Force-close every open entry at `eof` and hand over the tree.
    pub fn finish(mut self, eof: Location) -> EntryTree {
        if !self.has_root() {
            self.push(Entry::new(EntryKind::Other, ""));
        }
        let unclosed = self.stack.len().saturating_sub(1);
        if unclosed > 0 {
            tracing::debug!(unclosed, "closing open entries at end of input");
        }
        while self.pop(eof).is_some() {}

        let root = &mut self.entries[EntryId::ROOT.index()];
        root.start = Location::START;
        root.end = eof.max(root.start);
        EntryTree::from_arena(self.file, self.entries)
    }

    fn insert(&mut self, mut entry: Entry) -> EntryId {
        let id = EntryId(self.entries.len());
        entry.id = id;
        entry.file = Arc::clone(&self.file);
        entry.parent = self.top();
        entry.children.clear();
        if let Some(parent) = entry.parent {
            self.entries[parent.index()].children.push(id);
        }
        self.entries.push(entry);
        id
    }

    /// Set the end location, never before the entry's own start or the end
    /// of its last child.
    fn close(&mut self, id: EntryId, end: Location) {
        let floor = self
            .last_child(id)
            .and_then(|c| self.entry(c))
            .map(|c| c.end);
        if let Some(entry) = self.entry_mut(id) {
            let mut end = end.max(entry.start);
            if let Some(floor) = floor {
                end = end.max(floor);
            }
            entry.end = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: u32, offset: usize) -> Location {
        Location {
            line,
            column: 1,
            offset,
        }
    }

    fn entry(kind: EntryKind, name: &str, start: Location) -> Entry {
        let mut e = Entry::new(kind, name);
        e.start = start;
        e.end = start;
        e
    }

    #[test]
    fn push_pop_nests_entries() {
        let mut b = TreeBuilder::new("u.pas");
        let root = b.push(entry(EntryKind::Unit, "U", at(1, 0)));
        let class = b.push(entry(EntryKind::Class, "T", at(2, 10)));
        b.add_leaf(entry(EntryKind::Field, "F", at(3, 20)));
        assert_eq!(b.pop(at(4, 30)), Some(class));
        assert_eq!(b.top(), Some(root));
        let tree = b.finish(at(5, 40));

        let t = tree.find("T").unwrap();
        assert_eq!(t.parent, Some(root));
        assert_eq!(t.end.offset, 30);
        assert_eq!(tree.find("F").unwrap().parent, Some(class));
        assert_eq!(tree.root().end.offset, 40);
        assert!(tree.find("F").unwrap().file.as_ref() == "u.pas");
    }

    #[test]
    fn root_is_never_popped() {
        let mut b = TreeBuilder::new("u.pas");
        b.push(entry(EntryKind::Unit, "U", at(1, 0)));
        assert_eq!(b.pop(at(1, 5)), None);
        assert_eq!(b.open().len(), 1);
    }

    #[test]
    fn finish_closes_open_entries() {
        let mut b = TreeBuilder::new("u.pas");
        b.push(entry(EntryKind::Unit, "U", at(1, 0)));
        b.push(entry(EntryKind::Procedure, "P", at(2, 8)));
        let tree = b.finish(at(9, 99));
        assert_eq!(tree.find("P").unwrap().end.offset, 99);
    }

    #[test]
    fn empty_builder_yields_a_root() {
        let tree = TreeBuilder::new("x.inc").finish(Location::START);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().kind, EntryKind::Other);
    }

    #[test]
    fn parent_end_covers_last_child() {
        let mut b = TreeBuilder::new("u.pas");
        b.push(entry(EntryKind::Unit, "U", at(1, 0)));
        b.push(entry(EntryKind::Class, "T", at(2, 10)));
        let mut f = entry(EntryKind::Field, "F", at(3, 20));
        f.end = at(3, 25);
        b.add_leaf(f);
        b.pop(at(3, 21));
        let tree = b.finish(at(4, 30));
        assert_eq!(tree.find("T").unwrap().end.offset, 25);
    }

    #[test]
    fn docs_are_joined_by_paragraph() {
        let mut b = TreeBuilder::new("u.pas");
        let root = b.push(entry(EntryKind::Unit, "U", at(1, 0)));
        b.append_doc(root, "lead");
        b.append_doc(root, "");
        b.append_doc(root, "trail");
        assert_eq!(b.entry(root).unwrap().doc, "lead\n\ntrail");
    }
}
