//! Output model: entries in an index arena.
//!
//! Entries are stored in creation order, which is also preorder: a parent is
//! always created before its children and a subtree is complete before the
//! next sibling starts.

use crate::stream::Location;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Handle of an entry inside its [`EntryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub usize);

impl EntryId {
    pub const ROOT: EntryId = EntryId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Program,
    Unit,
    Library,
    Package,
    /// `initialization` / `finalization`
    Section,
    Class,
    Record,
    Object,
    Interface,
    Procedure,
    Function,
    Constructor,
    Destructor,
    Operator,
    Property,
    Field,
    Const,
    Var,
    Type,
    EnumValue,
    #[default]
    Other,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Program => "program",
            EntryKind::Unit => "unit",
            EntryKind::Library => "library",
            EntryKind::Package => "package",
            EntryKind::Section => "section",
            EntryKind::Class => "class",
            EntryKind::Record => "record",
            EntryKind::Object => "object",
            EntryKind::Interface => "interface",
            EntryKind::Procedure => "procedure",
            EntryKind::Function => "function",
            EntryKind::Constructor => "constructor",
            EntryKind::Destructor => "destructor",
            EntryKind::Operator => "operator",
            EntryKind::Property => "property",
            EntryKind::Field => "field",
            EntryKind::Const => "const",
            EntryKind::Var => "var",
            EntryKind::Type => "type",
            EntryKind::EnumValue => "enum-value",
            EntryKind::Other => "other",
        }
    }

    pub fn is_module(self) -> bool {
        matches!(
            self,
            EntryKind::Program | EntryKind::Unit | EntryKind::Library | EntryKind::Package
        )
    }

    pub fn is_routine(self) -> bool {
        matches!(
            self,
            EntryKind::Procedure
                | EntryKind::Function
                | EntryKind::Constructor
                | EntryKind::Destructor
                | EntryKind::Operator
        )
    }

    /// Class-like types whose members carry a visibility.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            EntryKind::Class | EntryKind::Record | EntryKind::Object | EntryKind::Interface
        )
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Published,
    StrictPrivate,
    StrictProtected,
    Automated,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Published => "published",
            Visibility::StrictPrivate => "strict private",
            Visibility::StrictProtected => "strict protected",
            Visibility::Automated => "automated",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized declaration or container scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub name: String,
    /// Owner prefix of a method implementation (`TFoo` in `TFoo.Bar`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    /// Header text, whitespace collapsed, terminator excluded.
    pub signature: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub args: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub type_text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub initializer: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specifiers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<String>,
    pub doc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub forward: bool,
    pub file: Arc<str>,
    pub start: Location,
    pub end: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
}

impl Entry {
    pub fn new(kind: EntryKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_specifier(&self, word: &str) -> bool {
        self.specifiers.iter().any(|s| s.eq_ignore_ascii_case(word))
    }
}

/// The finished outline of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryTree {
    file: Arc<str>,
    entries: Vec<Entry>,
}

impl EntryTree {
    /// Callers guarantee `entries` is a well-formed arena with the root at 0.
    pub(crate) fn from_arena(file: Arc<str>, entries: Vec<Entry>) -> Self {
        debug_assert!(!entries.is_empty());
        Self { file, entries }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn root(&self) -> &Entry {
        &self.entries[EntryId::ROOT.index()]
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in preorder.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn children(&self, id: EntryId) -> impl Iterator<Item = &Entry> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|e| e.children.iter())
            .filter_map(|c| self.get(*c))
    }

    pub fn parent(&self, id: EntryId) -> Option<&Entry> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Preorder walk with depth (root at 0).
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![(EntryId::ROOT, 0)],
        }
    }

    /// First entry named `name` (case-insensitive), in preorder.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Follow a chain of child names from the root.
    pub fn find_path(&self, path: &[&str]) -> Option<&Entry> {
        let mut current = self.root();
        for name in path {
            current = self
                .children(current.id)
                .find(|e| e.name.eq_ignore_ascii_case(name))?;
        }
        Some(current)
    }
}

/// Iterator returned by [`EntryTree::walk`].
pub struct Walk<'a> {
    tree: &'a EntryTree,
    stack: Vec<(EntryId, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let entry = self.tree.get(id)?;
        self.stack
            .extend(entry.children.iter().rev().map(|c| (*c, depth + 1)));
        Some((depth, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntryTree {
        let file: Arc<str> = Arc::from("u.pas");
        let mut root = Entry::new(EntryKind::Unit, "U");
        root.children = vec![EntryId(1), EntryId(3)];
        let mut t = Entry::new(EntryKind::Class, "TFoo");
        t.id = EntryId(1);
        t.parent = Some(EntryId(0));
        t.children = vec![EntryId(2)];
        let mut f = Entry::new(EntryKind::Field, "FBar");
        f.id = EntryId(2);
        f.parent = Some(EntryId(1));
        let mut p = Entry::new(EntryKind::Procedure, "Run");
        p.id = EntryId(3);
        p.parent = Some(EntryId(0));
        EntryTree::from_arena(file, vec![root, t, f, p])
    }

    #[test]
    fn navigation() {
        let tree = sample();
        assert_eq!(tree.root().name, "U");
        let names: Vec<_> = tree.children(EntryId::ROOT).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["TFoo", "Run"]);
        assert_eq!(tree.parent(EntryId(2)).map(|e| e.name.as_str()), Some("TFoo"));
        assert!(tree.parent(EntryId::ROOT).is_none());
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        let tree = sample();
        let walked: Vec<_> = tree.walk().map(|(d, e)| (d, e.name.as_str())).collect();
        assert_eq!(walked, vec![(0, "U"), (1, "TFoo"), (2, "FBar"), (1, "Run")]);
    }

    #[test]
    fn lookup_by_name_and_path() {
        let tree = sample();
        assert_eq!(tree.find("fbar").map(|e| e.id), Some(EntryId(2)));
        assert_eq!(tree.find_path(&["TFoo", "FBar"]).map(|e| e.id), Some(EntryId(2)));
        assert!(tree.find_path(&["Run", "FBar"]).is_none());
    }

    #[test]
    fn kind_names() {
        assert_eq!(EntryKind::EnumValue.to_string(), "enum-value");
        assert_eq!(Visibility::StrictPrivate.to_string(), "strict private");
        assert_eq!(Entry::default().kind, EntryKind::Other);
    }
}
