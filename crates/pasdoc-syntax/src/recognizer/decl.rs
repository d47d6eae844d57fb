//! Declaration forms: module headers, `uses` clauses, routines, properties,
//! types, constants, variables and fields.

use super::header::{self, is_hard_stop};
use super::{Block, DeclPart, Phase, Recognizer, Scope};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::entry::{Entry, EntryId, EntryKind, Visibility};
use crate::lexer::{Keyword, LexemeKind};
use crate::stream::Location;

impl Recognizer<'_> {
    // -- Modules --------------------------------------------------------------

    /// `unit System.Foo;`, `program P(input, output);`, `library L;`,
    /// `package P;`. The entry becomes the root.
    pub(super) fn module_header(&mut self, kind: EntryKind) -> EntryId {
        let doc = self.docs.take_leading(&self.cur, &mut self.builder);
        let first = self.cur.pos();
        let start = self.cur.location();
        self.cur.bump();

        let name_at = self.cur.location();
        let name = match header::qualified_name(&mut self.cur) {
            (Some(qualifier), name) => format!("{qualifier}.{name}"),
            (None, name) => name,
        };
        let args = if self.cur.at_symbol("(") {
            let (from, to) = header::balanced(&mut self.cur, "(", ")");
            self.cur.render(from, to)
        } else {
            String::new()
        };
        header::skip_to_terminator(&mut self.cur);
        let sig_end = self.cur.pos();
        self.cur.eat_symbol(";");

        if name.is_empty() {
            self.empty_name(kind, name_at);
        }
        let mut entry = Entry::new(kind, name);
        entry.signature = self.cur.render(first, sig_end);
        entry.args = args;
        entry.doc = doc;
        entry.start = start;
        entry.end = self.cur.prev_end();
        let id = self.builder.push(entry);
        self.docs.item_done(&self.cur, &mut self.builder, &[id]);
        id
    }

    /// `uses A, B in 'b.pas', System.C;` (also `requires` / `contains`).
    pub(super) fn uses_clause(&mut self, module: EntryId) {
        self.cur.bump();
        let mut units = Vec::new();
        while let Some(tok) = self.cur.peek() {
            if self.cur.eat_symbol(";") {
                break;
            }
            if tok
                .keyword()
                .is_some_and(|kw| !kw.is_contextual() || is_hard_stop(kw))
            {
                break;
            }
            if self.cur.nth_is_name(0) {
                let from = self.cur.pos();
                self.cur.bump();
                while self.cur.at_symbol(".") && self.cur.nth_is_ident(1) {
                    self.cur.bump();
                    self.cur.bump();
                }
                units.push(self.cur.render(from, self.cur.pos()));
                if self.cur.eat_word("in") {
                    self.cur.bump();
                }
            } else {
                self.cur.bump();
            }
        }
        if let Some(entry) = self.builder.entry_mut(module) {
            entry.uses.extend(units);
        }
    }

    /// `initialization` / `finalization`.
    pub(super) fn open_section(&mut self) {
        let doc = self.docs.take_leading(&self.cur, &mut self.builder);
        let first = self.cur.pos();
        let start = self.cur.location();
        let name = self.cur.peek_text().to_ascii_lowercase();
        self.cur.bump();

        let mut entry = Entry::new(EntryKind::Section, name);
        entry.signature = self.cur.render(first, self.cur.pos());
        entry.doc = doc;
        entry.start = start;
        entry.end = self.cur.prev_end();
        let id = self.builder.push(entry);
        self.docs.item_done(&self.cur, &mut self.builder, &[id]);
        self.blocks.push(Block::Entry {
            id,
            scope: Scope::Section,
        });
    }

    // -- Routines and properties ----------------------------------------------

    /// A routine header. Members of types, routines in the interface section
    /// and `forward`/`external` routines are finished at the header; anything
    /// else opens a routine whose body follows.
    pub(super) fn routine_decl(&mut self, member: Option<Visibility>) {
        let doc = self.docs.take_leading(&self.cur, &mut self.builder);
        let Some(header) = header::routine_header(&mut self.cur) else {
            self.cur.bump();
            return;
        };
        if header.name.is_empty() {
            self.empty_name(header.kind, header.name_at);
        }
        let forward =
            member.is_some() || self.in_interface_section() || header.has_forward_directive();

        let mut entry = header.into_entry();
        entry.doc = doc;
        entry.visibility = member;
        entry.forward = forward;
        if forward {
            let id = self.builder.add_leaf(entry);
            self.docs.item_done(&self.cur, &mut self.builder, &[id]);
        } else {
            let id = self.builder.push(entry);
            self.docs.item_done(&self.cur, &mut self.builder, &[id]);
            self.blocks.push(Block::Entry {
                id,
                scope: Scope::Routine {
                    phase: Phase::Declarations,
                    part: DeclPart::None,
                },
            });
        }
    }

    pub(super) fn property_decl(&mut self, visibility: Visibility) {
        let doc = self.docs.take_leading(&self.cur, &mut self.builder);
        let Some(header) = header::property_header(&mut self.cur) else {
            self.cur.bump();
            return;
        };
        if header.name.is_empty() {
            self.empty_name(header.kind, header.name_at);
        }
        let mut entry = header.into_entry();
        entry.doc = doc;
        entry.visibility = Some(visibility);
        let id = self.builder.add_leaf(entry);
        self.docs.item_done(&self.cur, &mut self.builder, &[id]);
    }

    // -- Types ----------------------------------------------------------------

    /// `Name [<generics>] = [type] [packed] ...;`
    pub(super) fn type_decl(&mut self, member: Option<Visibility>) {
        let doc = self.docs.take_leading(&self.cur, &mut self.builder);
        let first = self.cur.pos();
        let start = self.cur.location();
        self.cur.eat_word("generic");
        if !self.cur.nth_is_name(0) {
            self.cur.bump();
            return;
        }
        let name = self.cur.peek_text().to_string();
        self.cur.bump();

        let swallowed_eq = self.cur.at_symbol("<") && header::skip_generics(&mut self.cur);
        if !swallowed_eq && !self.cur.eat_symbol("=") {
            header::type_expr(&mut self.cur, &[]);
            self.cur.eat_symbol(";");
            return;
        }
        self.cur.eat_keyword(Keyword::Type);
        while self.cur.eat_keyword(Keyword::Packed) || self.cur.eat_word("bitpacked") {}

        let mut entry = Entry::new(EntryKind::Type, name);
        entry.doc = doc;
        entry.start = start;
        entry.visibility = member;

        let ahead_is_terminator = self.cur.nth_is_symbol(1, ";");
        match self.cur.peek_keyword() {
            Some(Keyword::Class) if ahead_is_terminator => {
                self.forward_type(first, entry, EntryKind::Class);
            }
            Some(Keyword::Interface | Keyword::DispInterface) if ahead_is_terminator => {
                self.forward_type(first, entry, EntryKind::Interface);
            }
            Some(Keyword::Class) if self.cur.nth_keyword(1) == Some(Keyword::Of) => {
                self.plain_type(first, entry);
            }
            Some(Keyword::Class) => self.container_type(first, entry, EntryKind::Class),
            Some(Keyword::Object) => self.container_type(first, entry, EntryKind::Object),
            Some(Keyword::Record) => self.container_type(first, entry, EntryKind::Record),
            Some(Keyword::Interface | Keyword::DispInterface) => {
                self.container_type(first, entry, EntryKind::Interface);
            }
            _ if self.cur.at_symbol("(") => self.enum_type(first, entry),
            _ => self.plain_type(first, entry),
        }
    }

    /// `TFoo = class;`
    fn forward_type(&mut self, first: usize, mut entry: Entry, kind: EntryKind) {
        self.cur.bump();
        let sig_end = self.cur.pos();
        self.cur.eat_symbol(";");
        entry.kind = kind;
        entry.forward = true;
        entry.signature = self.cur.render(first, sig_end);
        entry.end = self.cur.prev_end();
        let id = self.builder.add_leaf(entry);
        self.docs.item_done(&self.cur, &mut self.builder, &[id]);
    }

    /// Class, object, record or interface type. Opens a container unless the
    /// header is directly terminated (`class(Exception);`).
    fn container_type(&mut self, first: usize, mut entry: Entry, kind: EntryKind) {
        self.cur.bump();
        let mut specifiers = Vec::new();
        let mut bases = Vec::new();
        loop {
            let modifier_position = !self.cur.nth_is_symbol(1, ":") && !self.cur.nth_is_symbol(1, ",");
            if modifier_position && (self.cur.at_word("sealed") || self.cur.at_word("abstract")) {
                specifiers.push(self.cur.peek_text().to_ascii_lowercase());
                self.cur.bump();
            } else if modifier_position && self.cur.eat_word("helper") {
                specifiers.push("helper".to_string());
                let ancestors = if self.cur.at_symbol("(") {
                    self.base_list()
                } else {
                    Vec::new()
                };
                if self.cur.eat_word("for") {
                    let from = self.cur.pos();
                    header::qualified_name(&mut self.cur);
                    bases.push(self.cur.render(from, self.cur.pos()));
                }
                bases.extend(ancestors);
            } else {
                break;
            }
        }
        if self.cur.at_symbol("(") {
            bases.extend(self.base_list());
        }

        entry.kind = kind;
        entry.specifiers = specifiers;
        entry.bases = bases;

        if self.cur.at_symbol(";") {
            let sig_end = self.cur.pos();
            self.cur.bump();
            entry.signature = self.cur.render(first, sig_end);
            entry.end = self.cur.prev_end();
            let id = self.builder.add_leaf(entry);
            self.docs.item_done(&self.cur, &mut self.builder, &[id]);
            return;
        }

        entry.signature = self.cur.render(first, self.cur.pos());
        entry.end = self.cur.prev_end();
        let id = self.builder.push(entry);
        self.docs.item_done(&self.cur, &mut self.builder, &[id]);
        self.blocks.push(Block::Entry {
            id,
            scope: Scope::Container {
                kind,
                visibility: Visibility::Public,
                part: DeclPart::Fields,
            },
        });
    }

    /// `(TBase, IFoo<T>)`, split at top-level commas.
    fn base_list(&mut self) -> Vec<String> {
        let mut bases = Vec::new();
        self.cur.bump();
        let mut from = self.cur.pos();
        let mut angle = 0u32;
        while let Some(tok) = self.cur.peek() {
            if self.cur.at_symbol(";")
                || tok
                    .keyword()
                    .is_some_and(|kw| kw == Keyword::End || is_hard_stop(kw))
            {
                break;
            }
            let at = self.cur.pos();
            if tok.kind == LexemeKind::Symbol {
                match self.cur.peek_text() {
                    ")" => {
                        self.push_base(&mut bases, from, at);
                        self.cur.bump();
                        return bases;
                    }
                    "," if angle == 0 => {
                        self.push_base(&mut bases, from, at);
                        self.cur.bump();
                        from = self.cur.pos();
                        continue;
                    }
                    "<" => angle += 1,
                    ">" => angle = angle.saturating_sub(1),
                    _ => {}
                }
            }
            self.cur.bump();
        }
        let at = self.cur.pos();
        self.push_base(&mut bases, from, at);
        bases
    }

    fn push_base(&self, bases: &mut Vec<String>, from: usize, to: usize) {
        let text = self.cur.render(from, to);
        if !text.is_empty() {
            bases.push(text);
        }
    }

    /// `TColor = (clRed, clGreen = 2, clBlue);` with one child per value.
    fn enum_type(&mut self, first: usize, mut entry: Entry) {
        let open = self.cur.pos();
        entry.end = self.cur.location();
        let id = self.builder.push(entry);
        self.docs.item_done(&self.cur, &mut self.builder, &[id]);

        self.cur.bump();
        loop {
            if self.cur.eat_symbol(")") {
                break;
            }
            let Some(tok) = self.cur.peek() else {
                break;
            };
            if self.cur.at_symbol(";")
                || tok
                    .keyword()
                    .is_some_and(|kw| kw == Keyword::End || is_hard_stop(kw))
            {
                break;
            }
            if !self.cur.nth_is_ident(0) {
                self.cur.bump();
                continue;
            }

            let doc = self.docs.take_leading(&self.cur, &mut self.builder);
            let name_pos = self.cur.pos();
            let name = self.cur.peek_text().to_string();
            self.cur.bump();
            let mut value = String::new();
            if self.cur.eat_symbol("=") || self.cur.eat_symbol(":=") {
                let (from, to) = header::type_expr(&mut self.cur, &[","]);
                value = self.cur.render(from, to);
            }
            let sig_end = self.cur.pos();
            self.cur.eat_symbol(",");

            let mut member = Entry::new(EntryKind::EnumValue, name);
            member.signature = self.cur.render(name_pos, sig_end);
            member.initializer = value;
            member.doc = doc;
            member.start = tok.start;
            member.end = self.cur.prev_end();
            let member_id = self.builder.add_leaf(member);
            self.docs.item_done(&self.cur, &mut self.builder, &[member_id]);
        }
        let close = self.cur.pos();
        header::type_expr(&mut self.cur, &[]);
        let sig_end = self.cur.pos();
        self.cur.eat_symbol(";");

        let type_text = self.cur.render(open, close);
        let signature = self.cur.render(first, sig_end);
        if let Some(entry) = self.builder.entry_mut(id) {
            entry.type_text = type_text;
            entry.signature = signature;
        }
        self.builder.pop(self.cur.prev_end());
        self.docs.item_done(&self.cur, &mut self.builder, &[id]);
    }

    /// Aliases, subranges, arrays, sets, pointers, `class of`, procedural
    /// types with their calling conventions.
    fn plain_type(&mut self, first: usize, mut entry: Entry) {
        let (from, to) = header::type_expr(&mut self.cur, &[]);
        entry.type_text = self.cur.render(from, to);
        let sig_end = self.cur.pos();
        self.cur.eat_symbol(";");
        header::directives(&mut self.cur, &mut entry.specifiers);
        entry.signature = self.cur.render(first, sig_end);
        entry.end = self.cur.prev_end();
        let id = self.builder.add_leaf(entry);
        self.docs.item_done(&self.cur, &mut self.builder, &[id]);
    }

    // -- Values ---------------------------------------------------------------

    /// `a, b: T = init;`: one entry per name, sharing type, initializer and
    /// documentation. Constants take the same shape without the type.
    pub(super) fn value_decl(&mut self, kind: EntryKind, member: Option<Visibility>, class_var: bool) {
        let doc = self.docs.take_leading(&self.cur, &mut self.builder);
        let first = self.cur.pos();
        let mut names: Vec<(String, Location, Location)> = Vec::new();
        while let Some(tok) = self.cur.peek().filter(|_| self.cur.nth_is_name(0)) {
            names.push((self.cur.text(tok).to_string(), tok.start, tok.end));
            self.cur.bump();
            if !self.cur.eat_symbol(",") {
                break;
            }
        }
        if names.is_empty() {
            self.cur.bump();
            return;
        }

        let type_text = if self.cur.eat_symbol(":") {
            let (from, to) = header::type_expr(&mut self.cur, &["="]);
            self.cur.render(from, to)
        } else {
            String::new()
        };
        let initializer = if self.cur.eat_symbol("=") || self.cur.eat_symbol(":=") {
            let (from, to) = header::type_expr(&mut self.cur, &[]);
            self.cur.render(from, to)
        } else {
            String::new()
        };
        if !self.cur.at_symbol(";") {
            header::type_expr(&mut self.cur, &[]);
        }
        let sig_end = self.cur.pos();
        self.cur.eat_symbol(";");

        let mut specifiers = Vec::new();
        if class_var {
            specifiers.push("class".to_string());
        }
        if kind == EntryKind::Var {
            // Free Pascal: `X: cint; cvar; external;`
            header::directives(&mut self.cur, &mut specifiers);
        }

        let signature = self.cur.render(first, sig_end);
        let last = names.len() - 1;
        let mut ids = Vec::with_capacity(names.len());
        for (i, (name, start, end)) in names.into_iter().enumerate() {
            let mut entry = Entry::new(kind, name);
            entry.signature = signature.clone();
            entry.type_text = type_text.clone();
            entry.initializer = initializer.clone();
            entry.specifiers = specifiers.clone();
            entry.doc = doc.clone();
            entry.visibility = member;
            entry.start = start;
            entry.end = if i == last { self.cur.prev_end() } else { end };
            ids.push(self.builder.add_leaf(entry));
        }
        self.docs.item_done(&self.cur, &mut self.builder, &ids);
    }

    /// `case [Tag:] TTag of` inside a record. The tag becomes a field; the
    /// variant fields follow in parentheses.
    pub(super) fn variant_part(&mut self, visibility: Visibility, part: DeclPart) {
        let depth = match part {
            DeclPart::Variant { depth } => depth,
            _ => 0,
        };
        if self.cur.nth_is_name(1) && self.cur.nth_is_symbol(2, ":") {
            let doc = self.docs.take_leading(&self.cur, &mut self.builder);
            self.cur.bump();
            let name_pos = self.cur.pos();
            let Some(tok) = self.cur.bump() else {
                return;
            };
            self.cur.bump();
            let (from, to) = header::type_expr(&mut self.cur, &["of"]);

            let mut tag = Entry::new(EntryKind::Field, self.cur.text(tok));
            tag.type_text = self.cur.render(from, to);
            tag.signature = self.cur.render(name_pos, to);
            tag.doc = doc;
            tag.visibility = Some(visibility);
            tag.start = tok.start;
            tag.end = self.cur.prev_end();
            let id = self.builder.add_leaf(tag);
            self.docs.item_done(&self.cur, &mut self.builder, &[id]);
        } else {
            self.cur.bump();
            header::type_expr(&mut self.cur, &["of"]);
        }
        self.cur.eat_keyword(Keyword::Of);
        self.set_part(DeclPart::Variant { depth });
    }

    // -- Skipping -------------------------------------------------------------

    /// `[Attribute(...)]` and interface GUIDs. Leading documentation passes
    /// through.
    pub(super) fn attribute(&mut self) {
        self.docs.sync(&self.cur, &mut self.builder);
        header::balanced(&mut self.cur, "[", "]");
        self.docs.skip_transparent(&self.cur, &mut self.builder);
    }

    /// `label` / `exports` clauses.
    pub(super) fn skip_statement(&mut self) {
        self.cur.bump();
        while let Some(tok) = self.cur.peek() {
            if self.cur.eat_symbol(";") || tok.keyword().is_some_and(is_hard_stop) {
                break;
            }
            self.cur.bump();
        }
    }

    fn empty_name(&mut self, kind: EntryKind, at: Location) {
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::EmptyName,
            at,
            format!("{kind} declaration without a name"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::entry::{EntryKind, EntryTree, Visibility};
    use crate::options::ScanOptions;
    use crate::scan;
    use pretty_assertions::assert_eq;

    fn tree(src: &str) -> EntryTree {
        scan("test.pas", src, &ScanOptions::default()).tree
    }

    fn child_names(tree: &EntryTree, path: &[&str]) -> Vec<String> {
        let parent = tree.find_path(path).expect("path");
        tree.children(parent.id).map(|e| e.name.clone()).collect()
    }

    #[test]
    fn uses_clause_is_recorded_on_the_module() {
        let t = tree("unit U; interface uses System.SysUtils, Classes, Foo in 'foo.pas'; implementation uses Math; end.");
        assert_eq!(t.root().uses, vec!["System.SysUtils", "Classes", "Foo", "Math"]);
    }

    #[test]
    fn forward_and_empty_classes() {
        let t = tree("unit U; interface type TFoo = class; EBar = class(Exception); TFoo = class end; implementation end.");
        let kids: Vec<_> = t.children(t.root().id).collect();
        assert_eq!(kids.len(), 3);
        assert!(kids[0].forward);
        assert_eq!(kids[0].kind, EntryKind::Class);
        assert!(!kids[1].forward);
        assert_eq!(kids[1].bases, vec!["Exception"]);
        assert_eq!(kids[1].signature, "EBar = class(Exception)");
    }

    #[test]
    fn class_header_modifiers_and_bases() {
        let t = tree("type TFoo = class sealed(TBase, IFoo<Integer, string>) end; THelp = class helper for TFoo end;");
        let foo = t.find("TFoo").unwrap();
        assert_eq!(foo.specifiers, vec!["sealed"]);
        assert_eq!(foo.bases, vec!["TBase", "IFoo<Integer, string>"]);
        let help = t.find("THelp").unwrap();
        assert_eq!(help.specifiers, vec!["helper"]);
        assert_eq!(help.bases, vec!["TFoo"]);
    }

    #[test]
    fn enum_values_are_children() {
        let t = tree("type TColor = (clRed, clGreen = 2, clBlue);");
        let color = t.find("TColor").unwrap();
        assert_eq!(color.kind, EntryKind::Type);
        assert_eq!(color.type_text, "(clRed, clGreen = 2, clBlue)");
        assert_eq!(child_names(&t, &["TColor"]), vec!["clRed", "clGreen", "clBlue"]);
        let green = t.find("clGreen").unwrap();
        assert_eq!(green.kind, EntryKind::EnumValue);
        assert_eq!(green.initializer, "2");
    }

    #[test]
    fn procedural_and_plain_types() {
        let t = tree("type TNotify = procedure(Sender: TObject) of object; stdcall;\n TClassRef = class of TFoo;\n TArr = array[0..3] of record a: Byte; end;\n TNext = Integer;");
        let notify = t.find("TNotify").unwrap();
        assert_eq!(notify.type_text, "procedure(Sender: TObject) of object");
        assert_eq!(notify.specifiers, vec!["stdcall"]);
        assert_eq!(t.find("TClassRef").unwrap().kind, EntryKind::Type);
        assert_eq!(t.find("TArr").unwrap().type_text, "array[0..3] of record a: Byte; end");
        assert_eq!(t.find("TNext").unwrap().type_text, "Integer");
        assert_eq!(t.children(t.root().id).count(), 4);
    }

    #[test]
    fn generic_type_with_greater_equal() {
        let t = tree("type TList<T>= class end;");
        let list = t.find("TList").unwrap();
        assert_eq!(list.kind, EntryKind::Class);
        assert_eq!(list.signature, "TList<T>= class");
    }

    #[test]
    fn multi_name_vars_share_type_and_doc() {
        let t = tree("var\n  {! counters }\n  A, B: Integer = 0;");
        let a = t.find("A").unwrap();
        let b = t.find("B").unwrap();
        assert_eq!((a.kind, b.kind), (EntryKind::Var, EntryKind::Var));
        assert_eq!(a.type_text, "Integer");
        assert_eq!(b.initializer, "0");
        assert_eq!(a.doc, "counters");
        assert_eq!(b.doc, "counters");
        assert_eq!(a.signature, "A, B: Integer = 0");
        assert!(a.end <= b.start);
    }

    #[test]
    fn typed_and_untyped_consts() {
        let t = tree("const Max = 10; Names: array[0..1] of string = ('a', 'b'); resourcestring SHello = 'hi';");
        assert_eq!(t.find("Max").unwrap().initializer, "10");
        let names = t.find("Names").unwrap();
        assert_eq!(names.type_text, "array[0..1] of string");
        assert_eq!(names.initializer, "('a', 'b')");
        assert_eq!(t.find("SHello").unwrap().kind, EntryKind::Const);
    }

    #[test]
    fn class_members_and_visibility() {
        let src = "type TFoo = class\n\
                   FA: Integer;\n\
                   strict private\n\
                   FB, FC: string;\n\
                   class var FCount: Integer;\n\
                   protected\n\
                   procedure DoIt; virtual; abstract;\n\
                   public\n\
                   constructor Create(AOwner: TComponent); override;\n\
                   class function New: TFoo; static;\n\
                   property Count: Integer read FCount;\n\
                   published\n\
                   property Items[I: Integer]: string read GetItem; default;\n\
                   end;";
        let t = tree(src);
        assert_eq!(
            child_names(&t, &["TFoo"]),
            vec!["FA", "FB", "FC", "FCount", "DoIt", "Create", "New", "Count", "Items"]
        );
        let vis = |n: &str| t.find(n).unwrap().visibility;
        assert_eq!(vis("FA"), Some(Visibility::Public));
        assert_eq!(vis("FB"), Some(Visibility::StrictPrivate));
        assert_eq!(vis("FCount"), Some(Visibility::StrictPrivate));
        assert_eq!(vis("DoIt"), Some(Visibility::Protected));
        assert_eq!(vis("Items"), Some(Visibility::Published));

        let count = t.find("FCount").unwrap();
        assert_eq!(count.kind, EntryKind::Field);
        assert_eq!(count.specifiers, vec!["class"]);
        let do_it = t.find("DoIt").unwrap();
        assert!(do_it.forward);
        assert_eq!(do_it.specifiers, vec!["virtual", "abstract"]);
        assert_eq!(t.find("New").unwrap().specifiers, vec!["class", "static"]);
        let items = t.find("Items").unwrap();
        assert_eq!(items.kind, EntryKind::Property);
        assert!(items.has_specifier("default"));
    }

    #[test]
    fn variant_record_fields() {
        let src = "type TVar = record\n\
                   Name: string;\n\
                   case Kind: Byte of\n\
                     0: (I: Integer);\n\
                     1: (S: string[10]; D: Double);\n\
                   end;\n\
                   TNext = Integer;";
        let t = tree(src);
        assert_eq!(child_names(&t, &["TVar"]), vec!["Name", "Kind", "I", "S", "D"]);
        assert_eq!(t.find("S").unwrap().type_text, "string[10]");
        assert_eq!(t.find("TNext").unwrap().parent, Some(t.root().id));
    }

    #[test]
    fn interface_type_with_guid() {
        let src = "type IFoo = interface(IInterface)\n['{00000000-0000-0000-0000-000000000000}']\nfunction Get: Integer;\nend;";
        let t = tree(src);
        let foo = t.find("IFoo").unwrap();
        assert_eq!(foo.kind, EntryKind::Interface);
        assert_eq!(foo.bases, vec!["IInterface"]);
        assert_eq!(child_names(&t, &["IFoo"]), vec!["Get"]);
    }

    #[test]
    fn method_implementations_and_locals() {
        let src = "unit U; interface implementation\n\
                   procedure TFoo.Bar(X: Integer);\n\
                   var Tmp: Integer;\n\
                     procedure Local; begin end;\n\
                   begin\n\
                     if X > 0 then begin Tmp := X; end;\n\
                     case X of 1: ; end;\n\
                   end;\n\
                   function Free: Boolean; begin try finally end; end;\n\
                   end.";
        let t = tree(src);
        let bar = t.find("Bar").unwrap();
        assert_eq!(bar.qualifier.as_deref(), Some("TFoo"));
        assert!(!bar.forward);
        assert_eq!(child_names(&t, &["Bar"]), vec!["Tmp", "Local"]);
        assert_eq!(t.find("Free").unwrap().parent, Some(t.root().id));
    }

    #[test]
    fn sections_and_program_block() {
        let t = tree("unit U; interface implementation initialization Init; finalization Done; end.");
        let names: Vec<_> = t.children(t.root().id).map(|e| (e.kind, e.name.clone())).collect();
        assert_eq!(
            names,
            vec![
                (EntryKind::Section, "initialization".to_string()),
                (EntryKind::Section, "finalization".to_string())
            ]
        );

        let t = tree("program P(input, output); procedure Run; begin end; begin Run; end.");
        assert_eq!(t.root().kind, EntryKind::Program);
        assert_eq!(t.root().args, "(input, output)");
        assert_eq!(child_names(&t, &[]), vec!["Run"]);
    }

    #[test]
    fn external_routines_are_forward() {
        let t = tree("program P; function Beep(F, D: Cardinal): LongBool; stdcall; external 'kernel32.dll'; procedure Next; begin end; begin end.");
        let beep = t.find("Beep").unwrap();
        assert!(beep.forward);
        assert_eq!(beep.specifiers, vec!["stdcall", "external 'kernel32.dll'"]);
        assert_eq!(t.find("Next").unwrap().parent, Some(t.root().id));
    }

    #[test]
    fn empty_name_is_reported() {
        let out = scan("x.pas", "procedure ;", &ScanOptions::default());
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, crate::DiagnosticKind::EmptyName);
        assert_eq!(out.tree.children(out.tree.root().id).count(), 1);
    }
}
