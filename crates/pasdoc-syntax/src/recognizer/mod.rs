//! Declaration recognizer.
//!
//! One pass over the significant tokens. The live state is a stack of
//! [`Block`]s: open entries with the scope they establish, and anonymous
//! statement blocks (`begin`, `case`, `try`, `record`, `asm`). Each step
//! looks at the innermost block and the current token, and either consumes
//! at least one token or closes at least one block, so the loop always ends.

mod cursor;
mod decl;
mod docs;
mod header;

pub use cursor::TokenCursor;
pub use header::{property_header, routine_header, Header};

use crate::builder::TreeBuilder;
use crate::diagnostic::Diagnostic;
use crate::entry::{Entry, EntryId, EntryKind, EntryTree, Visibility};
use crate::lexer::{Keyword, Lexeme};
use crate::options::ScanOptions;
use crate::stream::Location;
use docs::DocAttacher;

// -- Scan state ---------------------------------------------------------------

/// `interface` / `implementation` part of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Interface,
    Implementation,
}

/// Which kind of declaration a bare identifier starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclPart {
    None,
    Type,
    Const,
    Var,
    Fields,
    ClassVar,
    /// Inside `case ... of` of a record; `depth` counts open parentheses.
    Variant { depth: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Declarations,
    Body,
    Asm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module { section: Section, part: DeclPart },
    Container { kind: EntryKind, visibility: Visibility, part: DeclPart },
    Routine { phase: Phase, part: DeclPart },
    /// `initialization` / `finalization` statements.
    Section,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Entry { id: EntryId, scope: Scope },
    Statements { asm: bool },
}

pub(crate) struct Recognizer<'a> {
    cur: TokenCursor<'a>,
    builder: TreeBuilder,
    docs: DocAttacher,
    blocks: Vec<Block>,
    diagnostics: Vec<Diagnostic>,
    stopped: bool,
}

/// Build the entry tree of one file from its lexemes.
pub(crate) fn recognize(
    file: &str,
    src: &str,
    lexemes: &[Lexeme],
    options: &ScanOptions,
) -> (EntryTree, Vec<Diagnostic>) {
    let mut recognizer = Recognizer {
        cur: TokenCursor::new(src, lexemes),
        builder: TreeBuilder::new(file),
        docs: DocAttacher::new(options),
        blocks: Vec::new(),
        diagnostics: Vec::new(),
        stopped: false,
    };
    recognizer.root(file);
    recognizer.run();
    recognizer.finish()
}

impl<'a> Recognizer<'a> {
    fn root(&mut self, file: &str) {
        let module = match self.cur.peek_keyword() {
            Some(Keyword::Unit) => Some(EntryKind::Unit),
            Some(Keyword::Program) => Some(EntryKind::Program),
            Some(Keyword::Library) => Some(EntryKind::Library),
            Some(Keyword::Package) if self.cur.nth_is_name(1) => Some(EntryKind::Package),
            _ => None,
        };
        let id = match module {
            Some(kind) => self.module_header(kind),
            None => {
                let stem = std::path::Path::new(file)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(file);
                self.builder.push(Entry::new(EntryKind::Other, stem))
            }
        };
        self.blocks.push(Block::Entry {
            id,
            scope: Scope::Module {
                section: Section::None,
                part: DeclPart::None,
            },
        });
    }

    fn run(&mut self) {
        while !self.stopped && !self.cur.at_end() {
            let before = (self.cur.pos(), self.blocks.len());
            self.step();
            if self.cur.pos() == before.0 && self.blocks.len() >= before.1 && !self.stopped {
                self.cur.bump();
            }
        }
    }

    fn finish(mut self) -> (EntryTree, Vec<Diagnostic>) {
        self.docs.finish(&self.cur, &mut self.builder);
        let open = self
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Entry { .. }))
            .count();
        if !self.stopped && open > 1 {
            tracing::debug!(open = open - 1, "input ended inside open declarations");
        }
        let tree = self.builder.finish(self.cur.eof());
        (tree, self.diagnostics)
    }

    fn step(&mut self) {
        let Some(block) = self.blocks.last().copied() else {
            self.stopped = true;
            return;
        };
        match block {
            Block::Statements { asm: true } => self.asm_step(),
            Block::Statements { asm: false } => self.statement_step(),
            Block::Entry { id, scope } => match scope {
                Scope::Module { part, .. } => self.module_step(id, part),
                Scope::Container {
                    kind,
                    visibility,
                    part,
                } => self.container_step(kind, visibility, part),
                Scope::Routine {
                    phase: Phase::Declarations,
                    part,
                } => self.routine_step(part),
                Scope::Routine {
                    phase: Phase::Body, ..
                }
                | Scope::Section => self.statement_step(),
                Scope::Routine {
                    phase: Phase::Asm, ..
                } => self.asm_step(),
            },
        }
    }

    // -- Helpers --------------------------------------------------------------

    /// Keyword at the cursor, unless a contextual keyword is used as a name
    /// (`Public: Boolean`, `Requires, Contains: Integer`).
    fn keyword_here(&self) -> Option<Keyword> {
        let kw = self.cur.peek_keyword()?;
        if kw.is_contextual() {
            let as_name: &[&str] = if kw == Keyword::Operator {
                &[":", ","]
            } else {
                &[":", ",", "=", ":="]
            };
            if as_name.iter().any(|s| self.cur.nth_is_symbol(1, s)) {
                return None;
            }
        }
        Some(kw)
    }

    /// `class` introducing a method or property rather than a type.
    fn class_member_follows(&self) -> bool {
        self.cur
            .nth_keyword(1)
            .is_some_and(|kw| kw.is_routine() || kw == Keyword::Property)
    }

    fn set_scope(&mut self, scope: Scope) {
        if let Some(Block::Entry { scope: top, .. }) = self.blocks.last_mut() {
            *top = scope;
        }
    }

    fn set_part(&mut self, new_part: DeclPart) {
        if let Some(Block::Entry { scope, .. }) = self.blocks.last_mut() {
            match scope {
                Scope::Module { part, .. }
                | Scope::Container { part, .. }
                | Scope::Routine { part, .. } => *part = new_part,
                Scope::Section => {}
            }
        }
    }

    fn transparent(&mut self) {
        self.docs.bump_transparent(&mut self.cur, &mut self.builder);
    }

    fn in_interface_section(&self) -> bool {
        matches!(
            self.blocks.last(),
            Some(Block::Entry {
                scope: Scope::Module {
                    section: Section::Interface,
                    ..
                },
                ..
            })
        )
    }

    // -- Steps ----------------------------------------------------------------

    fn module_step(&mut self, id: EntryId, part: DeclPart) {
        match self.keyword_here() {
            Some(Keyword::Interface) => {
                self.transparent();
                self.set_scope(Scope::Module {
                    section: Section::Interface,
                    part: DeclPart::None,
                });
            }
            Some(Keyword::Implementation) => {
                self.transparent();
                self.set_scope(Scope::Module {
                    section: Section::Implementation,
                    part: DeclPart::None,
                });
            }
            Some(Keyword::Uses | Keyword::Requires | Keyword::Contains) => self.uses_clause(id),
            Some(Keyword::Type) => {
                self.transparent();
                self.set_part(DeclPart::Type);
            }
            Some(Keyword::Const | Keyword::ResourceString) => {
                self.transparent();
                self.set_part(DeclPart::Const);
            }
            Some(Keyword::Var | Keyword::ThreadVar) => {
                self.transparent();
                self.set_part(DeclPart::Var);
            }
            Some(Keyword::Label | Keyword::Exports) => {
                self.skip_statement();
                self.set_part(DeclPart::None);
            }
            Some(Keyword::Initialization | Keyword::Finalization) => self.open_section(),
            Some(Keyword::Begin) => {
                self.cur.bump();
                self.blocks.push(Block::Statements { asm: false });
            }
            Some(Keyword::Asm) => {
                self.cur.bump();
                self.blocks.push(Block::Statements { asm: true });
            }
            Some(Keyword::End) => self.close_block(),
            Some(Keyword::Class) if self.class_member_follows() => self.routine_decl(None),
            Some(kw) if kw.is_routine() => self.routine_decl(None),
            Some(_) => {
                self.cur.bump();
            }
            _ if self.cur.at_symbol("[") => self.attribute(),
            _ if self.cur.nth_is_name(0) => match part {
                DeclPart::Type => self.type_decl(None),
                DeclPart::Const => self.value_decl(EntryKind::Const, None, false),
                DeclPart::Var => self.value_decl(EntryKind::Var, None, false),
                _ => {
                    self.cur.bump();
                }
            },
            _ => {
                self.cur.bump();
            }
        }
    }

    fn container_step(&mut self, kind: EntryKind, visibility: Visibility, part: DeclPart) {
        let visibility_word = match self.keyword_here() {
            Some(Keyword::Private) => Some(Visibility::Private),
            Some(Keyword::Protected) => Some(Visibility::Protected),
            Some(Keyword::Public) => Some(Visibility::Public),
            Some(Keyword::Published) => Some(Visibility::Published),
            Some(Keyword::Automated) => Some(Visibility::Automated),
            Some(Keyword::Strict) => match self.cur.nth_keyword(1) {
                Some(Keyword::Private) => Some(Visibility::StrictPrivate),
                Some(Keyword::Protected) => Some(Visibility::StrictProtected),
                _ => None,
            },
            _ => None,
        };
        if let Some(new_visibility) = visibility_word {
            if self.cur.at_keyword(Keyword::Strict) {
                self.transparent();
            }
            self.transparent();
            self.set_scope(Scope::Container {
                kind,
                visibility: new_visibility,
                part: DeclPart::Fields,
            });
            return;
        }

        let member = Some(visibility);
        match self.keyword_here() {
            Some(Keyword::Var) => {
                self.transparent();
                self.set_part(DeclPart::Fields);
            }
            Some(Keyword::Class) if self.cur.nth_keyword(1) == Some(Keyword::Var) => {
                self.transparent();
                self.transparent();
                self.set_part(DeclPart::ClassVar);
            }
            Some(Keyword::Class) if self.cur.nth_keyword(1) == Some(Keyword::Property) => {
                self.property_decl(visibility);
            }
            Some(Keyword::Class) if self.class_member_follows() => self.routine_decl(member),
            Some(Keyword::Const) => {
                self.transparent();
                self.set_part(DeclPart::Const);
            }
            Some(Keyword::Type) => {
                self.transparent();
                self.set_part(DeclPart::Type);
            }
            Some(Keyword::Property) => self.property_decl(visibility),
            Some(kw) if kw.is_routine() => self.routine_decl(member),
            Some(Keyword::Case) if matches!(kind, EntryKind::Record | EntryKind::Object) => {
                self.variant_part(visibility, part);
            }
            Some(Keyword::End) => self.close_block(),
            Some(Keyword::Implementation | Keyword::Initialization | Keyword::Finalization) => {
                self.close_to_module();
            }
            Some(Keyword::Begin) => self.close_containers(),
            Some(_) => {
                self.cur.bump();
            }
            _ if self.cur.at_symbol("[") && !matches!(part, DeclPart::Variant { .. }) => {
                self.attribute();
            }
            _ if self.cur.nth_is_name(0) => match part {
                DeclPart::Type => self.type_decl(member),
                DeclPart::Const => self.value_decl(EntryKind::Const, member, false),
                DeclPart::ClassVar => self.value_decl(EntryKind::Field, member, true),
                DeclPart::Variant { depth: 0 } => {
                    // case label
                    self.cur.bump();
                }
                _ => self.value_decl(EntryKind::Field, member, false),
            },
            _ => {
                if let DeclPart::Variant { depth } = part {
                    if self.cur.at_symbol("(") {
                        self.set_part(DeclPart::Variant { depth: depth + 1 });
                    } else if self.cur.at_symbol(")") {
                        self.set_part(DeclPart::Variant {
                            depth: depth.saturating_sub(1),
                        });
                    }
                }
                self.cur.bump();
            }
        }
    }

    /// Declaration part of a routine, before its `begin`.
    fn routine_step(&mut self, part: DeclPart) {
        match self.keyword_here() {
            Some(Keyword::Begin) => {
                self.cur.bump();
                self.set_scope(Scope::Routine {
                    phase: Phase::Body,
                    part,
                });
            }
            Some(Keyword::Asm) => {
                self.cur.bump();
                self.set_scope(Scope::Routine {
                    phase: Phase::Asm,
                    part,
                });
            }
            Some(Keyword::Type) => {
                self.transparent();
                self.set_part(DeclPart::Type);
            }
            Some(Keyword::Const | Keyword::ResourceString) => {
                self.transparent();
                self.set_part(DeclPart::Const);
            }
            Some(Keyword::Var | Keyword::ThreadVar) => {
                self.transparent();
                self.set_part(DeclPart::Var);
            }
            Some(Keyword::Label) => self.skip_statement(),
            Some(Keyword::Class) if self.class_member_follows() => self.routine_decl(None),
            Some(kw) if kw.is_routine() => self.routine_decl(None),
            Some(Keyword::End) => {
                // A routine without a body; let the enclosing block have the `end`.
                tracing::debug!(
                    line = self.cur.location().line,
                    "routine closed by `end` before its body"
                );
                self.close_top(self.cur.prev_end());
            }
            Some(Keyword::Implementation | Keyword::Initialization | Keyword::Finalization) => {
                self.close_to_module();
            }
            Some(_) => {
                self.cur.bump();
            }
            _ if self.cur.at_symbol("[") => self.attribute(),
            _ if self.cur.nth_is_name(0) => match part {
                DeclPart::Type => self.type_decl(None),
                DeclPart::Const => self.value_decl(EntryKind::Const, None, false),
                DeclPart::Var => self.value_decl(EntryKind::Var, None, false),
                _ => {
                    self.cur.bump();
                }
            },
            _ => {
                self.cur.bump();
            }
        }
    }

    fn statement_step(&mut self) {
        match self.cur.peek_keyword() {
            Some(Keyword::Begin | Keyword::Try | Keyword::Case | Keyword::Record) => {
                self.cur.bump();
                self.blocks.push(Block::Statements { asm: false });
            }
            Some(Keyword::Asm) => {
                self.cur.bump();
                self.blocks.push(Block::Statements { asm: true });
            }
            Some(Keyword::End) => self.close_block(),
            Some(Keyword::Implementation | Keyword::Initialization | Keyword::Finalization) => {
                self.close_to_module();
            }
            _ => {
                self.cur.bump();
            }
        }
    }

    fn asm_step(&mut self) {
        if self.cur.at_keyword(Keyword::End) {
            self.close_block();
        } else {
            self.cur.bump();
        }
    }

    // -- Closing blocks -------------------------------------------------------

    /// Consume `end` and close the innermost block. `end.` closes everything
    /// and stops the scan; an `end` with nothing left to close is ignored.
    fn close_block(&mut self) {
        let final_end = self.cur.nth_is_symbol(1, ".");
        self.docs.sync(&self.cur, &mut self.builder);
        self.cur.bump();
        if final_end {
            self.cur.bump();
            self.close_all();
            return;
        }
        match self.blocks.last().copied() {
            Some(Block::Statements { .. }) => {
                self.blocks.pop();
            }
            Some(Block::Entry {
                scope: Scope::Module { .. },
                ..
            })
            | None => {
                tracing::debug!(
                    line = self.cur.prev_end().line,
                    "surplus `end` ignored"
                );
            }
            Some(Block::Entry { id, scope }) => {
                self.blocks.pop();
                if let Scope::Container { .. } = scope {
                    let mut hints = Vec::new();
                    header::directives(&mut self.cur, &mut hints);
                    if let Some(entry) = self.builder.entry_mut(id) {
                        entry.specifiers.extend(hints);
                    }
                }
                self.cur.eat_symbol(";");
                self.builder.pop(self.cur.prev_end());
                self.docs.item_done(&self.cur, &mut self.builder, &[id]);
            }
        }
    }

    /// Pop the innermost block without consuming anything.
    fn close_top(&mut self, end: Location) {
        match self.blocks.last().copied() {
            Some(Block::Entry {
                scope: Scope::Module { .. },
                ..
            })
            | None => {}
            Some(Block::Entry { .. }) => {
                self.blocks.pop();
                self.builder.pop(end);
            }
            Some(Block::Statements { .. }) => {
                self.blocks.pop();
            }
        }
    }

    /// Close everything above the module at a module-level keyword.
    fn close_to_module(&mut self) {
        let end = self.cur.prev_end();
        let mut closed = 0usize;
        while let Some(block) = self.blocks.last().copied() {
            if matches!(
                block,
                Block::Entry {
                    scope: Scope::Module { .. },
                    ..
                }
            ) {
                break;
            }
            self.close_top(end);
            closed += 1;
        }
        if closed > 0 {
            tracing::debug!(
                closed,
                line = self.cur.location().line,
                "closed unterminated blocks at `{}`",
                self.cur.peek_text()
            );
        }
    }

    /// `begin` inside a type body: the type's `end` is missing.
    fn close_containers(&mut self) {
        let end = self.cur.prev_end();
        while let Some(Block::Entry {
            scope: Scope::Container { .. },
            ..
        }) = self.blocks.last()
        {
            self.close_top(end);
        }
        tracing::debug!(
            line = self.cur.location().line,
            "`begin` closed unterminated type declarations"
        );
    }

    /// `end.`: close every block but the module and stop.
    fn close_all(&mut self) {
        let end = self.cur.prev_end();
        while self.blocks.len() > 1 {
            let depth = self.blocks.len();
            self.close_top(end);
            if self.blocks.len() == depth {
                break;
            }
        }
        self.stopped = true;
    }
}

