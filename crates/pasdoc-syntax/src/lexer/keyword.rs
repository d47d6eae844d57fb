//! Structural keywords of Pascal/Delphi/Free Pascal.
//!
//! Only the words the recognizer dispatches on are listed. Contextual words
//! (visibility, package clauses, `operator`) are classified here too but are
//! still valid identifiers wherever a declaration name is expected.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    Asm,
    Begin,
    Case,
    Class,
    Const,
    Constructor,
    Destructor,
    DispInterface,
    End,
    Exports,
    Finalization,
    Function,
    Implementation,
    Initialization,
    Interface,
    Label,
    Library,
    Object,
    Of,
    Packed,
    Procedure,
    Program,
    Property,
    Record,
    ResourceString,
    ThreadVar,
    Try,
    Type,
    Unit,
    Uses,
    Var,
    // contextual
    Automated,
    Contains,
    Operator,
    Package,
    Private,
    Protected,
    Public,
    Published,
    Requires,
    Strict,
}

/// Longest keyword (`implementation`, `initialization`, `resourcestring`).
const MAX_KEYWORD_LEN: usize = 14;

impl Keyword {
    /// Case-insensitive keyword lookup.
    pub fn lookup(text: &str) -> Option<Keyword> {
        if text.len() > MAX_KEYWORD_LEN || !text.is_ascii() {
            return None;
        }
        let mut buf = [0u8; MAX_KEYWORD_LEN];
        for (dst, src) in buf.iter_mut().zip(text.bytes()) {
            *dst = src.to_ascii_lowercase();
        }
        let lower = std::str::from_utf8(&buf[..text.len()]).ok()?;
        let kw = match lower {
            "asm" => Keyword::Asm,
            "begin" => Keyword::Begin,
            "case" => Keyword::Case,
            "class" => Keyword::Class,
            "const" => Keyword::Const,
            "constructor" => Keyword::Constructor,
            "destructor" => Keyword::Destructor,
            "dispinterface" => Keyword::DispInterface,
            "end" => Keyword::End,
            "exports" => Keyword::Exports,
            "finalization" => Keyword::Finalization,
            "function" => Keyword::Function,
            "implementation" => Keyword::Implementation,
            "initialization" => Keyword::Initialization,
            "interface" => Keyword::Interface,
            "label" => Keyword::Label,
            "library" => Keyword::Library,
            "object" => Keyword::Object,
            "of" => Keyword::Of,
            "packed" => Keyword::Packed,
            "procedure" => Keyword::Procedure,
            "program" => Keyword::Program,
            "property" => Keyword::Property,
            "record" => Keyword::Record,
            "resourcestring" => Keyword::ResourceString,
            "threadvar" => Keyword::ThreadVar,
            "try" => Keyword::Try,
            "type" => Keyword::Type,
            "unit" => Keyword::Unit,
            "uses" => Keyword::Uses,
            "var" => Keyword::Var,
            "automated" => Keyword::Automated,
            "contains" => Keyword::Contains,
            "operator" => Keyword::Operator,
            "package" => Keyword::Package,
            "private" => Keyword::Private,
            "protected" => Keyword::Protected,
            "public" => Keyword::Public,
            "published" => Keyword::Published,
            "requires" => Keyword::Requires,
            "strict" => Keyword::Strict,
            _ => return None,
        };
        Some(kw)
    }

    /// Contextual keywords may still name a declaration.
    pub fn is_contextual(self) -> bool {
        matches!(
            self,
            Keyword::Automated
                | Keyword::Contains
                | Keyword::Operator
                | Keyword::Package
                | Keyword::Private
                | Keyword::Protected
                | Keyword::Public
                | Keyword::Published
                | Keyword::Requires
                | Keyword::Strict
        )
    }

    /// Routine-introducing keywords.
    pub fn is_routine(self) -> bool {
        matches!(
            self,
            Keyword::Procedure
                | Keyword::Function
                | Keyword::Constructor
                | Keyword::Destructor
                | Keyword::Operator
        )
    }
}
