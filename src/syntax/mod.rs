//! Collaborator data consumed by the statement tree: tokens, opaque
//! expressions and declared types. The tree never looks inside these
//! beyond asking them to render.

pub mod expr;
pub mod span;
pub mod token;
pub mod types;

use std::borrow::Cow;

pub use expr::{BinOp, Expr, UnaryOp};
pub use span::Span;
pub use token::{Token, TokenKind};
pub use types::{FunctionKind, FunctionSig, Qualifier, Type, VarDecl};

/// Surface spelling decisions needed while rendering leaf payloads.
///
/// Every emission dialect implements this; leaf renderers only see this
/// narrow view of it.
pub trait Spelling {
    /// Spelling of an identifier (builtins such as thread indices are
    /// remapped per dialect).
    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }

    /// Spelling of a type name.
    fn type_name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }

    /// Spelling of a qualifier, or `None` when the dialect has no such
    /// qualifier and it should be dropped.
    fn qualifier(&self, q: Qualifier) -> Option<&str>;
}

/// Plain C spelling: no address spaces, identity identifiers.
pub struct PlainSpelling;

impl Spelling for PlainSpelling {
    fn qualifier(&self, q: Qualifier) -> Option<&str> {
        match q {
            Qualifier::Const => Some("const"),
            Qualifier::Volatile => Some("volatile"),
            Qualifier::Restrict => Some("restrict"),
            Qualifier::Global | Qualifier::Shared | Qualifier::Constant => None,
        }
    }
}
