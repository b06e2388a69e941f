use thiserror::Error;

use super::kind::StmtKind;
use super::node::StmtId;

/// Structural invariant violations. Every check runs before the tree is
/// touched, so an `Err` always leaves the tree as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("statement {child} is already owned by {owner}")]
    Ownership { child: StmtId, owner: StmtId },

    #[error("attaching {child} under {owner} would make it its own ancestor")]
    Cycle { child: StmtId, owner: StmtId },

    #[error("the tree root {0} cannot be attached, detached or destroyed")]
    Root(StmtId),

    #[error("'{name}' is already declared in {scope} by {existing}")]
    DuplicateDeclaration {
        name: String,
        scope: StmtId,
        existing: StmtId,
    },

    #[error("'{name}' cannot be declared in {scope}: {decl} lies outside it")]
    ForeignDeclaration {
        name: String,
        scope: StmtId,
        decl: StmtId,
    },

    #[error("malformed if-chain at {at}: {reason}")]
    MalformedChain { at: StmtId, reason: &'static str },

    #[error("cannot clone {root}: {reason} ({at})")]
    UnsupportedClone {
        root: StmtId,
        at: StmtId,
        reason: &'static str,
    },

    #[error("{id} is a {kind} statement, which has no child block")]
    NotAContainer { id: StmtId, kind: StmtKind },

    #[error("{id} fills a required slot of {owner} and cannot be detached")]
    RequiredSlot { id: StmtId, owner: StmtId },

    #[error("no live statement {0}")]
    UnknownStatement(StmtId),
}
