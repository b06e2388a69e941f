//! `kernelc`: the statement layer of a source-to-source device-kernel
//! compiler.
//!
//! A parsed kernel is held in a [`StatementTree`]; the tree is deep-cloned
//! once per target with [`StatementTree::fork`] and each clone is emitted
//! through a [`Dialect`] (serial C++, CUDA, OpenCL, Metal, or a TOML
//! override of one of those).

pub mod api;
pub mod config;
pub mod describe;
pub mod dialect;
pub mod diagnostic;
pub mod emit;
pub mod hash;
pub mod syntax;
pub mod tree;
pub mod validate;

pub use api::{compile_targets, CompileOptions, CompiledKernel, TargetOutput};
pub use diagnostic::Diagnostic;
pub use dialect::{create_dialect, Dialect};
pub use emit::{emit, emit_program};
pub use hash::{fingerprint, Fingerprint};
pub use tree::{StatementTree, Stmt, StmtId, StmtKind, TreeError};
pub use validate::validate;
