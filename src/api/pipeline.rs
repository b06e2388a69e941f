//! Multi-target pipeline: validate once, then fork one independent clone
//! per dialect and emit every clone on the rayon pool.

use rayon::prelude::*;
use tracing::{debug, debug_span, info_span, warn};

use super::CompileOptions;
use crate::dialect::Dialect;
use crate::diagnostic::Diagnostic;
use crate::emit::{emit, emit_program};
use crate::hash::{fingerprint, Fingerprint};
use crate::syntax::Span;
use crate::tree::StatementTree;
use crate::validate::validate;

/// Emitted source for one target.
#[derive(Clone, Debug)]
pub struct TargetOutput {
    pub target: String,
    /// File extension including the dot.
    pub extension: String,
    pub source: String,
    /// Fingerprint of the clone the source was emitted from.
    pub fingerprint: Fingerprint,
}

#[derive(Clone, Debug)]
pub struct CompiledKernel {
    /// One entry per requested dialect, in request order.
    pub outputs: Vec<TargetOutput>,
    /// Non-fatal validator findings.
    pub warnings: Vec<Diagnostic>,
}

fn emit_target(
    tree: &StatementTree,
    dialect: &dyn Dialect,
    expected: Fingerprint,
    options: &CompileOptions,
) -> Result<TargetOutput, Diagnostic> {
    let _span = debug_span!("target", name = dialect.name()).entered();
    let clone = tree.fork()?;
    let actual = fingerprint(&clone, clone.root());
    if actual != expected {
        return Err(Diagnostic::error(
            format!("clone for target '{}' diverged from its source", dialect.name()),
            Span::dummy(),
        )
        .with_note(format!("expected {}, found {}", expected.short(), actual.short())));
    }
    let source = if options.prelude {
        emit_program(&clone, dialect)
    } else {
        emit(&clone, clone.root(), dialect)
    };
    debug!(bytes = source.len(), fingerprint = %actual.short(), "emitted");
    Ok(TargetOutput {
        target: dialect.name().to_string(),
        extension: dialect.file_extension().to_string(),
        source,
        fingerprint: actual,
    })
}

/// Compile `tree` for every dialect. Validation errors (or any failed
/// target) abort with all collected diagnostics.
pub fn compile_targets(
    tree: &StatementTree,
    dialects: &[Box<dyn Dialect>],
    options: &CompileOptions,
) -> Result<CompiledKernel, Vec<Diagnostic>> {
    let _span = info_span!("compile_targets", targets = dialects.len()).entered();

    let mut warnings = Vec::new();
    if options.validate {
        let (errors, rest): (Vec<_>, Vec<_>) = validate(tree, tree.root())
            .into_iter()
            .partition(Diagnostic::is_error);
        if !errors.is_empty() {
            return Err(errors);
        }
        for w in &rest {
            warn!(message = %w.message, "validation warning");
        }
        warnings = rest;
    }

    let expected = fingerprint(tree, tree.root());
    let results: Vec<Result<TargetOutput, Diagnostic>> = dialects
        .par_iter()
        .map(|dialect| emit_target(tree, dialect.as_ref(), expected, options))
        .collect();

    let mut outputs = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(out) => outputs.push(out),
            Err(diag) => errors.push(diag),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(CompiledKernel { outputs, warnings })
}
