//! Library entry points used by the CLI and by embedders.

pub mod pipeline;

#[cfg(test)]
mod tests;

use std::path::Path;

use tracing::info;

use crate::config::resolve_dialect;
use crate::describe::load_kernel;
use crate::dialect::Dialect;
use crate::diagnostic::Diagnostic;

pub use pipeline::{compile_targets, CompiledKernel, TargetOutput};

/// Options controlling a multi-target compile.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Run the structural validator first; errors abort compilation.
    pub validate: bool,
    /// Prefix each output with its dialect's prelude.
    pub prelude: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            validate: true,
            prelude: true,
        }
    }
}

/// Resolve every `--target` value (built-in name or `.toml` override).
pub fn resolve_dialects(targets: &[String]) -> Result<Vec<Box<dyn Dialect>>, Vec<Diagnostic>> {
    let mut dialects = Vec::with_capacity(targets.len());
    let mut errors = Vec::new();
    for target in targets {
        match resolve_dialect(target) {
            Ok(d) => dialects.push(d),
            Err(e) => errors.push(Diagnostic::from(e)),
        }
    }
    if errors.is_empty() {
        Ok(dialects)
    } else {
        Err(errors)
    }
}

/// Load a kernel description and compile it for `targets`.
///
/// Returns the kernel name (falling back to the file stem) with the
/// compiled outputs.
pub fn compile_kernel_file(
    path: &Path,
    targets: &[String],
    options: &CompileOptions,
) -> Result<(String, CompiledKernel), Vec<Diagnostic>> {
    let dialects = resolve_dialects(targets)?;
    let (name, tree) = load_kernel(path).map_err(|e| vec![Diagnostic::from(e)])?;
    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "kernel".to_string())
    });
    info!(kernel = %name, statements = tree.len(), targets = dialects.len(), "compiling");
    let compiled = compile_targets(&tree, &dialects, options)?;
    Ok((name, compiled))
}
