pub mod check;
pub mod emit;
pub mod hash;
pub mod targets;

use std::path::Path;
use std::process;

use kernelc::diagnostic::{render_diagnostics, Diagnostic};
use kernelc::StatementTree;

/// Read a kernel description's text, exiting on I/O failure. The text is
/// kept so diagnostics can point into it.
pub fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Render diagnostics against the description file they refer to.
pub fn report(diagnostics: &[Diagnostic], path: &Path, source: &str) {
    let filename = path.display().to_string();
    if let Err(e) = render_diagnostics(diagnostics, &filename, source) {
        eprintln!("error: cannot render diagnostics: {}", e);
    }
}

/// Build a description into a tree, exiting with rendered diagnostics on
/// failure.
pub fn load_tree(path: &Path) -> (Option<String>, String, StatementTree) {
    let source = read_source(path);
    let desc = kernelc::describe::KernelDescription::from_json(&source)
        .and_then(|d| {
            let name = d.name.clone();
            d.into_tree().map(|tree| (name, tree))
        });
    match desc {
        Ok((name, tree)) => (name, source, tree),
        Err(e) => {
            report(&[Diagnostic::from(e)], path, &source);
            process::exit(1);
        }
    }
}
