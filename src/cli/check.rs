use std::path::PathBuf;
use std::process;

use clap::Args;

use super::{load_tree, report};

#[derive(Args)]
pub struct CheckArgs {
    /// Kernel description (.json)
    pub input: PathBuf,
    /// Treat warnings as errors
    #[arg(long)]
    pub deny_warnings: bool,
}

pub fn cmd_check(args: CheckArgs) {
    let (_, source, tree) = load_tree(&args.input);
    let diagnostics = kernelc::validate(&tree, tree.root());
    report(&diagnostics, &args.input, &source);

    let failed = diagnostics
        .iter()
        .any(|d| d.is_error() || args.deny_warnings);
    if failed {
        process::exit(1);
    }
    eprintln!("OK: {} ({} statements)", args.input.display(), tree.len());
}
