use std::path::PathBuf;

use clap::Args;

use super::load_tree;

#[derive(Args)]
pub struct HashArgs {
    /// Kernel description (.json)
    pub input: PathBuf,
    /// Print the full 64-character digest
    #[arg(long)]
    pub full: bool,
}

pub fn cmd_hash(args: HashArgs) {
    let (name, _, tree) = load_tree(&args.input);
    let fp = kernelc::fingerprint(&tree, tree.root());
    let label = name.unwrap_or_else(|| args.input.display().to_string());
    if args.full {
        println!("{} {}", fp, label);
    } else {
        println!("{} {}", fp.short(), label);
    }
}
