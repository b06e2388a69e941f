use std::collections::HashSet;
use std::path::PathBuf;
use std::process;

use clap::Args;
use kernelc::api::{compile_targets, resolve_dialects, CompileOptions};

use super::{load_tree, report};

#[derive(Args)]
pub struct EmitArgs {
    /// Kernel description (.json)
    pub input: PathBuf,
    /// Target dialect name or .toml override file (repeatable)
    #[arg(short, long = "target", default_value = "serial")]
    pub targets: Vec<String>,
    /// Dialect override file, emitted as an extra target (repeatable)
    #[arg(long = "dialect-config", value_name = "PATH")]
    pub dialect_configs: Vec<PathBuf>,
    /// Output directory (default: print to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Omit the dialect prelude
    #[arg(long)]
    pub no_prelude: bool,
    /// Emit even if validation reports errors
    #[arg(long)]
    pub no_validate: bool,
}

pub fn cmd_emit(args: EmitArgs) {
    let EmitArgs {
        input,
        mut targets,
        dialect_configs,
        output,
        no_prelude,
        no_validate,
    } = args;
    targets.extend(dialect_configs.iter().map(|p| p.display().to_string()));

    let (name, source, tree) = load_tree(&input);
    let name = name.unwrap_or_else(|| {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "kernel".to_string())
    });

    let dialects = match resolve_dialects(&targets) {
        Ok(d) => d,
        Err(errors) => {
            report(&errors, &input, &source);
            process::exit(1);
        }
    };
    let options = CompileOptions {
        validate: !no_validate,
        prelude: !no_prelude,
    };
    let compiled = match compile_targets(&tree, &dialects, &options) {
        Ok(c) => c,
        Err(errors) => {
            report(&errors, &input, &source);
            process::exit(1);
        }
    };
    report(&compiled.warnings, &input, &source);

    let Some(dir) = output else {
        for out in &compiled.outputs {
            if compiled.outputs.len() > 1 {
                println!("// --- {} ---", out.target);
            }
            print!("{}", out.source);
        }
        return;
    };

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("error: cannot create '{}': {}", dir.display(), e);
        process::exit(1);
    }
    // Two targets sharing an extension get the target name spliced in.
    let mut written = HashSet::new();
    for out in &compiled.outputs {
        let mut path = dir.join(format!("{}{}", name, out.extension));
        if !written.insert(path.clone()) {
            path = dir.join(format!("{}.{}{}", name, out.target, out.extension));
            written.insert(path.clone());
        }
        if let Err(e) = std::fs::write(&path, &out.source) {
            eprintln!("error: cannot write '{}': {}", path.display(), e);
            process::exit(1);
        }
        eprintln!("Emitted {} ({}) -> {}", name, out.target, path.display());
    }
}
