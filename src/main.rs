use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(
    name = "kernelc",
    version,
    about = "Device-kernel statement compiler: one tree, many dialects"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Emit a kernel description for one or more target dialects
    Emit(cli::emit::EmitArgs),
    /// Validate a kernel description without emitting
    Check(cli::check::CheckArgs),
    /// Print the structural fingerprint of a kernel description
    Hash(cli::hash::HashArgs),
    /// List the built-in target dialects
    Targets,
}

/// Log filter comes from `KERNELC_LOG` (e.g. `KERNELC_LOG=kernelc=debug`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("KERNELC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Emit(args) => cli::emit::cmd_emit(args),
        Command::Check(args) => cli::check::cmd_check(args),
        Command::Hash(args) => cli::hash::cmd_hash(args),
        Command::Targets => cli::targets::cmd_targets(),
    }
}
