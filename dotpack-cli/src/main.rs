//! dotpack: keep configuration packages in sync with their git remotes.
//!
//! # Usage
//!
//! ```text
//! dotpack update [--keep | --force | --strategy <name>] [--json]
//! dotpack push <package>
//! dotpack status [--json]
//! dotpack list
//! dotpack install <url> [--name <name>]
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    install::InstallArgs, list::ListArgs, push::PushArgs, status::StatusArgs,
    update::UpdateArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dotpack",
    version,
    about = "Synchronize configuration packages with their git remotes",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pull remote changes into every package.
    Update(UpdateArgs),

    /// Commit local edits in a package and push them to its remote.
    Push(PushArgs),

    /// Show which packages have remote changes waiting.
    Status(StatusArgs),

    /// List remote-backed packages in the store.
    List(ListArgs),

    /// Clone a remote into the store as a new package.
    Install(InstallArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Update(args) => args.run(),
        Commands::Push(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Install(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
