//! # lumina CLI entry point
//!
//! Parses command-line arguments, initialises tracing, and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lumina_cli::cycle::{run_cycle, CycleArgs};
use lumina_cli::guardian::{run_guardian, GuardianArgs};
use lumina_cli::sage::{run_sage, SageArgs};

/// Lumina: cycle companion, Sage, and guardian walks.
#[derive(Parser, Debug)]
#[command(name = "lumina", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Guardian personal-safety sessions.
    Guardian(GuardianArgs),

    /// Cycle phases and logged entries.
    Cycle(CycleArgs),

    /// Insights, chat, and image analysis from the Sage.
    Sage(SageArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match &cli.command {
        Commands::Guardian(args) => run_guardian(args).await,
        Commands::Cycle(args) => run_cycle(args).await,
        Commands::Sage(args) => run_sage(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_guardian_simulate_defaults() {
        let cli = Cli::try_parse_from(["lumina", "guardian", "simulate"]).unwrap();
        assert!(matches!(cli.command, Commands::Guardian(_)));
        assert_eq!(cli.verbose, 0);
        assert!(!cli.log_json);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lumina", "cycle", "phase", "--day", "3", "-vv", "--log-json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
    }

    #[test]
    fn parse_sage_chat_requires_message() {
        assert!(Cli::try_parse_from(["lumina", "sage", "chat"]).is_err());
        assert!(Cli::try_parse_from(["lumina", "sage", "chat", "hello"]).is_ok());
    }
}
