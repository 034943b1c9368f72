#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays, replays and exports bombing matches.
//!
//! Logs go to stderr and honour `RUST_LOG`; results and exported JSON go to
//! stdout.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Observe, Replay, Run};
use tracing_subscriber::EnvFilter;

/// Bombing game forward model
#[derive(Parser)]
#[command(name = "bomber")]
#[command(about = "Play and inspect four-agent bombing matches", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play matches between built-in players
    Run(Run),

    /// Replay a recorded match
    Replay(Replay),

    /// Print one agent's observation of a fresh level as JSON
    Observe(Observe),
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Replay(cmd) => cmd.execute(),
        Command::Observe(cmd) => cmd.execute(),
    }
}
