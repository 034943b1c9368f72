//! Replays a recorded match.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bomber_system_match::ReplayLog;
use clap::Parser;

use super::render_board;

/// Replay a recorded match
#[derive(Debug, Parser)]
pub(crate) struct Replay {
    /// Replay log written by `bomber run --replay-dir`
    #[arg(value_name = "FILE")]
    log: PathBuf,

    /// Draw the board after every tick
    #[arg(short, long)]
    frames: bool,
}

impl Replay {
    pub(crate) fn execute(self) -> Result<()> {
        let log = ReplayLog::load(&self.log)
            .with_context(|| format!("failed to load {}", self.log.display()))?;
        let mut state = log
            .starting_state()
            .context("failed to regenerate the starting level")?;

        if self.frames {
            println!("tick 0\n{}", render_board(&state));
        }
        for actions in log.actions() {
            if !state.next(actions) {
                break;
            }
            if self.frames {
                println!("tick {} {actions:?}\n{}", state.tick(), render_board(&state));
            }
        }

        println!(
            "seed {} ({:?}): {:?} after {} ticks",
            log.seed(),
            log.mode(),
            state.results(),
            state.tick()
        );
        Ok(())
    }
}
