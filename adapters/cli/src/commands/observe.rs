//! Exports an agent's observation in the bridge format.

use anyhow::{bail, Context, Result};
use bomber_core::{GameMode, PlayerId};
use bomber_world::GameState;
use clap::Parser;

use super::{ModeArg, RuleArgs};

/// Print one agent's observation of a fresh level as JSON
#[derive(Debug, Parser)]
pub(crate) struct Observe {
    /// Team composition of the level
    #[arg(short, long, value_enum, default_value = "ffa")]
    mode: ModeArg,

    /// Seed of the level
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Seat whose observation is printed
    #[arg(short, long, default_value = "0")]
    player: usize,

    /// Hide everything beyond the player's vision first
    #[arg(long)]
    fog: bool,

    #[command(flatten)]
    rules: RuleArgs,
}

impl Observe {
    pub(crate) fn execute(self) -> Result<()> {
        let config = self.rules.load()?;
        let Some(player) = PlayerId::from_index(self.player) else {
            bail!("no seat {}", self.player);
        };
        let state = GameState::new(self.seed, GameMode::from(self.mode), config)
            .context("failed to generate the level")?;
        let state = if self.fog {
            state.copy(Some(player))
        } else {
            state
        };
        let json = bomber_json_bridge::encode(&state, player)
            .context("failed to encode the observation")?;
        println!("{json}");
        Ok(())
    }
}
