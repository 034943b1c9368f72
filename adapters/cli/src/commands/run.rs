//! Plays matches between built-in players and tallies the results.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use bomber_core::{GameMode, GameResult, NUM_PLAYERS};
use bomber_system_match::{DoNothingPlayer, Game, Player, RandomPlayer};
use clap::{Parser, ValueEnum};
use tracing::info;

use super::{ModeArg, RuleArgs};

/// Play matches between built-in players
#[derive(Debug, Parser)]
pub(crate) struct Run {
    /// Team composition of every game
    #[arg(short, long, value_enum, default_value = "ffa")]
    mode: ModeArg,

    /// Seed of the first game; later games use the following seeds
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Number of games to play
    #[arg(short, long, default_value = "1")]
    games: u64,

    /// Controller of each seat, comma separated; a single value fills every seat
    #[arg(short, long, value_enum, value_delimiter = ',')]
    players: Vec<PlayerKind>,

    /// Directory receiving one replay log per game
    #[arg(short, long, value_name = "DIR")]
    replay_dir: Option<PathBuf>,

    #[command(flatten)]
    rules: RuleArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PlayerKind {
    /// Uniformly random actions
    Random,
    /// Always stands still
    Idle,
}

#[derive(Debug, Default)]
struct Tally {
    wins: u32,
    ties: u32,
    losses: u32,
}

impl Run {
    pub(crate) fn execute(self) -> Result<()> {
        let config = self.rules.load()?;
        let mode = GameMode::from(self.mode);
        let seats = self.seats()?;
        if let Some(dir) = &self.replay_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let mut tallies: Vec<Tally> = (0..NUM_PLAYERS).map(|_| Tally::default()).collect();
        for game_index in 0..self.games {
            let seed = self.seed.wrapping_add(game_index);
            let players = seats
                .iter()
                .zip(0_u64..)
                .map(|(kind, seat)| build_player(*kind, seed, seat))
                .collect();
            let mut game = Game::new(seed, mode, config, players)
                .with_context(|| format!("failed to set up game with seed {seed}"))?;
            let results = game.run();
            println!(
                "game {game_index} (seed {seed}): {results:?} after {} ticks",
                game.state().tick()
            );

            for (tally, result) in tallies.iter_mut().zip(&results) {
                match result {
                    GameResult::Win => tally.wins += 1,
                    GameResult::Tie => tally.ties += 1,
                    GameResult::Loss => tally.losses += 1,
                    GameResult::Incomplete => {}
                }
            }
            if let Some(dir) = &self.replay_dir {
                let path = dir.join(format!("game_{seed}.json"));
                game.log()
                    .save(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }

        for (seat, tally) in tallies.iter().enumerate() {
            println!(
                "seat {seat}: {} wins, {} ties, {} losses",
                tally.wins, tally.ties, tally.losses
            );
        }
        info!(games = self.games, "all games played");
        Ok(())
    }

    fn seats(&self) -> Result<Vec<PlayerKind>> {
        match self.players.as_slice() {
            [] => Ok(vec![PlayerKind::Random; NUM_PLAYERS]),
            [kind] => Ok(vec![*kind; NUM_PLAYERS]),
            kinds if kinds.len() == NUM_PLAYERS => Ok(kinds.to_vec()),
            kinds => bail!(
                "expected 1 or {NUM_PLAYERS} players, got {}",
                kinds.len()
            ),
        }
    }
}

fn build_player(kind: PlayerKind, seed: u64, seat: u64) -> Box<dyn Player> {
    match kind {
        PlayerKind::Random => Box::new(RandomPlayer::new(
            seed.wrapping_mul(NUM_PLAYERS as u64).wrapping_add(seat),
        )),
        PlayerKind::Idle => Box::new(DoNothingPlayer),
    }
}
