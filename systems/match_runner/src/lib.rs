#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Episode orchestration.
//!
//! [`Game`] owns the authoritative [`GameState`] and four [`Player`]s. Every
//! tick each competing player receives its own reduced copy of the state,
//! decisions are gathered in parallel, slow decisions are replaced by STOP
//! and the resulting action vector advances the episode and is appended to
//! a [`ReplayLog`].

use std::time::{Duration, Instant};

use bomber_core::{
    Action, GameMode, GameResult, PlayerId, SimulationConfig, MESSAGE_LENGTH, NUM_PLAYERS,
};
use bomber_system_level_generation::GenerationError;
use bomber_world::{GameState, Message};
use rayon::prelude::*;
use tracing::{debug, info, warn};

mod players;
mod replay;

pub use players::{DoNothingPlayer, RandomPlayer, ScriptedPlayer};
pub use replay::{ReplayError, ReplayLog};

/// Decision maker controlling one avatar.
pub trait Player: Send {
    /// Chooses the action for the current tick from the player's own view.
    fn act(&mut self, state: &GameState) -> Action;

    /// Radio message for the teammate, read after every tick of a radio game.
    fn message(&self) -> Message {
        [0; MESSAGE_LENGTH]
    }

    /// Receives the final outcome and reward once the episode is over.
    fn on_result(&mut self, _result: GameResult, _reward: f64) {}
}

/// Errors raised while setting up a match.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// A match needs exactly one player per seat.
    #[error("a match needs {expected} players, got {found}")]
    PlayerCount {
        /// Seats on the board.
        expected: usize,
        /// Players supplied.
        found: usize,
    },
    /// The level could not be generated.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Single episode between four players.
pub struct Game {
    state: GameState,
    players: Vec<Box<dyn Player>>,
    overtimes: [u32; NUM_PLAYERS],
    log: ReplayLog,
}

impl Game {
    /// Generates the level for `seed` and seats `players` in order.
    pub fn new(
        seed: u64,
        mode: GameMode,
        config: SimulationConfig,
        players: Vec<Box<dyn Player>>,
    ) -> Result<Self, MatchError> {
        if players.len() != NUM_PLAYERS {
            return Err(MatchError::PlayerCount {
                expected: NUM_PLAYERS,
                found: players.len(),
            });
        }
        let state = GameState::new(seed, mode, config)?;
        Ok(Self {
            state,
            players,
            overtimes: [0; NUM_PLAYERS],
            log: ReplayLog::new(seed, mode, config),
        })
    }

    /// Plays ticks until the episode ends and hands every player its result.
    pub fn run(&mut self) -> Vec<GameResult> {
        info!(
            seed = self.state.seed(),
            mode = ?self.state.game_mode(),
            "match started"
        );
        while !self.state.is_ended() {
            if !self.tick() {
                break;
            }
        }
        self.terminate()
    }

    /// Gathers one action per seat and advances the episode by one tick.
    ///
    /// Returns `false` once the tick limit had already been reached.
    pub fn tick(&mut self) -> bool {
        let actions = self.decide();
        self.log.record(actions);
        let advanced = self.state.next(&actions);
        self.update_messages();
        advanced
    }

    fn decide(&mut self) -> [Action; NUM_PLAYERS] {
        let config = *self.state.model().config();
        let limit = Duration::from_millis(config.decision_time_limit_ms);
        let views: Vec<GameState> = PlayerId::ALL
            .iter()
            .map(|player| self.state.copy(Some(*player)))
            .collect();

        let decisions: Vec<Option<(Action, Duration)>> = self
            .players
            .par_iter_mut()
            .zip(views.par_iter())
            .map(|(player, view)| {
                if view.winner() != GameResult::Incomplete {
                    return None;
                }
                let started = Instant::now();
                let action = player.act(view);
                Some((action, started.elapsed()))
            })
            .collect();

        let mut actions = [Action::Stop; NUM_PLAYERS];
        let seats = actions.iter_mut().zip(self.overtimes.iter_mut());
        for (seat, ((slot, overtime), decision)) in seats.zip(decisions).enumerate() {
            let Some((action, elapsed)) = decision else {
                continue;
            };
            if config.check_decision_time && elapsed > limit {
                warn!(
                    seat,
                    elapsed_ms = elapsed.as_millis(),
                    "decision overran its deadline, playing STOP"
                );
                *overtime += 1;
                continue;
            }
            *slot = action;
        }
        debug!(tick = self.state.tick(), ?actions, "actions gathered");
        actions
    }

    fn update_messages(&mut self) {
        if self.state.game_mode() != GameMode::TeamRadio {
            return;
        }
        let deliveries: Vec<(PlayerId, Message)> = self
            .state
            .avatars()
            .iter()
            .map(|avatar| {
                let message = avatar
                    .teammates()
                    .first()
                    .and_then(|marker| marker.player())
                    .and_then(|mate| self.state.model().avatar(mate))
                    .filter(|mate| mate.result() == GameResult::Incomplete)
                    .and_then(|mate| self.players.get(mate.player().index()))
                    .map_or([0; MESSAGE_LENGTH], |player| player.message());
                (avatar.player(), message)
            })
            .collect();
        for (player, message) in deliveries {
            self.state.set_message(player, message);
        }
    }

    fn terminate(&mut self) -> Vec<GameResult> {
        let results = self.state.results();
        let rewards = self.state.rewards();
        for ((player, result), reward) in self.players.iter_mut().zip(&results).zip(&rewards) {
            player.on_result(*result, *reward);
        }
        info!(
            tick = self.state.tick(),
            ?results,
            overtimes = ?self.overtimes,
            "match finished"
        );
        results
    }

    /// Authoritative state of the episode.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Decisions per seat that were replaced by STOP for overrunning the
    /// deadline.
    #[must_use]
    pub const fn overtimes(&self) -> &[u32; NUM_PLAYERS] {
        &self.overtimes
    }

    /// Actions played so far.
    #[must_use]
    pub const fn log(&self) -> &ReplayLog {
        &self.log
    }
}
