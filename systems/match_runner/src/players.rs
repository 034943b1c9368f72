//! Baseline players used to drive matches and tests.

use std::collections::VecDeque;

use bomber_core::{Action, MESSAGE_LENGTH};
use bomber_world::{GameState, Message};
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

use crate::Player;

/// Stands still for the whole episode.
#[derive(Clone, Copy, Debug, Default)]
pub struct DoNothingPlayer;

impl Player for DoNothingPlayer {
    fn act(&mut self, _state: &GameState) -> Action {
        Action::Stop
    }
}

/// Picks uniformly among all actions from a seeded stream.
#[derive(Clone, Debug)]
pub struct RandomPlayer {
    rng: ChaCha8Rng,
}

impl RandomPlayer {
    /// Creates a player whose choices are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn act(&mut self, state: &GameState) -> Action {
        let index = self.rng.gen_range(0..state.n_actions());
        Action::ALL.get(index).copied().unwrap_or_default()
    }
}

/// Plays a fixed queue of actions, then stands still.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPlayer {
    script: VecDeque<Action>,
    message: Message,
}

impl ScriptedPlayer {
    /// Creates a player that replays `script` in order.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Action>) -> Self {
        Self {
            script: script.into_iter().collect(),
            message: [0; MESSAGE_LENGTH],
        }
    }

    /// Broadcasts `message` to the teammate after every tick.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = message;
        self
    }

    /// Actions not yet played.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Player for ScriptedPlayer {
    fn act(&mut self, _state: &GameState) -> Action {
        self.script.pop_front().unwrap_or_default()
    }

    fn message(&self) -> Message {
        self.message
    }
}
