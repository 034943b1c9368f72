//! Minimal record needed to reproduce an episode.

use std::{fs, path::Path};

use bomber_core::{Action, GameMode, SimulationConfig, NUM_PLAYERS};
use bomber_system_level_generation::GenerationError;
use bomber_world::GameState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors raised while storing or replaying a log.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The log file could not be read or written.
    #[error("could not access replay log: {0}")]
    Io(#[from] std::io::Error),
    /// The log is not valid JSON for a replay.
    #[error("could not parse replay log: {0}")]
    Json(#[from] serde_json::Error),
    /// The logged board size disagrees with the logged configuration.
    #[error("log records a {logged}x{logged} board but its configuration asks for {configured}")]
    SizeMismatch {
        /// Board size stored in the log.
        logged: usize,
        /// Board size of the stored configuration.
        configured: usize,
    },
    /// The starting level could not be regenerated.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Seed, rules and per-tick actions of one episode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayLog {
    seed: u64,
    board_size: usize,
    mode: GameMode,
    config: SimulationConfig,
    actions: Vec<[Action; NUM_PLAYERS]>,
}

impl ReplayLog {
    /// Starts an empty log for an episode generated from `seed`.
    #[must_use]
    pub fn new(seed: u64, mode: GameMode, config: SimulationConfig) -> Self {
        Self {
            seed,
            board_size: config.board_size,
            mode,
            config,
            actions: Vec::new(),
        }
    }

    /// Appends the actions of one tick.
    pub fn record(&mut self, actions: [Action; NUM_PLAYERS]) {
        self.actions.push(actions);
    }

    /// Seed of the logged episode.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Team composition of the logged episode.
    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.mode
    }

    /// Rules of the logged episode.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Logged action vectors in tick order.
    #[must_use]
    pub fn actions(&self) -> &[[Action; NUM_PLAYERS]] {
        &self.actions
    }

    /// Serialises the log as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a log produced by [`ReplayLog::to_json`].
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let log: Self = serde_json::from_str(json)?;
        if log.board_size != log.config.board_size {
            return Err(ReplayError::SizeMismatch {
                logged: log.board_size,
                configured: log.config.board_size,
            });
        }
        Ok(log)
    }

    /// Writes the log to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), ticks = self.actions.len(), "replay log written");
        Ok(())
    }

    /// Reads a log from `path`.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Regenerates the episode's starting state.
    pub fn starting_state(&self) -> Result<GameState, ReplayError> {
        Ok(GameState::new(self.seed, self.mode, self.config)?)
    }

    /// Regenerates the episode and plays every logged tick on it.
    pub fn replay(&self) -> Result<GameState, ReplayError> {
        let mut state = self.starting_state()?;
        for actions in &self.actions {
            if !state.next(actions) {
                break;
            }
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use bomber_core::{Action, GameMode, SimulationConfig};

    use super::{ReplayError, ReplayLog};

    #[test]
    fn mismatched_board_sizes_are_rejected() {
        let log = ReplayLog::new(1, GameMode::Team, SimulationConfig::default());
        let mut value: serde_json::Value =
            serde_json::from_str(&log.to_json().expect("log serialises")).expect("valid json");
        value["board_size"] = 9.into();
        let json = value.to_string();
        assert!(matches!(
            ReplayLog::from_json(&json),
            Err(ReplayError::SizeMismatch {
                logged: 9,
                configured: 11
            })
        ));
    }

    #[test]
    fn replay_without_actions_is_the_starting_state() {
        let mut log = ReplayLog::new(5, GameMode::Ffa, SimulationConfig::default());
        let start = log.starting_state().expect("level");
        assert_eq!(log.replay().expect("replay"), start);

        log.record([Action::Up; 4]);
        let stepped = log.replay().expect("replay");
        assert_eq!(stepped.tick(), 1);
    }

    #[test]
    fn garbage_is_not_a_log() {
        assert!(matches!(
            ReplayLog::from_json("{\"seed\": 1}"),
            Err(ReplayError::Json(_))
        ));
    }
}
