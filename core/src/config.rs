use serde::{Deserialize, Serialize};

/// Immutable rule set threaded through a single episode.
///
/// Every constant of the game lives here instead of in process-wide state,
/// so episodes with different rules can run side by side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side length of the square board.
    pub board_size: usize,
    /// Rigid blocks placed by the level generator. Must be even.
    pub num_rigid: usize,
    /// Wood blocks placed by the level generator. Must be even.
    pub num_wood: usize,
    /// Power-ups hidden beneath wood.
    pub num_items: usize,
    /// Unreachable passages tolerated before a generated board is discarded.
    pub max_inaccessible_tiles: usize,
    /// Offset of the agents from the board corners.
    pub corner_distance: usize,
    /// Length of the free L-shaped area around every agent.
    pub breathing_space: usize,
    /// Tick at which the episode times out.
    pub max_game_ticks: u32,
    /// Fuse of a freshly placed bomb.
    pub bomb_life: u32,
    /// Lifetime of a freshly created flame.
    pub flame_life: u32,
    /// Blast strength an avatar starts with.
    pub default_bomb_blast: u32,
    /// Ammo an avatar starts with.
    pub default_bomb_ammo: u32,
    /// Whether avatars start with the kick ability.
    pub default_bomb_kick: bool,
    /// Vision range of every avatar. `None` grants full observability.
    pub default_vision_range: Option<u32>,
    /// Whether the outer rings collapse late in the game.
    pub collapse_enabled: bool,
    /// Tick of the first collapse.
    pub collapse_start: u32,
    /// Number of rings that collapse before the timeout.
    pub collapse_stages: u32,
    /// Soft deadline of a single agent decision, in milliseconds.
    pub decision_time_limit_ms: u64,
    /// Whether decisions exceeding the deadline are replaced by STOP.
    pub check_decision_time: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            board_size: 11,
            num_rigid: 20,
            num_wood: 20,
            num_items: 10,
            max_inaccessible_tiles: 4,
            corner_distance: 1,
            breathing_space: 2,
            max_game_ticks: 800,
            bomb_life: 10,
            flame_life: 5,
            default_bomb_blast: 2,
            default_bomb_ammo: 1,
            default_bomb_kick: false,
            default_vision_range: Some(2),
            collapse_enabled: true,
            collapse_start: 500,
            collapse_stages: 4,
            decision_time_limit_ms: 100,
            check_decision_time: false,
        }
    }
}

impl SimulationConfig {
    /// Ticks between two consecutive collapse stages.
    #[must_use]
    pub fn collapse_interval(&self) -> u32 {
        let span = self.max_game_ticks.saturating_sub(self.collapse_start);
        (span / self.collapse_stages.max(1)).max(1)
    }

    /// Index of the ring collapsing at `tick`, if one collapses then.
    #[must_use]
    pub fn collapse_stage_at(&self, tick: u32) -> Option<u32> {
        if !self.collapse_enabled || tick < self.collapse_start {
            return None;
        }
        let elapsed = tick - self.collapse_start;
        let interval = self.collapse_interval();
        (elapsed % interval == 0).then_some(elapsed / interval)
    }

    /// Checks the configuration for values the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < 2 * self.corner_distance + 2 {
            return Err(ConfigError::BoardTooSmall {
                board_size: self.board_size,
                corner_distance: self.corner_distance,
            });
        }
        if self.num_rigid % 2 != 0 {
            return Err(ConfigError::OddBlockCount {
                kind: "rigid",
                count: self.num_rigid,
            });
        }
        if self.num_wood % 2 != 0 {
            return Err(ConfigError::OddBlockCount {
                kind: "wood",
                count: self.num_wood,
            });
        }
        if self.max_game_ticks == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "max_game_ticks",
            });
        }
        if self.bomb_life == 0 {
            return Err(ConfigError::ZeroDuration { field: "bomb_life" });
        }
        if self.flame_life == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "flame_life",
            });
        }
        if self.collapse_enabled {
            if self.collapse_stages == 0 {
                return Err(ConfigError::ZeroDuration {
                    field: "collapse_stages",
                });
            }
            if self.collapse_start >= self.max_game_ticks {
                return Err(ConfigError::CollapseAfterTimeout {
                    collapse_start: self.collapse_start,
                    max_game_ticks: self.max_game_ticks,
                });
            }
        }
        Ok(())
    }
}

/// Reasons a [`SimulationConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The board cannot hold four agents at the configured corner distance.
    #[error("board size {board_size} is too small for corner distance {corner_distance}")]
    BoardTooSmall {
        /// Configured side length.
        board_size: usize,
        /// Configured corner distance.
        corner_distance: usize,
    },
    /// Blocks are placed in mirrored pairs.
    #[error("{kind} block count {count} must be even")]
    OddBlockCount {
        /// Block family.
        kind: &'static str,
        /// Configured count.
        count: usize,
    },
    /// A duration that must be positive was zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Offending field.
        field: &'static str,
    },
    /// The board would start collapsing after the game already ended.
    #[error("collapse starts at tick {collapse_start} but the game ends at {max_game_ticks}")]
    CollapseAfterTimeout {
        /// Configured collapse start.
        collapse_start: u32,
        /// Configured tick limit.
        max_game_ticks: u32,
    },
}
