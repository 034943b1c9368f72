#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the bomber engine.
//!
//! This crate defines the vocabulary every other crate speaks: the numeric
//! tile and action keys, grid coordinates, player identifiers, game results
//! and modes, the immutable [`SimulationConfig`] threaded through an episode,
//! and the [`WinPolicy`] seam the forward model consults whenever agents die
//! or the tick limit is reached.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

mod config;
mod policy;

pub use config::{ConfigError, SimulationConfig};
pub use policy::{Competitor, WinPolicy};

/// Number of agents taking part in every episode.
pub const NUM_PLAYERS: usize = 4;

/// Number of distinct actions an agent may submit each tick.
pub const NUM_ACTIONS: usize = 6;

/// Number of integers carried by a single team-radio message.
pub const MESSAGE_LENGTH: usize = 5;

/// Kind of occupant drawn in a single board cell.
///
/// Discriminants are the stable numeric keys used by observations and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileKind {
    /// Empty walkable floor.
    Passage = 0,
    /// Indestructible wall.
    Rigid = 1,
    /// Destructible wall that may hide a power-up.
    Wood = 2,
    /// Armed bomb.
    Bomb = 3,
    /// Burning flame left by an explosion.
    Flames = 4,
    /// Cell outside the observer's vision.
    Fog = 5,
    /// Power-up granting one extra bomb.
    ExtraBomb = 6,
    /// Power-up increasing blast strength by one.
    IncreaseRange = 7,
    /// Power-up enabling bomb kicking.
    Kick = 8,
    /// Placeholder used in teammate lists when an agent has no teammate.
    AgentDummy = 9,
    /// Marker of the first agent.
    Agent0 = 10,
    /// Marker of the second agent.
    Agent1 = 11,
    /// Marker of the third agent.
    Agent2 = 12,
    /// Marker of the fourth agent.
    Agent3 = 13,
}

impl TileKind {
    /// Every tile kind in ascending key order.
    pub const ALL: [Self; 14] = [
        Self::Passage,
        Self::Rigid,
        Self::Wood,
        Self::Bomb,
        Self::Flames,
        Self::Fog,
        Self::ExtraBomb,
        Self::IncreaseRange,
        Self::Kick,
        Self::AgentDummy,
        Self::Agent0,
        Self::Agent1,
        Self::Agent2,
        Self::Agent3,
    ];

    /// Power-up kinds that may be hidden under wood.
    pub const POWER_UPS: [Self; 3] = [Self::ExtraBomb, Self::IncreaseRange, Self::Kick];

    /// Stable numeric key of the tile kind.
    #[must_use]
    pub const fn key(self) -> u8 {
        self as u8
    }

    /// Resolves a numeric key back into a tile kind.
    #[must_use]
    pub fn from_key(key: u8) -> Option<Self> {
        Self::ALL.get(usize::from(key)).copied()
    }

    /// Reports whether the kind marks one of the four agents.
    #[must_use]
    pub fn is_agent(self) -> bool {
        TileSet::AGENTS.includes(self)
    }

    /// Reports whether the kind is a collectable power-up.
    #[must_use]
    pub fn is_power_up(self) -> bool {
        TileSet::POWER_UPS.includes(self)
    }

    /// Player drawn by this marker, if the kind is an agent marker.
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        PlayerId::from_tile(self)
    }
}

impl From<TileKind> for i64 {
    fn from(kind: TileKind) -> Self {
        Self::from(kind.key())
    }
}

bitflags::bitflags! {
    /// Set of tile kinds used for declarative membership checks.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TileSet: u16 {
        /// Walkable floor.
        const PASSAGE = 1 << 0;
        /// Indestructible wall.
        const RIGID = 1 << 1;
        /// Destructible wall.
        const WOOD = 1 << 2;
        /// Armed bomb.
        const BOMB = 1 << 3;
        /// Burning flame.
        const FLAMES = 1 << 4;
        /// Unobserved cell.
        const FOG = 1 << 5;
        /// Extra bomb power-up.
        const EXTRA_BOMB = 1 << 6;
        /// Range power-up.
        const INCREASE_RANGE = 1 << 7;
        /// Kick power-up.
        const KICK = 1 << 8;
        /// Teammate placeholder.
        const AGENT_DUMMY = 1 << 9;
        /// First agent.
        const AGENT0 = 1 << 10;
        /// Second agent.
        const AGENT1 = 1 << 11;
        /// Third agent.
        const AGENT2 = 1 << 12;
        /// Fourth agent.
        const AGENT3 = 1 << 13;

        /// Cells that block walking and bomb travel.
        const OBSTACLES = Self::RIGID.bits() | Self::WOOD.bits();
        /// All four agent markers.
        const AGENTS = Self::AGENT0.bits()
            | Self::AGENT1.bits()
            | Self::AGENT2.bits()
            | Self::AGENT3.bits();
        /// Every collectable power-up.
        const POWER_UPS = Self::EXTRA_BOMB.bits()
            | Self::INCREASE_RANGE.bits()
            | Self::KICK.bits();
        /// Cells that stop a kicked bomb.
        const KICK_BLOCKERS = Self::OBSTACLES.bits() | Self::AGENTS.bits();
    }
}

impl TileSet {
    /// Singleton set holding `kind`.
    #[must_use]
    pub const fn of(kind: TileKind) -> Self {
        Self::from_bits_retain(1 << kind.key())
    }

    /// Reports whether `kind` belongs to the set.
    #[must_use]
    pub const fn includes(self, kind: TileKind) -> bool {
        self.bits() & Self::of(kind).bits() != 0
    }
}

/// Action submitted by an agent for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// Stay in place.
    #[default]
    Stop = 0,
    /// Move one cell up.
    Up = 1,
    /// Move one cell down.
    Down = 2,
    /// Move one cell left.
    Left = 3,
    /// Move one cell right.
    Right = 4,
    /// Place a bomb on the current cell.
    Bomb = 5,
}

impl Action {
    /// Every action in ascending key order.
    pub const ALL: [Self; NUM_ACTIONS] = [
        Self::Stop,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Bomb,
    ];

    /// Stable numeric key of the action.
    #[must_use]
    pub const fn key(self) -> u8 {
        self as u8
    }

    /// Resolves a numeric key back into an action.
    #[must_use]
    pub fn from_key(key: u8) -> Option<Self> {
        Self::ALL.get(usize::from(key)).copied()
    }

    /// Movement direction requested by the action, if any.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::Stop | Self::Bomb => None,
        }
    }
}

/// Cardinal directions on the board. Rows grow downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row zero.
    Up,
    /// Away from row zero.
    Down,
    /// Towards column zero.
    Left,
    /// Away from column zero.
    Right,
}

impl Direction {
    /// Unit step taken when travelling in this direction.
    #[must_use]
    pub const fn velocity(self) -> Velocity {
        match self {
            Self::Up => Velocity::new(0, -1),
            Self::Down => Velocity::new(0, 1),
            Self::Left => Velocity::new(-1, 0),
            Self::Right => Velocity::new(1, 0),
        }
    }
}

/// Location of a cell on the board expressed as column `x` and row `y`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Neighbouring position one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let velocity = direction.velocity();
        Self::new(self.x + velocity.dx(), self.y + velocity.dy())
    }

    /// Position `distance` steps away in `direction`.
    #[must_use]
    pub const fn step_by(self, direction: Direction, distance: i32) -> Self {
        let velocity = direction.velocity();
        Self::new(
            self.x.saturating_add(velocity.dx().saturating_mul(distance)),
            self.y.saturating_add(velocity.dy().saturating_mul(distance)),
        )
    }

    /// Chebyshev distance, the metric used for vision.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Returns the position with its coordinates swapped.
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }
}

impl Add<Velocity> for Position {
    type Output = Self;

    fn add(self, velocity: Velocity) -> Self {
        Self::new(self.x + velocity.dx, self.y + velocity.dy)
    }
}

impl Sub for Position {
    type Output = Velocity;

    fn sub(self, other: Self) -> Velocity {
        Velocity::new(self.x - other.x, self.y - other.y)
    }
}

/// Per-tick displacement of a moving object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Velocity {
    dx: i32,
    dy: i32,
}

impl Velocity {
    /// Velocity of an object at rest.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new velocity.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Reports whether the object is at rest.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Identifier of one of the four agents.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(u8);

impl PlayerId {
    /// All players in seat order.
    pub const ALL: [Self; NUM_PLAYERS] = [Self(0), Self(1), Self(2), Self(3)];

    /// Creates a player identifier from a seat index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Resolves the player drawn by an agent marker.
    #[must_use]
    pub fn from_tile(kind: TileKind) -> Option<Self> {
        let key = kind.key().checked_sub(TileKind::Agent0.key())?;
        Self::from_index(usize::from(key))
    }

    /// Seat index of the player.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Board marker drawn for the player.
    #[must_use]
    pub const fn tile(&self) -> TileKind {
        match self.0 {
            0 => TileKind::Agent0,
            1 => TileKind::Agent1,
            2 => TileKind::Agent2,
            _ => TileKind::Agent3,
        }
    }
}

/// Outcome recorded for an agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// The agent's team won.
    Win,
    /// The agent lost.
    Loss,
    /// The game ended in a draw for the agent.
    Tie,
    /// The agent is still playing.
    #[default]
    Incomplete,
}

impl GameResult {
    /// Stable numeric key of the result.
    #[must_use]
    pub const fn key(self) -> u8 {
        match self {
            Self::Win => 0,
            Self::Loss => 1,
            Self::Tie => 2,
            Self::Incomplete => 3,
        }
    }
}

/// Team composition and communication rules of an episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Free for all: every agent plays alone.
    #[default]
    Ffa,
    /// Two teams of two.
    Team,
    /// Two teams of two that may exchange messages.
    TeamRadio,
}

impl GameMode {
    /// Stable numeric key of the mode.
    #[must_use]
    pub const fn key(self) -> u8 {
        match self {
            Self::Ffa => 0,
            Self::Team => 1,
            Self::TeamRadio => 2,
        }
    }

    /// Value of the `game_type` field used by external observation formats.
    #[must_use]
    pub const fn game_type(self) -> u8 {
        self.key() + 1
    }

    /// Resolves a `game_type` value into a mode.
    #[must_use]
    pub const fn from_game_type(game_type: u8) -> Option<Self> {
        match game_type {
            1 => Some(Self::Ffa),
            2 => Some(Self::Team),
            3 => Some(Self::TeamRadio),
            _ => None,
        }
    }

    /// Reports whether agents are paired into teams.
    #[must_use]
    pub const fn is_team(self) -> bool {
        !matches!(self, Self::Ffa)
    }
}

/// Errors raised while building a forward model from caller supplied data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// The simulation configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The board had no rows.
    #[error("board must contain at least one row")]
    EmptyBoard,
    /// A board row did not match the number of rows.
    #[error("board row {row} has {len} cells but the board has {size} rows")]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Number of cells in the row.
        len: usize,
        /// Number of rows in the board.
        size: usize,
    },
    /// A cell carried an unknown numeric key.
    #[error("unknown tile key {key} at ({x}, {y})")]
    UnknownTile {
        /// Offending key.
        key: u8,
        /// Column of the cell.
        x: usize,
        /// Row of the cell.
        y: usize,
    },
    /// The same agent marker appeared twice.
    #[error("agent {player:?} appears more than once on the board")]
    DuplicateAgent {
        /// Player drawn twice.
        player: PlayerId,
    },
    /// An auxiliary grid did not match the board dimensions.
    #[error("{layer} grid does not match the {size}x{size} board")]
    LayerMismatch {
        /// Name of the mismatched layer.
        layer: &'static str,
        /// Board side length.
        size: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::{Action, Direction, GameMode, PlayerId, Position, TileKind, TileSet, Velocity};

    #[test]
    fn tile_keys_round_trip() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(TileKind::from_key(14), None);
    }

    #[test]
    fn agent_markers_map_to_players() {
        assert_eq!(TileKind::Agent2.player(), PlayerId::from_index(2));
        assert_eq!(TileKind::AgentDummy.player(), None);
        assert_eq!(TileKind::Wood.player(), None);
        for player in PlayerId::ALL {
            assert_eq!(player.tile().player(), Some(player));
        }
    }

    #[test]
    fn tile_sets_classify_kinds() {
        assert!(TileKind::Kick.is_power_up());
        assert!(!TileKind::Bomb.is_power_up());
        assert!(TileKind::Agent3.is_agent());
        assert!(!TileKind::AgentDummy.is_agent());
        assert!(TileSet::KICK_BLOCKERS.includes(TileKind::Agent1));
        assert!(TileSet::KICK_BLOCKERS.includes(TileKind::Wood));
        assert!(!TileSet::OBSTACLES.includes(TileKind::Bomb));
    }

    #[test]
    fn actions_map_to_directions() {
        assert_eq!(Action::from_key(5), Some(Action::Bomb));
        assert_eq!(Action::from_key(6), None);
        assert_eq!(Action::Up.direction(), Some(Direction::Up));
        assert_eq!(Action::Bomb.direction(), None);
        let origin = Position::new(4, 5);
        assert_eq!(origin.step(Direction::Up), Position::new(4, 4));
        assert_eq!(origin.step(Direction::Right), Position::new(5, 5));
        assert_eq!(Position::new(4, 3) - origin, Velocity::new(0, -2));
    }

    #[test]
    fn chebyshev_distance_takes_largest_axis() {
        let origin = Position::new(1, 1);
        assert_eq!(origin.chebyshev_distance(Position::new(3, 2)), 2);
        assert_eq!(origin.chebyshev_distance(Position::new(0, 5)), 4);
    }

    #[test]
    fn game_type_values_are_one_based() {
        assert_eq!(GameMode::Ffa.game_type(), 1);
        assert_eq!(GameMode::from_game_type(3), Some(GameMode::TeamRadio));
        assert_eq!(GameMode::from_game_type(0), None);
        assert!(GameMode::Team.is_team());
    }
}
