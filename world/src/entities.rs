//! Board occupants that carry state beyond their tile glyph.

use bomber_core::{Competitor, GameResult, PlayerId, Position, SimulationConfig, TileKind, Velocity};

/// Capability shared by occupants that propose a next cell each tick.
pub(crate) trait Mobile {
    fn kind(&self) -> TileKind;

    fn position(&self) -> Option<Position>;

    fn desired(&self) -> Option<Position>;

    fn set_desired(&mut self, desired: Option<Position>);

    fn set_position(&mut self, position: Position);

    /// Reports whether the occupant wants to leave its cell.
    fn is_moving(&self) -> bool {
        match (self.position(), self.desired()) {
            (Some(position), Some(desired)) => position != desired,
            _ => false,
        }
    }

    /// Gives up the proposed move.
    fn revert(&mut self) {
        let position = self.position();
        if position.is_some() {
            self.set_desired(position);
        }
    }
}

/// Agent body together with its inventory and outcome.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Avatar {
    player: PlayerId,
    pub(crate) position: Option<Position>,
    pub(crate) desired: Option<Position>,
    pub(crate) life: u32,
    pub(crate) can_kick: bool,
    pub(crate) ammo: u32,
    pub(crate) blast_strength: u32,
    pub(crate) vision_range: Option<u32>,
    pub(crate) result: GameResult,
    team: usize,
    teammates: Vec<TileKind>,
    enemies: Vec<TileKind>,
}

impl Avatar {
    pub(crate) fn new(
        player: PlayerId,
        config: &SimulationConfig,
        team: usize,
        teammates: Vec<TileKind>,
        enemies: Vec<TileKind>,
    ) -> Self {
        Self {
            player,
            position: None,
            desired: None,
            life: 1,
            can_kick: config.default_bomb_kick,
            ammo: config.default_bomb_ammo,
            blast_strength: config.default_bomb_blast,
            vision_range: config.default_vision_range,
            result: GameResult::Loss,
            team,
            teammates,
            enemies,
        }
    }

    /// Restores the inventory an avatar starts the game with.
    pub(crate) fn reset_inventory(&mut self, config: &SimulationConfig) {
        self.can_kick = config.default_bomb_kick;
        self.ammo = config.default_bomb_ammo;
        self.blast_strength = config.default_bomb_blast;
    }

    /// Seat of the avatar.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Current cell; `None` when unobserved.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        self.position
    }

    /// Cell the avatar proposed during the last tick.
    #[must_use]
    pub const fn desired(&self) -> Option<Position> {
        self.desired
    }

    /// Remaining life; zero once killed.
    #[must_use]
    pub const fn life(&self) -> u32 {
        self.life
    }

    /// Whether walking into a bomb kicks it.
    #[must_use]
    pub const fn can_kick(&self) -> bool {
        self.can_kick
    }

    /// Bombs the avatar may still place.
    #[must_use]
    pub const fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Blast strength of the bombs the avatar places.
    #[must_use]
    pub const fn blast_strength(&self) -> u32 {
        self.blast_strength
    }

    /// Vision range; `None` grants full observability.
    #[must_use]
    pub const fn vision_range(&self) -> Option<u32> {
        self.vision_range
    }

    /// Outcome recorded for the avatar.
    #[must_use]
    pub const fn result(&self) -> GameResult {
        self.result
    }

    /// Team the avatar plays for.
    #[must_use]
    pub const fn team(&self) -> usize {
        self.team
    }

    /// Markers of the avatar's teammates.
    #[must_use]
    pub fn teammates(&self) -> &[TileKind] {
        &self.teammates
    }

    /// Markers of the avatar's opponents.
    #[must_use]
    pub fn enemies(&self) -> &[TileKind] {
        &self.enemies
    }
}

impl Mobile for Avatar {
    fn kind(&self) -> TileKind {
        self.player.tile()
    }

    fn position(&self) -> Option<Position> {
        self.position
    }

    fn desired(&self) -> Option<Position> {
        self.desired
    }

    fn set_desired(&mut self, desired: Option<Position>) {
        self.desired = desired;
    }

    fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }
}

impl Competitor for Avatar {
    fn player(&self) -> PlayerId {
        self.player
    }

    fn result(&self) -> GameResult {
        self.result
    }

    fn set_result(&mut self, result: GameResult) {
        self.result = result;
    }
}

/// Armed bomb waiting for its fuse.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bomb {
    pub(crate) position: Position,
    pub(crate) desired: Position,
    pub(crate) life: u32,
    pub(crate) blast_strength: u32,
    pub(crate) owner: Option<PlayerId>,
    pub(crate) velocity: Velocity,
}

impl Bomb {
    pub(crate) const fn new(
        position: Position,
        blast_strength: u32,
        life: u32,
        owner: Option<PlayerId>,
    ) -> Self {
        Self {
            position,
            desired: position,
            life,
            blast_strength,
            owner,
            velocity: Velocity::ZERO,
        }
    }

    /// Burns one tick of fuse and proposes the next cell along the velocity.
    pub(crate) fn tick(&mut self) {
        self.life = self.life.saturating_sub(1);
        self.desired = self.position + self.velocity;
    }

    /// Stops the bomb on its current cell.
    pub(crate) fn halt(&mut self) {
        self.desired = self.position;
        self.velocity = Velocity::ZERO;
    }

    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Remaining fuse.
    #[must_use]
    pub const fn life(&self) -> u32 {
        self.life
    }

    /// Reach of the explosion, counting the bomb's own cell.
    #[must_use]
    pub const fn blast_strength(&self) -> u32 {
        self.blast_strength
    }

    /// Player that placed the bomb, when known.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Per-tick displacement while kicked.
    #[must_use]
    pub const fn velocity(&self) -> Velocity {
        self.velocity
    }
}

impl Mobile for Bomb {
    fn kind(&self) -> TileKind {
        TileKind::Bomb
    }

    fn position(&self) -> Option<Position> {
        Some(self.position)
    }

    fn desired(&self) -> Option<Position> {
        Some(self.desired)
    }

    fn set_desired(&mut self, desired: Option<Position>) {
        if let Some(desired) = desired {
            self.desired = desired;
        }
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

/// Flame left behind by an explosion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Flame {
    pub(crate) position: Position,
    pub(crate) life: u32,
    pub(crate) owner: Option<PlayerId>,
}

impl Flame {
    pub(crate) const fn new(position: Position, life: u32, owner: Option<PlayerId>) -> Self {
        Self {
            position,
            life,
            owner,
        }
    }

    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Ticks until the flame burns out.
    #[must_use]
    pub const fn life(&self) -> u32 {
        self.life
    }

    /// Player whose bomb created the flame, when known.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }
}
