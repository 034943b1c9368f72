#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative forward model of the bombing game.
//!
//! [`ForwardModel`] owns the board, the hidden power-up overlay, the bomb
//! layers and every occupant, and advances them one tick at a time through
//! [`ForwardModel::next`]. A tick resolves in a fixed order: actions become
//! proposed cells, flames and bombs age, swaps and overlaps are reverted,
//! kicks are resolved, bombs commit, power-ups are collected, explosions
//! chain until quiet, burnt-out flames uncover the floor, agents standing
//! in fire die, the bomb layers are rebuilt and finally the outer ring may
//! collapse. Every rule violation degrades into "no movement"; nothing in
//! the tick ever fails.
//!
//! [`GameState`] wraps the model with a tick counter, an optional observer
//! and the query surface search agents consume.

use bomber_core::{
    Action, ConstructionError, GameMode, PlayerId, Position, SimulationConfig, TileKind,
    WinPolicy, NUM_PLAYERS,
};
use bomber_system_level_generation::{hide_items, GenerationError, LevelGenerator};
use bomber_system_rules::StandardRules;
use tracing::instrument;

mod collapse;
mod editing;
mod entities;
mod grid;
mod lifecycle;
mod movement;
mod observation;
mod state;
mod statistics;

pub use entities::{Avatar, Bomb, Flame};
pub use grid::Grid;
pub use state::{GameState, Message};
pub use statistics::Statistics;

/// Complete simulation state of one episode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ForwardModel<P = StandardRules> {
    config: SimulationConfig,
    mode: GameMode,
    policy: P,
    board: Grid<TileKind>,
    power_ups: Grid<Option<TileKind>>,
    bomb_blast_strength: Grid<u32>,
    bomb_life: Grid<u32>,
    agents: Vec<Avatar>,
    alive: Vec<PlayerId>,
    bombs: Vec<Bomb>,
    flames: Vec<Flame>,
    statistics: Statistics,
}

impl ForwardModel<StandardRules> {
    /// Generates a fresh level for `seed` under the classic rules.
    pub fn generate(
        seed: u64,
        mode: GameMode,
        config: SimulationConfig,
    ) -> Result<Self, GenerationError> {
        Self::generate_with_policy(seed, mode, config, StandardRules)
    }

    /// Builds a model from rows of numeric tile keys under the classic rules.
    pub fn from_board(
        seed: u64,
        rows: &[Vec<u8>],
        mode: GameMode,
        config: SimulationConfig,
    ) -> Result<Self, ConstructionError> {
        Self::from_board_with_policy(seed, rows, mode, config, StandardRules)
    }
}

impl<P: WinPolicy> ForwardModel<P> {
    /// Generates a fresh level for `seed` under a custom rule set.
    #[instrument(level = "debug", skip(config, policy))]
    pub fn generate_with_policy(
        seed: u64,
        mode: GameMode,
        config: SimulationConfig,
        policy: P,
    ) -> Result<Self, GenerationError> {
        let level = LevelGenerator::new(config)?.generate(seed)?;
        let mut model = Self::empty(level.size(), mode, config, policy);
        if let Some(tiles) = Grid::from_cells(level.size(), level.tiles().to_vec()) {
            for (position, tile) in tiles.iter() {
                model.place_tile(position, *tile);
            }
        }
        if let Some(power_ups) = Grid::from_cells(level.size(), level.power_ups().to_vec()) {
            model.power_ups = power_ups;
        }
        model.refresh_bomb_layers();
        Ok(model)
    }

    /// Builds a model from rows of numeric tile keys under a custom rule set.
    ///
    /// Bomb and flame tiles become fresh bombs and flames, agent markers
    /// become living avatars, and power-ups are hidden beneath wood using
    /// `seed`. Agents missing from the board start out of the game.
    pub fn from_board_with_policy(
        seed: u64,
        rows: &[Vec<u8>],
        mode: GameMode,
        config: SimulationConfig,
        policy: P,
    ) -> Result<Self, ConstructionError> {
        config.validate()?;
        let tiles = parse_rows(rows)?;
        let mut model = Self::empty(tiles.size(), mode, config, policy);
        for (position, tile) in tiles.iter() {
            model.place_tile(position, *tile);
        }
        let items: Vec<TileKind> = tiles.iter().map(|(_, tile)| *tile).collect();
        let hidden = hide_items(&items, config.num_items, seed);
        if let Some(power_ups) = Grid::from_cells(tiles.size(), hidden) {
            model.power_ups = power_ups;
        }
        model.refresh_bomb_layers();
        Ok(model)
    }

    fn empty(size: usize, mode: GameMode, config: SimulationConfig, policy: P) -> Self {
        let agents = PlayerId::ALL
            .iter()
            .map(|player| {
                Avatar::new(
                    *player,
                    &config,
                    policy.team(mode, *player),
                    policy.teammates(mode, *player),
                    policy.enemies(mode, *player),
                )
            })
            .collect();
        Self {
            config,
            mode,
            policy,
            board: Grid::new(size, TileKind::Passage),
            power_ups: Grid::new(size, None),
            bomb_blast_strength: Grid::new(size, 0),
            bomb_life: Grid::new(size, 0),
            agents,
            alive: Vec::with_capacity(NUM_PLAYERS),
            bombs: Vec::new(),
            flames: Vec::new(),
            statistics: Statistics::default(),
        }
    }

    fn place_tile(&mut self, position: Position, tile: TileKind) {
        match tile {
            TileKind::Bomb => self.add_bomb(
                position,
                self.config.default_bomb_blast,
                self.config.bomb_life,
                None,
                true,
            ),
            TileKind::Flames => self.add_flame(position, self.config.flame_life),
            _ => match tile.player() {
                Some(player) => self.add_agent(position, player),
                None => self.board.set(position, tile),
            },
        }
    }

    /// Advances the model by one tick.
    ///
    /// `actions` is indexed by seat. Seats without an entry stand still.
    #[instrument(level = "trace", skip(self, actions))]
    pub fn next(&mut self, actions: &[Action], tick: u32) {
        self.translate_actions(actions);
        let burnt_out = self.tick_flames();
        self.tick_bombs();

        self.resolve_swaps();
        self.resolve_agent_overlaps();
        self.resolve_bomb_overlaps();
        self.resolve_kicks();
        self.resolve_bomb_overlaps();
        self.commit_bombs();
        self.pick_up_power_ups();

        let burning = self.explode_bombs();
        self.retire_flames(&burnt_out);
        self.restamp_flames();

        let died = self.kill_agents(&burning);
        if !died.is_empty() {
            self.process_deaths(&died);
        }

        self.refresh_bomb_layers();
        self.collapse(tick);
    }

    fn process_deaths(&mut self, died: &[PlayerId]) {
        self.policy
            .process_dead_agents(self.mode, self.agents.as_mut_slice(), &mut self.alive, died);
    }

    /// Applies the tick-limit outcome.
    pub fn process_timeout(&mut self) {
        self.policy
            .process_timeout(self.mode, self.agents.as_mut_slice(), &self.alive);
    }

    /// Reports whether the episode is over at `tick`.
    #[must_use]
    pub fn is_ended(&self, tick: u32) -> bool {
        self.policy
            .is_ended(tick, self.config.max_game_ticks, self.agents.as_slice(), &self.alive)
    }

    fn refresh_bomb_layers(&mut self) {
        self.bomb_blast_strength.fill(0);
        self.bomb_life.fill(0);
        for bomb in &self.bombs {
            self.bomb_blast_strength
                .set(bomb.position, bomb.blast_strength);
            self.bomb_life.set(bomb.position, bomb.life);
        }
    }

    /// Rules the episode was created with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Team composition of the episode.
    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.mode
    }

    /// Win policy deciding outcomes.
    #[must_use]
    pub const fn policy(&self) -> &P {
        &self.policy
    }

    /// Side length of the board.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.board.size()
    }

    /// Visible board.
    #[must_use]
    pub const fn board(&self) -> &Grid<TileKind> {
        &self.board
    }

    /// Power-ups hidden beneath wood, bombs or flames.
    #[must_use]
    pub const fn power_ups(&self) -> &Grid<Option<TileKind>> {
        &self.power_ups
    }

    /// Blast strength of the bomb on every cell, zero where there is none.
    #[must_use]
    pub const fn bomb_blast_strength(&self) -> &Grid<u32> {
        &self.bomb_blast_strength
    }

    /// Remaining fuse of the bomb on every cell, zero where there is none.
    #[must_use]
    pub const fn bomb_life(&self) -> &Grid<u32> {
        &self.bomb_life
    }

    /// Every avatar in seat order, dead or alive.
    #[must_use]
    pub fn avatars(&self) -> &[Avatar] {
        &self.agents
    }

    /// Avatar seated at `player`.
    #[must_use]
    pub fn avatar(&self, player: PlayerId) -> Option<&Avatar> {
        self.agents.get(player.index())
    }

    /// Players still competing, in seat order.
    #[must_use]
    pub fn alive(&self) -> &[PlayerId] {
        &self.alive
    }

    /// Armed bombs.
    #[must_use]
    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    /// Burning flames.
    #[must_use]
    pub fn flames(&self) -> &[Flame] {
        &self.flames
    }

    /// Event tallies gathered so far.
    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.statistics
    }
}

fn parse_rows(rows: &[Vec<u8>]) -> Result<Grid<TileKind>, ConstructionError> {
    let size = rows.len();
    if size == 0 {
        return Err(ConstructionError::EmptyBoard);
    }

    let mut cells = Vec::with_capacity(size * size);
    let mut seen = [false; NUM_PLAYERS];
    for (y, row) in rows.iter().enumerate() {
        if row.len() != size {
            return Err(ConstructionError::NotSquare {
                row: y,
                len: row.len(),
                size,
            });
        }
        for (x, key) in row.iter().enumerate() {
            let tile = TileKind::from_key(*key).ok_or(ConstructionError::UnknownTile {
                key: *key,
                x,
                y,
            })?;
            if let Some(player) = tile.player() {
                if let Some(flag) = seen.get_mut(player.index()) {
                    if *flag {
                        return Err(ConstructionError::DuplicateAgent { player });
                    }
                    *flag = true;
                }
            }
            cells.push(tile);
        }
    }

    Grid::from_cells(size, cells).ok_or(ConstructionError::EmptyBoard)
}
