#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic seeded level generation.
//!
//! Boards are mirrored along the main diagonal: every rigid or wood block is
//! placed together with its transposed twin. Agents start one corner
//! distance away from each corner with a free L-shaped breathing space, and
//! a flood fill from the last agent rejects boards with too many unreachable
//! passages. Power-ups are hidden beneath wood on a separate random stream.

use std::collections::HashSet;

use bomber_core::{
    ConfigError, Direction, PlayerId, Position, SimulationConfig, TileKind, NUM_PLAYERS,
};
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use tracing::{debug, instrument};

const BLOCK_STREAM: u64 = 0;
const ITEM_STREAM: u64 = 1;
const MAX_ATTEMPTS: usize = 1_000;

/// Errors raised while generating a level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The configuration cannot produce a board.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// No candidate board satisfied the accessibility bound.
    #[error("no board with at most {max_inaccessible} unreachable passages after {attempts} attempts")]
    Unreachable {
        /// Tolerated unreachable passages.
        max_inaccessible: usize,
        /// Candidate boards tried.
        attempts: usize,
    },
}

/// Board produced by the generator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Level {
    size: usize,
    tiles: Vec<TileKind>,
    power_ups: Vec<Option<TileKind>>,
    agents: [Position; NUM_PLAYERS],
}

impl Level {
    /// Side length of the board.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Row-major tiles of the board.
    #[must_use]
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    /// Row-major power-ups hidden beneath wood.
    #[must_use]
    pub fn power_ups(&self) -> &[Option<TileKind>] {
        &self.power_ups
    }

    /// Starting cells of the agents in seat order.
    #[must_use]
    pub const fn agents(&self) -> &[Position; NUM_PLAYERS] {
        &self.agents
    }

    /// Tile drawn at `position`, if it lies on the board.
    #[must_use]
    pub fn tile(&self, position: Position) -> Option<TileKind> {
        index(self.size, position).and_then(|index| self.tiles.get(index).copied())
    }

    /// Rows of the board as numeric tile keys.
    #[must_use]
    pub fn key_rows(&self) -> Vec<Vec<u8>> {
        self.tiles
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|tile| tile.key()).collect())
            .collect()
    }
}

/// Pure generator of seeded boards.
#[derive(Clone, Copy, Debug)]
pub struct LevelGenerator {
    config: SimulationConfig,
}

impl LevelGenerator {
    /// Creates a generator for the provided rules.
    pub fn new(config: SimulationConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Generates the board for `seed`, retrying until it is accessible enough.
    #[instrument(level = "debug", skip(self))]
    pub fn generate(&self, seed: u64) -> Result<Level, GenerationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(BLOCK_STREAM);
        let size = self.config.board_size;
        let agents = starting_positions(size, self.config.corner_distance);

        for attempt in 0..MAX_ATTEMPTS {
            let tiles = self.make_board(&mut rng, &agents);
            let unreachable = inaccessible_passages(&tiles, size, agents[NUM_PLAYERS - 1]);
            if unreachable <= self.config.max_inaccessible_tiles {
                debug!(attempt, unreachable, "generated board");
                let power_ups = hide_items(&tiles, self.config.num_items, seed);
                return Ok(Level {
                    size,
                    tiles,
                    power_ups,
                    agents,
                });
            }
        }

        Err(GenerationError::Unreachable {
            max_inaccessible: self.config.max_inaccessible_tiles,
            attempts: MAX_ATTEMPTS,
        })
    }

    fn make_board(&self, rng: &mut ChaCha8Rng, agents: &[Position; NUM_PLAYERS]) -> Vec<TileKind> {
        let size = self.config.board_size;
        let mut tiles = vec![TileKind::Passage; size * size];
        let mut available: Vec<Position> = all_positions(size)
            .filter(|position| position.x() != position.y())
            .collect();

        for (player, start) in PlayerId::ALL.iter().zip(agents) {
            set(&mut tiles, size, *start, player.tile());
            available.retain(|position| position != start);
        }

        for cell in breathing_space(size, self.config.corner_distance, self.config.breathing_space) {
            available.retain(|position| *position != cell);
        }

        let mut wood_left = self.config.num_wood;
        let corner = coordinate(self.config.corner_distance);
        let far = coordinate(size) - 1 - corner;
        let passage_start = corner + coordinate(self.config.breathing_space) + 1;
        let passages = coordinate(size) - 2 * passage_start;
        for offset in 0..passages.max(0) {
            let near = Position::new(passage_start + offset, corner);
            let opposite = Position::new(coordinate(size) - 1 - near.x(), far);
            for cell in [near, near.transposed(), opposite, opposite.transposed()] {
                set(&mut tiles, size, cell, TileKind::Wood);
                available.retain(|position| *position != cell);
            }
            wood_left = wood_left.saturating_sub(4);
        }

        let mut rigid_left = self.config.num_rigid;
        while rigid_left > 0 && available.len() > 1 {
            place_block(rng, TileKind::Rigid, &mut available, &mut tiles, size);
            rigid_left = rigid_left.saturating_sub(2);
        }
        while wood_left > 0 && available.len() > 1 {
            place_block(rng, TileKind::Wood, &mut available, &mut tiles, size);
            wood_left = wood_left.saturating_sub(2);
        }

        tiles
    }
}

/// Starting cells of the four agents, clockwise from the top-left corner.
#[must_use]
pub fn starting_positions(size: usize, corner_distance: usize) -> [Position; NUM_PLAYERS] {
    let near = coordinate(corner_distance);
    let far = coordinate(size) - 1 - near;
    [
        Position::new(near, near),
        Position::new(far, near),
        Position::new(far, far),
        Position::new(near, far),
    ]
}

/// Counts passages that cannot be reached from `start` without crossing rigid
/// walls.
#[must_use]
pub fn inaccessible_passages(tiles: &[TileKind], size: usize, start: Position) -> usize {
    let mut unreached: HashSet<Position> = all_positions(size)
        .filter(|position| get(tiles, size, *position) == Some(TileKind::Passage))
        .collect();
    let mut seen = HashSet::new();
    let mut stack = vec![start];

    while let Some(cell) = stack.pop() {
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            let next = cell.step(direction);
            if seen.contains(&next) {
                continue;
            }
            match get(tiles, size, next) {
                None | Some(TileKind::Rigid) => continue,
                Some(_) => {}
            }
            let _ = unreached.remove(&next);
            if unreached.is_empty() {
                return 0;
            }
            let _ = seen.insert(next);
            stack.push(next);
        }
    }

    unreached.len()
}

/// Hides up to `num_items` random power-ups beneath distinct wood tiles.
///
/// The result is row-major and aligned with `tiles`.
#[must_use]
pub fn hide_items(tiles: &[TileKind], num_items: usize, seed: u64) -> Vec<Option<TileKind>> {
    let mut items = vec![None; tiles.len()];
    let mut wood: Vec<usize> = tiles
        .iter()
        .enumerate()
        .filter(|(_, tile)| **tile == TileKind::Wood)
        .map(|(index, _)| index)
        .collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(ITEM_STREAM);

    let mut remaining = num_items.min(wood.len());
    while remaining > 0 {
        let picked = wood.swap_remove(rng.gen_range(0..wood.len()));
        let kind = TileKind::POWER_UPS[rng.gen_range(0..TileKind::POWER_UPS.len())];
        if let Some(slot) = items.get_mut(picked) {
            *slot = Some(kind);
        }
        remaining -= 1;
    }

    items
}

fn place_block(
    rng: &mut ChaCha8Rng,
    kind: TileKind,
    available: &mut Vec<Position>,
    tiles: &mut [TileKind],
    size: usize,
) {
    let picked = available.remove(rng.gen_range(0..available.len()));
    let twin = picked.transposed();
    available.retain(|position| *position != twin);
    set(tiles, size, picked, kind);
    set(tiles, size, twin, kind);
}

fn breathing_space(size: usize, corner_distance: usize, breathing: usize) -> Vec<Position> {
    let near = coordinate(corner_distance);
    let far = coordinate(size) - 1 - near;
    let mut cells = Vec::with_capacity(breathing * 8);
    for step in 1..=coordinate(breathing) {
        cells.extend([
            Position::new(near, near + step),
            Position::new(near + step, near),
            Position::new(far, far - step),
            Position::new(far - step, far),
            Position::new(far, near + step),
            Position::new(far - step, near),
            Position::new(near + step, far),
            Position::new(near, far - step),
        ]);
    }
    cells
}

fn all_positions(size: usize) -> impl Iterator<Item = Position> {
    let side = coordinate(size);
    (0..side).flat_map(move |y| (0..side).map(move |x| Position::new(x, y)))
}

fn coordinate(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn index(size: usize, position: Position) -> Option<usize> {
    let x = usize::try_from(position.x()).ok()?;
    let y = usize::try_from(position.y()).ok()?;
    (x < size && y < size).then(|| y * size + x)
}

fn get(tiles: &[TileKind], size: usize, position: Position) -> Option<TileKind> {
    index(size, position).and_then(|index| tiles.get(index).copied())
}

fn set(tiles: &mut [TileKind], size: usize, position: Position, kind: TileKind) {
    if let Some(slot) = index(size, position).and_then(|index| tiles.get_mut(index)) {
        *slot = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_positions_sit_one_step_inside_the_corners() {
        let starts = starting_positions(11, 1);
        assert_eq!(
            starts,
            [
                Position::new(1, 1),
                Position::new(9, 1),
                Position::new(9, 9),
                Position::new(1, 9)
            ]
        );
    }

    #[test]
    fn walled_in_passages_are_counted() {
        use TileKind::{Passage as P, Rigid as R};
        let tiles = vec![
            P, P, R, P, //
            P, P, R, P, //
            R, R, R, P, //
            P, P, P, P, //
        ];
        assert_eq!(inaccessible_passages(&tiles, 4, Position::new(0, 0)), 7);
        assert_eq!(inaccessible_passages(&tiles, 4, Position::new(3, 3)), 4);
    }

    #[test]
    fn items_only_hide_under_wood() {
        use TileKind::{Passage as P, Wood as W};
        let tiles = vec![P, W, W, P, W, P, P, P, P];
        let items = hide_items(&tiles, 10, 7);
        let placed = items.iter().filter(|item| item.is_some()).count();
        assert_eq!(placed, 3, "item count is capped by the wood available");
        for (tile, item) in tiles.iter().zip(&items) {
            if item.is_some() {
                assert_eq!(*tile, TileKind::Wood);
            }
        }
    }
}
