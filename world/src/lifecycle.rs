//! Fuses, explosions, flames and deaths by fire.

use std::collections::{BTreeSet, HashSet};

use bomber_core::{Direction, PlayerId, Position, TileKind, TileSet, WinPolicy};
use tracing::debug;

use crate::{
    entities::{Flame, Mobile},
    movement::commit,
    ForwardModel,
};

/// Opposite ray pairs in the order an explosion spreads.
const RAYS: [[Direction; 2]; 2] = [
    [Direction::Right, Direction::Left],
    [Direction::Down, Direction::Up],
];

impl<P: WinPolicy> ForwardModel<P> {
    /// Ages every flame and returns the indices of those that burnt out.
    pub(crate) fn tick_flames(&mut self) -> Vec<usize> {
        let mut burnt_out = Vec::new();
        for (index, flame) in self.flames.iter_mut().enumerate() {
            flame.life = flame.life.saturating_sub(1);
            if flame.life == 0 {
                burnt_out.push(index);
            }
        }
        burnt_out
    }

    /// Burns one tick of every fuse and proposes the next cell of kicked bombs.
    pub(crate) fn tick_bombs(&mut self) {
        for bomb in &mut self.bombs {
            bomb.tick();
            let legal = self
                .board
                .at(bomb.desired)
                .is_some_and(|tile| !TileSet::OBSTACLES.includes(tile));
            if !legal {
                bomb.halt();
            }
        }
    }

    /// Detonates every bomb whose fuse ran out or that sits in fire, repeating
    /// until a pass sets nothing off.
    ///
    /// Returns every cell burning this tick, including flames that burnt out
    /// during it.
    pub(crate) fn explode_bombs(&mut self) -> HashSet<Position> {
        let mut burning: HashSet<Position> = self.flames.iter().map(Flame::position).collect();

        loop {
            let mut detonated = HashSet::new();
            for index in 0..self.bombs.len() {
                let Some(bomb) = self.bombs.get(index) else {
                    continue;
                };
                let (origin, blast, owner) = (bomb.position, bomb.blast_strength, bomb.owner);
                let forced = burning.contains(&origin);
                if bomb.life > 0 && !forced {
                    continue;
                }

                if forced {
                    let triggers: BTreeSet<PlayerId> = self
                        .flames
                        .iter()
                        .filter(|flame| flame.position == origin)
                        .filter_map(Flame::owner)
                        .collect();
                    for player in triggers {
                        self.statistics.record_trigger(player);
                    }
                }

                debug!(?origin, blast, forced, "bomb exploded");
                burning.extend(self.cast(origin, blast, owner));
                if let Some(avatar) = owner.and_then(|player| self.agents.get_mut(player.index())) {
                    avatar.ammo += 1;
                }
                let _ = detonated.insert(index);
            }

            if detonated.is_empty() {
                return burning;
            }
            let mut index = 0;
            self.bombs.retain(|_| {
                let keep = !detonated.contains(&index);
                index += 1;
                keep
            });
        }
    }

    /// Lays the flames of a single explosion and returns the cells they cover.
    fn cast(&mut self, origin: Position, blast: u32, owner: Option<PlayerId>) -> Vec<Position> {
        let mut cells = Vec::new();
        let _ = self.ignite(origin, owner, &mut cells);

        let reach = i32::try_from(blast).unwrap_or(i32::MAX);
        for pair in RAYS {
            let mut open = [true; 2];
            for distance in 1..reach {
                if open == [false; 2] {
                    break;
                }
                for (slot, direction) in pair.iter().enumerate() {
                    if open[slot] {
                        let cell = origin.step_by(*direction, distance);
                        open[slot] = self.ignite(cell, owner, &mut cells);
                    }
                }
            }
        }
        cells
    }

    /// Sets `cell` on fire. Returns whether the ray may continue past it.
    fn ignite(&mut self, cell: Position, owner: Option<PlayerId>, cells: &mut Vec<Position>) -> bool {
        let Some(tile) = self.board.at(cell) else {
            return false;
        };
        if tile == TileKind::Rigid {
            return false;
        }
        if tile.is_power_up() {
            self.power_ups.set(cell, Some(tile));
        }
        self.flames
            .push(Flame::new(cell, self.config.flame_life, owner));
        self.board.set(cell, TileKind::Flames);
        cells.push(cell);
        tile != TileKind::Wood
    }

    /// Removes burnt-out flames, uncovering the floor beneath them.
    pub(crate) fn retire_flames(&mut self, burnt_out: &[usize]) {
        let dead: HashSet<usize> = burnt_out.iter().copied().collect();
        for &index in burnt_out {
            let Some(cell) = self.flames.get(index).map(Flame::position) else {
                continue;
            };
            let covered = self
                .flames
                .iter()
                .enumerate()
                .any(|(other, flame)| !dead.contains(&other) && flame.position == cell);
            if !covered {
                let revealed = self.power_ups.get_mut(cell).and_then(Option::take);
                self.board.set(cell, revealed.unwrap_or(TileKind::Passage));
            }
        }

        let mut index = 0;
        self.flames.retain(|_| {
            let keep = !dead.contains(&index);
            index += 1;
            keep
        });
    }

    /// Draws every live flame whose cell lost its glyph.
    pub(crate) fn restamp_flames(&mut self) {
        for flame in &self.flames {
            if self.board.at(flame.position) != Some(TileKind::Flames) {
                self.board.set(flame.position, TileKind::Flames);
            }
        }
    }

    /// Kills living agents heading into fire and commits everyone else.
    pub(crate) fn kill_agents(&mut self, burning: &HashSet<Position>) -> Vec<PlayerId> {
        let mut died = Vec::new();
        for seat in self.alive_seats() {
            let Self {
                agents,
                board,
                power_ups,
                ..
            } = self;
            let Some(agent) = agents.get_mut(seat) else {
                continue;
            };
            let (Some(current), Some(next)) = (agent.position, agent.desired) else {
                continue;
            };

            if burning.contains(&next) {
                debug!(seat, cell = ?next, "agent burnt");
                agent.life = 0;
                died.push(agent.player());
                if board.at(current) == Some(agent.kind()) {
                    board.set(current, TileKind::Passage);
                }
            } else {
                commit(agent, board, power_ups);
            }
        }
        died
    }
}
