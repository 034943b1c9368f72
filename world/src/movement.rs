//! Proposal, collision resolution and commit of moves.

use std::collections::HashMap;

use bomber_core::{Action, GameResult, Position, TileKind, TileSet, WinPolicy};
use tracing::{debug, warn};

use crate::{
    entities::{Bomb, Mobile},
    grid::Grid,
    ForwardModel,
};

impl<P: WinPolicy> ForwardModel<P> {
    /// Turns each seat's action into a proposed cell or a bomb placement.
    pub(crate) fn translate_actions(&mut self, actions: &[Action]) {
        let Self {
            agents,
            board,
            bombs,
            config,
            statistics,
            ..
        } = self;

        for (seat, agent) in agents.iter_mut().enumerate() {
            if agent.result != GameResult::Incomplete {
                continue;
            }
            let Some(position) = agent.position else {
                continue;
            };
            let action = match actions.get(seat) {
                Some(action) => *action,
                None => {
                    warn!(player = seat, "agent sent no action, standing still");
                    Action::Stop
                }
            };

            let target = action
                .direction()
                .map_or(position, |direction| position.step(direction));
            let _ = propose(agent, target, board, TileSet::OBSTACLES);

            if action == Action::Bomb {
                let free = !bombs.iter().any(|bomb| bomb.position == position);
                let placed = agent.ammo > 0 && free;
                statistics.record_attempt(agent.player(), placed);
                if placed {
                    agent.ammo -= 1;
                    bombs.push(Bomb::new(
                        position,
                        agent.blast_strength,
                        config.bomb_life,
                        Some(agent.player()),
                    ));
                    board.set(position, TileKind::Bomb);
                } else {
                    debug!(player = seat, ammo = agent.ammo, free, "bomb placement failed");
                }
            }
        }
    }

    /// Reverts pairs of occupants that would trade cells.
    pub(crate) fn resolve_swaps(&mut self) {
        let seats = self.alive_seats();
        let Self { agents, bombs, .. } = self;

        for &first in &seats {
            for &second in &seats {
                if first != second && swapped(&agents[first], &agents[second]) {
                    debug!(first, second, "agents swap reverted");
                    agents[first].revert();
                    agents[second].revert();
                }
            }
        }

        for first in 0..bombs.len() {
            for second in 0..bombs.len() {
                if first != second && swapped(&bombs[first], &bombs[second]) {
                    bombs[first].halt();
                    bombs[second].halt();
                }
            }
        }

        for &seat in &seats {
            for bomb in bombs.iter_mut() {
                if swapped(&agents[seat], &*bomb) {
                    bomb.halt();
                }
            }
        }
    }

    /// Reverts every living agent that shares its proposed cell with another.
    pub(crate) fn resolve_agent_overlaps(&mut self) {
        let seats = self.alive_seats();
        let claims = count_claims(seats.iter().filter_map(|seat| self.agents[*seat].desired));
        for seat in seats {
            let agent = &mut self.agents[seat];
            if agent.desired.is_some_and(|cell| claims.get(&cell) > Some(&1)) {
                debug!(seat, "agent overlap reverted");
                agent.revert();
            }
        }
    }

    /// Halts every bomb that shares its proposed cell with another.
    pub(crate) fn resolve_bomb_overlaps(&mut self) {
        let claims = count_claims(self.bombs.iter().map(|bomb| bomb.desired));
        for bomb in &mut self.bombs {
            if claims.get(&bomb.desired) > Some(&1) {
                bomb.halt();
            }
        }
    }

    /// Resolves agents walking into bombs and bombs sliding into agents.
    pub(crate) fn resolve_kicks(&mut self) {
        let seats = self.alive_seats();
        let Self {
            agents,
            bombs,
            board,
            ..
        } = self;

        for bomb in bombs.iter_mut() {
            for &seat in &seats {
                let agent = &mut agents[seat];
                let (Some(position), Some(desired)) = (agent.position, agent.desired) else {
                    continue;
                };
                if bomb.desired == bomb.position {
                    bomb.halt();
                }
                if desired != bomb.desired {
                    continue;
                }

                if !agent.can_kick {
                    agent.revert();
                    bomb.halt();
                    continue;
                }

                let velocity = desired - position;
                if velocity.is_zero() {
                    // A bomb sliding into a standing kicker stops in front of it.
                    if bomb.desired != bomb.position {
                        bomb.halt();
                    }
                    continue;
                }

                bomb.velocity = velocity;
                let target = bomb.desired + velocity;
                if propose(bomb, target, board, TileSet::KICK_BLOCKERS) {
                    debug!(seat, ?velocity, "bomb kicked");
                } else {
                    bomb.halt();
                }
            }
        }
    }

    /// Moves bombs to their proposed cells, pushing back agents heading there.
    pub(crate) fn commit_bombs(&mut self) {
        let Self {
            agents,
            bombs,
            board,
            power_ups,
            ..
        } = self;

        for bomb in bombs.iter_mut() {
            for agent in agents.iter_mut() {
                if agent.is_moving() && agent.desired == Some(bomb.desired) {
                    agent.revert();
                }
            }
            commit(bomb, board, power_ups);
        }
    }

    /// Applies the power-up lying on each living agent's proposed cell.
    pub(crate) fn pick_up_power_ups(&mut self) {
        let seats = self.alive_seats();
        for seat in seats {
            let agent = &mut self.agents[seat];
            let Some(cell) = agent.desired else {
                continue;
            };
            match self.board.at(cell) {
                Some(TileKind::ExtraBomb) => agent.ammo += 1,
                Some(TileKind::IncreaseRange) => agent.blast_strength += 1,
                Some(TileKind::Kick) => agent.can_kick = true,
                _ => continue,
            }
            debug!(seat, ?cell, "power-up collected");
            self.statistics.record_power_up(agent.player());
            self.board.set(cell, TileKind::Passage);
            self.power_ups.set(cell, None);
        }
    }

    pub(crate) fn alive_seats(&self) -> Vec<usize> {
        self.alive.iter().map(|player| player.index()).collect()
    }
}

/// Proposes `target` for `occupant` unless a tile in `blockers` or the board
/// edge is in the way, in which case the occupant stays put.
pub(crate) fn propose<M: Mobile>(
    occupant: &mut M,
    target: Position,
    board: &Grid<TileKind>,
    blockers: TileSet,
) -> bool {
    let legal = board
        .at(target)
        .is_some_and(|tile| !blockers.includes(tile));
    if legal {
        occupant.set_desired(Some(target));
    } else {
        occupant.revert();
    }
    legal
}

/// Writes an occupant's move onto the board.
///
/// The vacated cell shows the power-up hidden there, or passage, unless it
/// still holds a flame, a power-up or another occupant that must stay drawn.
pub(crate) fn commit<M: Mobile>(
    occupant: &mut M,
    board: &mut Grid<TileKind>,
    power_ups: &mut Grid<Option<TileKind>>,
) {
    let (Some(current), Some(next)) = (occupant.position(), occupant.desired()) else {
        return;
    };
    let kind = occupant.kind();

    if current != next {
        match board.at(next) {
            Some(tile) if !TileSet::OBSTACLES.includes(tile) => {
                occupant.set_position(next);
                let mut protected = TileSet::POWER_UPS | TileSet::FLAMES | TileSet::AGENTS;
                protected.remove(TileSet::of(kind));
                if kind == TileKind::Bomb {
                    if tile.is_power_up() {
                        power_ups.set(next, Some(tile));
                    }
                } else {
                    protected |= TileSet::BOMB;
                }
                if board.at(current).is_some_and(|left| !protected.includes(left)) {
                    let revealed = power_ups.get_mut(current).and_then(Option::take);
                    board.set(current, revealed.unwrap_or(TileKind::Passage));
                }
            }
            _ => occupant.revert(),
        }
    }

    if let Some(position) = occupant.position() {
        board.set(position, kind);
    }
}

fn swapped<A: Mobile, B: Mobile>(first: &A, second: &B) -> bool {
    first.is_moving()
        && second.is_moving()
        && first.desired() == second.position()
        && second.desired() == first.position()
}

fn count_claims(cells: impl Iterator<Item = Position>) -> HashMap<Position, usize> {
    let mut claims = HashMap::new();
    for cell in cells {
        *claims.entry(cell).or_insert(0) += 1;
    }
    claims
}
