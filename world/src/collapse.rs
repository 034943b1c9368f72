//! Late-game shrinking of the arena.

use bomber_core::{PlayerId, Position, TileKind, WinPolicy};
use tracing::debug;

use crate::ForwardModel;

impl<P: WinPolicy> ForwardModel<P> {
    /// Turns the ring scheduled for `tick` into rigid wall.
    pub(crate) fn collapse(&mut self, tick: u32) {
        let Some(stage) = self.config.collapse_stage_at(tick) else {
            return;
        };
        let Some(cells) = ring(self.size(), stage) else {
            return;
        };
        debug!(tick, stage, cells = cells.len(), "ring collapsing");

        let mut crushed = Vec::new();
        for cell in cells {
            self.collapse_cell(cell, &mut crushed);
        }
        if !crushed.is_empty() {
            self.process_deaths(&crushed);
        }
    }

    fn collapse_cell(&mut self, cell: Position, crushed: &mut Vec<PlayerId>) {
        let Self {
            agents,
            alive,
            bombs,
            flames,
            board,
            power_ups,
            bomb_blast_strength,
            bomb_life,
            ..
        } = self;

        bombs.retain(|bomb| {
            if bomb.position != cell {
                return true;
            }
            if let Some(avatar) = bomb.owner.and_then(|player| agents.get_mut(player.index())) {
                avatar.ammo += 1;
            }
            false
        });
        bomb_blast_strength.set(cell, 0);
        bomb_life.set(cell, 0);

        flames.retain(|flame| flame.position != cell);

        for player in alive.iter() {
            if let Some(avatar) = agents.get_mut(player.index()) {
                if avatar.position == Some(cell) && !crushed.contains(player) {
                    debug!(player = player.index(), ?cell, "agent crushed");
                    avatar.life = 0;
                    crushed.push(*player);
                }
            }
        }

        board.set(cell, TileKind::Rigid);
        power_ups.set(cell, None);
    }
}

/// Cells of ring `stage` counted from the border, in collapse order.
fn ring(size: usize, stage: u32) -> Option<Vec<Position>> {
    let low = i32::try_from(stage).ok()?;
    let high = i32::try_from(size).ok()? - low - 1;
    if low > high {
        return None;
    }

    let mut cells = Vec::new();
    for x in low..=high {
        if x == low || x == high {
            for y in (low + 1)..high {
                cells.push(Position::new(x, y));
            }
        }
        cells.push(Position::new(x, low));
        if high != low {
            cells.push(Position::new(x, high));
        }
    }
    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::ring;
    use bomber_core::Position;

    #[test]
    fn outer_ring_covers_the_border_once() {
        let cells = ring(5, 0).expect("ring");
        assert_eq!(cells.len(), 16);
        let mut unique = cells.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 16);
        assert!(cells
            .iter()
            .all(|cell| cell.x() == 0 || cell.y() == 0 || cell.x() == 4 || cell.y() == 4));
    }

    #[test]
    fn inner_rings_shrink_to_the_centre() {
        assert_eq!(ring(5, 1).expect("ring").len(), 8);
        assert_eq!(ring(5, 2), Some(vec![Position::new(2, 2)]));
        assert_eq!(ring(5, 3), None);
    }
}
