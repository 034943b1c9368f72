//! Player-scoped copies of the model.

use bomber_core::{PlayerId, Position, TileKind, Velocity, WinPolicy};

use crate::ForwardModel;

impl<P: WinPolicy> ForwardModel<P> {
    /// Returns an independent copy of the model as `observer` perceives it.
    ///
    /// With no observer the copy is exact. Otherwise cells beyond the
    /// observer's vision turn to fog, unseen avatars lose their position,
    /// unseen bombs and flames are dropped and whatever remains forgets who
    /// owns it and where it is sliding. An observer with a limited range also
    /// loses the hidden power-ups and the inventories of the other avatars.
    #[must_use]
    pub fn reduce(&self, observer: Option<PlayerId>) -> Self {
        let mut view = self.clone();
        let Some(avatar) = observer.and_then(|player| self.avatar(player)) else {
            return view;
        };
        let sight = Sight {
            origin: avatar.position,
            range: avatar.vision_range,
        };

        if sight.range.is_some() {
            for other in &mut view.agents {
                if other.position.is_some_and(|cell| !sight.covers(cell)) {
                    other.position = None;
                    other.desired = None;
                }
                if other.player() != avatar.player() {
                    other.reset_inventory(&self.config);
                }
            }
            for (cell, tile) in self.board.iter() {
                if !sight.covers(cell) && *tile != TileKind::Fog {
                    view.board.set(cell, TileKind::Fog);
                }
            }
            view.power_ups.fill(None);
        }

        view.bombs.retain(|bomb| sight.covers(bomb.position));
        for bomb in &mut view.bombs {
            bomb.owner = None;
            bomb.velocity = Velocity::ZERO;
        }
        view.flames.retain(|flame| sight.covers(flame.position));
        for flame in &mut view.flames {
            flame.owner = None;
        }
        view.refresh_bomb_layers();
        view
    }
}

struct Sight {
    origin: Option<Position>,
    range: Option<u32>,
}

impl Sight {
    fn covers(&self, cell: Position) -> bool {
        match self.range {
            None => true,
            Some(range) => self
                .origin
                .is_some_and(|origin| origin.chebyshev_distance(cell) <= range),
        }
    }
}
