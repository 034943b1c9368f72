//! Mutation helpers for seeding custom scenarios.
//!
//! None of these helpers runs any game rule; they only keep the board, the
//! overlay, the bomb layers and the entity lists consistent with each other.

use bomber_core::{GameResult, PlayerId, Position, TileKind, Velocity, WinPolicy};

use crate::{
    entities::{Bomb, Flame},
    ForwardModel,
};

impl<P: WinPolicy> ForwardModel<P> {
    /// Arms a bomb at `position`. When `draw` is false the bomb exists
    /// without its glyph, as under an agent that just placed it.
    pub fn add_bomb(
        &mut self,
        position: Position,
        blast_strength: u32,
        life: u32,
        owner: Option<PlayerId>,
        draw: bool,
    ) {
        if !self.board.contains(position) {
            return;
        }
        self.bombs
            .push(Bomb::new(position, blast_strength, life, owner));
        self.bomb_blast_strength.set(position, blast_strength);
        self.bomb_life.set(position, life);
        if draw {
            self.board.set(position, TileKind::Bomb);
        }
    }

    /// Lights an unattributed flame at `position`.
    pub fn add_flame(&mut self, position: Position, life: u32) {
        if !self.board.contains(position) {
            return;
        }
        self.flames.push(Flame::new(position, life, None));
        self.board.set(position, TileKind::Flames);
    }

    /// Places a power-up on the board, or hides it in the overlay when
    /// `visible` is false. Other kinds are ignored.
    pub fn add_power_up(&mut self, position: Position, kind: TileKind, visible: bool) {
        if !kind.is_power_up() {
            return;
        }
        if visible {
            self.board.set(position, kind);
        } else {
            self.power_ups.set(position, Some(kind));
        }
    }

    /// Places an avatar at `position` and enters it into the game.
    pub fn add_agent(&mut self, position: Position, player: PlayerId) {
        if !self.board.contains(position) {
            return;
        }
        let Some(avatar) = self.agents.get_mut(player.index()) else {
            return;
        };
        avatar.position = Some(position);
        avatar.desired = Some(position);
        avatar.life = 1;
        avatar.result = GameResult::Incomplete;
        if let Err(slot) = self.alive.binary_search(&player) {
            self.alive.insert(slot, player);
        }
        self.board.set(position, player.tile());
    }

    /// Draws `kind` at `position`, creating the matching entity for bombs,
    /// flames, agents and power-ups.
    pub fn add_object(&mut self, position: Position, kind: TileKind) {
        match kind {
            TileKind::Bomb => self.add_bomb(
                position,
                self.config.default_bomb_blast,
                self.config.bomb_life,
                None,
                true,
            ),
            TileKind::Flames => self.add_flame(position, self.config.flame_life),
            _ if kind.is_power_up() => self.add_power_up(position, kind, true),
            _ => match kind.player() {
                Some(player) => self.add_agent(position, player),
                None => self.board.set(position, kind),
            },
        }
    }

    /// Clears `position` to passage. Unless `only_board` is set, the
    /// entities of `kind` there are removed as well; a removed agent leaves
    /// the game with a loss.
    pub fn remove_object(&mut self, position: Position, kind: TileKind, only_board: bool) {
        self.board.set(position, TileKind::Passage);
        if only_board {
            return;
        }

        match kind {
            TileKind::Bomb => {
                self.bombs.retain(|bomb| bomb.position != position);
                self.bomb_blast_strength.set(position, 0);
                self.bomb_life.set(position, 0);
            }
            TileKind::Flames => self.flames.retain(|flame| flame.position != position),
            _ if kind.is_power_up() => self.power_ups.set(position, None),
            _ => {
                if let Some(player) = kind.player() {
                    if let Some(avatar) = self.agents.get_mut(player.index()) {
                        avatar.result = GameResult::Loss;
                    }
                    self.alive.retain(|alive| *alive != player);
                }
            }
        }
    }

    /// Forgets the power-up hidden at `position`.
    pub fn remove_power_up(&mut self, position: Position) {
        self.power_ups.set(position, None);
    }

    /// Overwrites the inventory of `player`.
    pub fn set_agent_stats(&mut self, player: PlayerId, can_kick: bool, ammo: u32, blast_strength: u32) {
        if let Some(avatar) = self.agents.get_mut(player.index()) {
            avatar.can_kick = can_kick;
            avatar.ammo = ammo;
            avatar.blast_strength = blast_strength;
        }
    }

    /// Overwrites the vision range of `player`.
    pub fn set_vision_range(&mut self, player: PlayerId, vision_range: Option<u32>) {
        if let Some(avatar) = self.agents.get_mut(player.index()) {
            avatar.vision_range = vision_range;
        }
    }

    /// Attributes every bomb at `position` to `owner` and sets it sliding.
    pub fn set_bomb(&mut self, position: Position, owner: Option<PlayerId>, velocity: Velocity) {
        for bomb in self
            .bombs
            .iter_mut()
            .filter(|bomb| bomb.position == position)
        {
            bomb.owner = owner;
            bomb.velocity = velocity;
        }
    }

    /// Sets the remaining life of every flame at `position`.
    pub fn set_flame(&mut self, position: Position, life: u32) {
        for flame in self
            .flames
            .iter_mut()
            .filter(|flame| flame.position == position)
        {
            flame.life = life;
        }
    }

    /// Declares exactly `players` as still competing. Avatars not listed
    /// leave the game with a loss; listed avatars keep whatever position
    /// they have, possibly none.
    pub fn set_alive(&mut self, players: &[PlayerId]) {
        for avatar in &mut self.agents {
            let listed = players.contains(&avatar.player());
            avatar.result = if listed {
                GameResult::Incomplete
            } else {
                GameResult::Loss
            };
        }
        self.alive = PlayerId::ALL
            .into_iter()
            .filter(|player| players.contains(player))
            .collect();
    }
}
