//! Tick-counting facade consumed by agents and search algorithms.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use bomber_core::{
    Action, ConstructionError, GameMode, GameResult, PlayerId, Position, SimulationConfig,
    TileKind, WinPolicy, MESSAGE_LENGTH, NUM_ACTIONS, NUM_PLAYERS,
};
use bomber_system_level_generation::GenerationError;
use bomber_system_rules::StandardRules;
use tracing::{debug, info};

use crate::{Avatar, Bomb, Flame, ForwardModel, Grid};

/// Radio message exchanged between teammates.
pub type Message = [i32; MESSAGE_LENGTH];

/// Forward model together with the tick counter and the perspective of the
/// player the state was copied for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState<P = StandardRules> {
    model: ForwardModel<P>,
    seed: u64,
    tick: u32,
    observer: Option<PlayerId>,
    messages: Option<[Message; NUM_PLAYERS]>,
}

impl GameState<StandardRules> {
    /// Starts an episode on a freshly generated level.
    pub fn new(seed: u64, mode: GameMode, config: SimulationConfig) -> Result<Self, GenerationError> {
        Self::with_policy(seed, mode, config, StandardRules)
    }

    /// Starts an episode on a board given as rows of numeric tile keys.
    pub fn from_board(
        seed: u64,
        rows: &[Vec<u8>],
        mode: GameMode,
        config: SimulationConfig,
    ) -> Result<Self, ConstructionError> {
        let model = ForwardModel::from_board(seed, rows, mode, config)?;
        Ok(Self::from_model(seed, model, 0))
    }
}

impl<P: WinPolicy> GameState<P> {
    /// Starts an episode on a freshly generated level under a custom rule set.
    pub fn with_policy(
        seed: u64,
        mode: GameMode,
        config: SimulationConfig,
        policy: P,
    ) -> Result<Self, GenerationError> {
        let model = ForwardModel::generate_with_policy(seed, mode, config, policy)?;
        info!(seed, ?mode, size = model.size(), "episode created");
        Ok(Self::from_model(seed, model, 0))
    }

    /// Wraps an existing model at `tick`, observed by nobody.
    #[must_use]
    pub fn from_model(seed: u64, model: ForwardModel<P>, tick: u32) -> Self {
        let messages = (model.mode() == GameMode::TeamRadio)
            .then_some([[0; MESSAGE_LENGTH]; NUM_PLAYERS]);
        Self {
            model,
            seed,
            tick,
            observer: None,
            messages,
        }
    }

    /// Advances the episode by one tick.
    ///
    /// Returns `false` without touching the state once the tick limit has
    /// been reached.
    pub fn next(&mut self, actions: &[Action]) -> bool {
        let limit = self.model.config().max_game_ticks;
        if self.tick >= limit {
            return false;
        }
        self.model.next(actions, self.tick);
        self.tick += 1;
        if self.tick == limit {
            debug!(tick = self.tick, "tick limit reached");
            self.model.process_timeout();
        }
        true
    }

    /// Independent copy of the state.
    ///
    /// `Some(player)` reduces the copy to what `player` can see and makes it
    /// the copy's observer. `None` copies exactly and keeps the current
    /// observer.
    #[must_use]
    pub fn copy(&self, observer: Option<PlayerId>) -> Self {
        Self {
            model: self.model.reduce(observer),
            seed: self.seed,
            tick: self.tick,
            observer: observer.or(self.observer),
            messages: self.messages,
        }
    }

    /// Reports whether the episode is over from the observer's point of view,
    /// or for everyone when the state has no observer.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        if self.tick >= self.model.config().max_game_ticks {
            return true;
        }
        match self.observer {
            Some(_) => self.winner() != GameResult::Incomplete,
            None => self.model.is_ended(self.tick),
        }
    }

    /// Reports whether the rule set considers the episode over.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.model.is_ended(self.tick)
    }

    /// Outcome of the observer; incomplete without one.
    #[must_use]
    pub fn winner(&self) -> GameResult {
        self.observer_avatar()
            .map_or(GameResult::Incomplete, Avatar::result)
    }

    /// Outcome of every seat.
    #[must_use]
    pub fn results(&self) -> Vec<GameResult> {
        self.model.avatars().iter().map(Avatar::result).collect()
    }

    /// Reward of every seat for the current outcomes.
    #[must_use]
    pub fn rewards(&self) -> Vec<f64> {
        self.model.policy().rewards(
            self.tick,
            self.model.config().max_game_ticks,
            &self.results(),
        )
    }

    /// Ticks played so far.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Number of distinct actions.
    #[must_use]
    pub const fn n_actions(&self) -> usize {
        NUM_ACTIONS
    }

    /// Seed the episode was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Team composition of the episode.
    #[must_use]
    pub const fn game_mode(&self) -> GameMode {
        self.model.mode()
    }

    /// Side length of the board.
    #[must_use]
    pub const fn board_size(&self) -> usize {
        self.model.size()
    }

    /// Player the state was copied for.
    #[must_use]
    pub const fn player_id(&self) -> Option<PlayerId> {
        self.observer
    }

    /// Visible board.
    #[must_use]
    pub const fn board(&self) -> &Grid<TileKind> {
        self.model.board()
    }

    /// Blast strength of the bomb on every cell.
    #[must_use]
    pub const fn bomb_blast_strength(&self) -> &Grid<u32> {
        self.model.bomb_blast_strength()
    }

    /// Remaining fuse of the bomb on every cell.
    #[must_use]
    pub const fn bomb_life(&self) -> &Grid<u32> {
        self.model.bomb_life()
    }

    /// Known bombs.
    #[must_use]
    pub fn bombs(&self) -> &[Bomb] {
        self.model.bombs()
    }

    /// Known flames.
    #[must_use]
    pub fn flames(&self) -> &[Flame] {
        self.model.flames()
    }

    /// Every avatar in seat order.
    #[must_use]
    pub fn avatars(&self) -> &[Avatar] {
        self.model.avatars()
    }

    /// Markers of the players still competing.
    #[must_use]
    pub fn alive_agent_ids(&self) -> Vec<TileKind> {
        self.model.alive().iter().map(PlayerId::tile).collect()
    }

    /// The observer's teammates that are still competing, keeping the
    /// placeholder marker of a missing teammate.
    #[must_use]
    pub fn alive_teammate_ids(&self) -> Vec<TileKind> {
        self.observer_avatar()
            .map_or_else(Vec::new, |avatar| self.trim_alive(avatar.teammates()))
    }

    /// The observer's opponents that are still competing, keeping the
    /// placeholder marker.
    #[must_use]
    pub fn alive_enemy_ids(&self) -> Vec<TileKind> {
        self.observer_avatar()
            .map_or_else(Vec::new, |avatar| self.trim_alive(avatar.enemies()))
    }

    fn trim_alive(&self, markers: &[TileKind]) -> Vec<TileKind> {
        let alive = self.alive_agent_ids();
        markers
            .iter()
            .copied()
            .filter(|marker| *marker == TileKind::AgentDummy || alive.contains(marker))
            .collect()
    }

    /// Team of the observer.
    #[must_use]
    pub fn team(&self) -> Option<usize> {
        self.observer_avatar().map(Avatar::team)
    }

    /// Markers of the observer's teammates.
    #[must_use]
    pub fn teammates(&self) -> &[TileKind] {
        self.observer_avatar()
            .map(Avatar::teammates)
            .unwrap_or_default()
    }

    /// Markers of the observer's opponents.
    #[must_use]
    pub fn enemies(&self) -> &[TileKind] {
        self.observer_avatar()
            .map(Avatar::enemies)
            .unwrap_or_default()
    }

    /// Cell of the observer.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.observer_avatar().and_then(Avatar::position)
    }

    /// Ammo of the observer.
    #[must_use]
    pub fn ammo(&self) -> Option<u32> {
        self.observer_avatar().map(Avatar::ammo)
    }

    /// Blast strength of the observer.
    #[must_use]
    pub fn blast_strength(&self) -> Option<u32> {
        self.observer_avatar().map(Avatar::blast_strength)
    }

    /// Whether the observer can kick bombs.
    #[must_use]
    pub fn can_kick(&self) -> bool {
        self.observer_avatar().is_some_and(Avatar::can_kick)
    }

    /// Vision range of the observer; `None` without an observer or with full
    /// observability.
    #[must_use]
    pub fn vision_range(&self) -> Option<u32> {
        self.observer_avatar().and_then(Avatar::vision_range)
    }

    /// Radio message most recently delivered to `player` by its teammate.
    #[must_use]
    pub fn message(&self, player: PlayerId) -> Option<&Message> {
        self.messages
            .as_ref()
            .and_then(|messages| messages.get(player.index()))
    }

    /// Delivers `message` to `player`. Ignored outside radio games.
    pub fn set_message(&mut self, player: PlayerId, message: Message) {
        if let Some(slot) = self
            .messages
            .as_mut()
            .and_then(|messages| messages.get_mut(player.index()))
        {
            *slot = message;
        }
    }

    /// Underlying forward model.
    #[must_use]
    pub const fn model(&self) -> &ForwardModel<P> {
        &self.model
    }

    /// Underlying forward model, for seeding custom scenarios.
    pub fn model_mut(&mut self) -> &mut ForwardModel<P> {
        &mut self.model
    }

    fn observer_avatar(&self) -> Option<&Avatar> {
        self.observer.and_then(|player| self.model.avatar(player))
    }
}

impl<P: WinPolicy + Hash> GameState<P> {
    /// Stable digest of the whole state.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use bomber_core::{Action, GameMode, GameResult, PlayerId, SimulationConfig, TileKind};

    use super::GameState;

    fn duel(mode: GameMode) -> GameState {
        let mut rows = vec![vec![0_u8; 7]; 7];
        rows[1][1] = TileKind::Agent0.key();
        rows[5][5] = TileKind::Agent1.key();
        let config = SimulationConfig {
            max_game_ticks: 3,
            collapse_enabled: false,
            ..SimulationConfig::default()
        };
        GameState::from_board(9, &rows, mode, config).expect("duel board")
    }

    #[test]
    fn next_stops_at_the_tick_limit() {
        let mut state = duel(GameMode::Ffa);
        for _ in 0..3 {
            assert!(state.next(&[Action::Stop; 4]));
        }
        let before = state.fingerprint();
        assert!(!state.next(&[Action::Stop; 4]));
        assert_eq!(state.fingerprint(), before);
        assert_eq!(state.tick(), 3);
        assert!(state.is_terminal());
        assert_eq!(state.results()[0], GameResult::Tie);
        assert_eq!(state.results()[2], GameResult::Loss);
    }

    #[test]
    fn copies_keep_their_observer() {
        let state = duel(GameMode::Ffa);
        let observed = state.copy(PlayerId::from_index(1));
        assert_eq!(observed.player_id(), PlayerId::from_index(1));
        assert_eq!(observed.copy(None).player_id(), PlayerId::from_index(1));
        assert_eq!(observed.copy(None), observed);
        assert_eq!(state.copy(None), state);
        assert_eq!(observed.ammo(), Some(1));
        assert_eq!(state.ammo(), None);
        assert!(!observed.is_terminal());
    }

    #[test]
    fn radio_messages_exist_only_in_radio_games() {
        let mut silent = duel(GameMode::Team);
        silent.set_message(PlayerId::ALL[0], [1, 2, 3, 4, 5]);
        assert_eq!(silent.message(PlayerId::ALL[0]), None);

        let mut radio = duel(GameMode::TeamRadio);
        radio.set_message(PlayerId::ALL[2], [1, 2, 3, 4, 5]);
        assert_eq!(radio.message(PlayerId::ALL[2]), Some(&[1, 2, 3, 4, 5]));
        assert_eq!(radio.copy(PlayerId::from_index(0)).message(PlayerId::ALL[2]), Some(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn alive_lists_keep_the_placeholder() {
        let state = duel(GameMode::Ffa).copy(PlayerId::from_index(0));
        assert_eq!(state.alive_teammate_ids(), vec![TileKind::AgentDummy]);
        assert_eq!(state.alive_enemy_ids(), vec![TileKind::Agent1]);
        assert_eq!(state.n_actions(), 6);
    }
}
