use std::fmt;

use crate::{GameMode, GameResult, PlayerId, TileKind};

/// Participant whose outcome a [`WinPolicy`] decides.
pub trait Competitor {
    /// Seat of the participant.
    fn player(&self) -> PlayerId;

    /// Outcome currently recorded for the participant.
    fn result(&self) -> GameResult;

    /// Records a new outcome.
    fn set_result(&mut self, result: GameResult);
}

/// Rule set deciding teams, outcomes and rewards.
///
/// The forward model owns one policy value per episode and consults it after
/// flame deaths, after collapse deaths, and when the tick limit is reached.
/// Implementations must be stateless so copies of a game state stay
/// independent.
///
/// Every method taking `agents` expects the slice indexed by seat, i.e.
/// `agents[i].player().index() == i`.
pub trait WinPolicy: Clone + fmt::Debug + Default + PartialEq + Eq + Send + Sync {
    /// Team of `player` in `mode`.
    fn team(&self, mode: GameMode, player: PlayerId) -> usize;

    /// Markers of the teammates of `player`; [`TileKind::AgentDummy`] when
    /// the player has none.
    fn teammates(&self, mode: GameMode, player: PlayerId) -> Vec<TileKind>;

    /// Markers of the opponents of `player`.
    fn enemies(&self, mode: GameMode, player: PlayerId) -> Vec<TileKind>;

    /// Markers grouped by team.
    fn teams(&self, mode: GameMode) -> Vec<Vec<TileKind>>;

    /// Resolves the agents that died during a tick and removes them from
    /// `alive`.
    fn process_dead_agents<C: Competitor>(
        &self,
        mode: GameMode,
        agents: &mut [C],
        alive: &mut Vec<PlayerId>,
        died: &[PlayerId],
    );

    /// Resolves outcomes when the tick limit is reached.
    fn process_timeout<C: Competitor>(&self, mode: GameMode, agents: &mut [C], alive: &[PlayerId]);

    /// Reports whether the episode is over.
    fn is_ended<C: Competitor>(
        &self,
        tick: u32,
        max_ticks: u32,
        agents: &[C],
        alive: &[PlayerId],
    ) -> bool;

    /// Reward of every agent given their results.
    fn rewards(&self, tick: u32, max_ticks: u32, results: &[GameResult]) -> Vec<f64>;
}
