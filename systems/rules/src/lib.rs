#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Default win, team and reward rules.
//!
//! Free-for-all seats every agent on its own team. Team modes pair seats
//! `{0, 2}` against `{1, 3}`. Outcomes are decided whenever agents die, when
//! the tick limit is reached, and rewards follow the recorded outcomes except
//! that a timeout rewards everybody with `-1`.

use bomber_core::{
    Competitor, GameMode, GameResult, PlayerId, TileKind, WinPolicy, NUM_PLAYERS,
};
use tracing::debug;

/// Classic rule set shared by every mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StandardRules;

impl StandardRules {
    fn team_count(mode: GameMode) -> usize {
        if mode.is_team() {
            2
        } else {
            NUM_PLAYERS
        }
    }
}

impl WinPolicy for StandardRules {
    fn team(&self, mode: GameMode, player: PlayerId) -> usize {
        if mode.is_team() {
            player.index() % 2
        } else {
            player.index()
        }
    }

    fn teammates(&self, mode: GameMode, player: PlayerId) -> Vec<TileKind> {
        if !mode.is_team() {
            return vec![TileKind::AgentDummy];
        }
        PlayerId::ALL
            .iter()
            .filter(|other| **other != player && self.team(mode, **other) == self.team(mode, player))
            .map(PlayerId::tile)
            .collect()
    }

    fn enemies(&self, mode: GameMode, player: PlayerId) -> Vec<TileKind> {
        let mut enemies: Vec<TileKind> = PlayerId::ALL
            .iter()
            .filter(|other| self.team(mode, **other) != self.team(mode, player))
            .map(PlayerId::tile)
            .collect();
        if mode.is_team() {
            enemies.push(TileKind::AgentDummy);
        }
        enemies
    }

    fn teams(&self, mode: GameMode) -> Vec<Vec<TileKind>> {
        (0..Self::team_count(mode))
            .map(|team| {
                PlayerId::ALL
                    .iter()
                    .filter(|player| self.team(mode, **player) == team)
                    .map(PlayerId::tile)
                    .collect()
            })
            .collect()
    }

    fn process_dead_agents<C: Competitor>(
        &self,
        mode: GameMode,
        agents: &mut [C],
        alive: &mut Vec<PlayerId>,
        died: &[PlayerId],
    ) {
        let everyone_died = died.len() == alive.len();
        if everyone_died && mode.is_team() {
            for agent in agents.iter_mut() {
                agent.set_result(GameResult::Tie);
            }
        } else {
            let status = if everyone_died {
                GameResult::Tie
            } else {
                GameResult::Loss
            };
            for agent in agents.iter_mut() {
                if died.contains(&agent.player()) {
                    agent.set_result(status);
                }
            }
        }
        debug!(?died, ?mode, everyone_died, "processed dead agents");

        alive.retain(|player| !died.contains(player));
        if alive.is_empty() {
            return;
        }

        let mut alive_per_team = vec![0_usize; Self::team_count(mode)];
        for player in alive.iter() {
            if let Some(count) = alive_per_team.get_mut(self.team(mode, *player)) {
                *count += 1;
            }
        }

        for agent in agents.iter_mut() {
            let team = self.team(mode, agent.player());
            if alive_per_team.get(team).copied().unwrap_or(0) == 0 {
                agent.set_result(GameResult::Loss);
            }
        }

        let mut standing = alive_per_team
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(team, _)| team);
        if let (Some(winner), None) = (standing.next(), standing.next()) {
            debug!(winner, "single team left standing");
            for agent in agents.iter_mut() {
                if self.team(mode, agent.player()) == winner {
                    agent.set_result(GameResult::Win);
                }
            }
        }
    }

    fn process_timeout<C: Competitor>(&self, mode: GameMode, agents: &mut [C], alive: &[PlayerId]) {
        for agent in agents.iter_mut() {
            if mode.is_team() || alive.contains(&agent.player()) {
                agent.set_result(GameResult::Tie);
            }
        }
    }

    fn is_ended<C: Competitor>(
        &self,
        tick: u32,
        max_ticks: u32,
        agents: &[C],
        alive: &[PlayerId],
    ) -> bool {
        if tick >= max_ticks || alive.is_empty() {
            return true;
        }
        agents
            .iter()
            .any(|agent| alive.contains(&agent.player()) && agent.result() == GameResult::Win)
    }

    fn rewards(&self, tick: u32, max_ticks: u32, results: &[GameResult]) -> Vec<f64> {
        results
            .iter()
            .map(|result| {
                if tick < max_ticks && *result == GameResult::Win {
                    1.0
                } else {
                    -1.0
                }
            })
            .collect()
    }
}
