use std::collections::HashMap;

use bomber_core::{Action, GameMode, GameResult, PlayerId, Position, SimulationConfig, TileSet};
use bomber_world::GameState;
use proptest::prelude::*;
use rayon::prelude::*;

fn decode(keys: [u8; 4]) -> [Action; 4] {
    keys.map(|key| Action::from_key(key).unwrap_or_default())
}

fn mode(index: u8) -> GameMode {
    match index % 3 {
        0 => GameMode::Ffa,
        1 => GameMode::Team,
        _ => GameMode::TeamRadio,
    }
}

fn positions(state: &GameState) -> HashMap<PlayerId, Position> {
    state
        .avatars()
        .iter()
        .filter(|avatar| avatar.result() == GameResult::Incomplete)
        .filter_map(|avatar| avatar.position().map(|cell| (avatar.player(), cell)))
        .collect()
}

fn capacity(state: &GameState, player: PlayerId) -> u32 {
    let placed = state
        .bombs()
        .iter()
        .filter(|bomb| bomb.owner() == Some(player))
        .count();
    let ammo = state.model().avatar(player).map_or(0, |avatar| avatar.ammo());
    ammo + u32::try_from(placed).unwrap_or(u32::MAX)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_occupants_never_stand_in_walls(
        seed in any::<u64>(),
        mode_index in 0u8..3,
        script in prop::collection::vec(prop::array::uniform4(0u8..6), 1..120),
    ) {
        let mut state = GameState::new(seed, mode(mode_index), SimulationConfig::default())
            .expect("generated level");
        for keys in script {
            if state.is_ended() {
                break;
            }
            prop_assert!(state.next(&decode(keys)));

            for cell in positions(&state).values() {
                let tile = state.board().at(*cell).expect("agent on the board");
                prop_assert!(!TileSet::OBSTACLES.includes(tile), "agent on {tile:?} at {cell:?}");
            }
            for bomb in state.bombs() {
                let tile = state.board().at(bomb.position()).expect("bomb on the board");
                prop_assert!(!TileSet::OBSTACLES.includes(tile));
                prop_assert!(state.bomb_life().at(bomb.position()) > Some(0));
            }
            for (cell, life) in state.bomb_life().iter() {
                if *life > 0 {
                    prop_assert!(state.bombs().iter().any(|bomb| bomb.position() == cell));
                }
            }
        }
    }

    #[test]
    fn prop_agents_never_trade_cells(
        seed in any::<u64>(),
        script in prop::collection::vec(prop::array::uniform4(0u8..6), 1..120),
    ) {
        let mut state = GameState::new(seed, GameMode::Ffa, SimulationConfig::default())
            .expect("generated level");
        for keys in script {
            if state.is_ended() {
                break;
            }
            let before = positions(&state);
            prop_assert!(state.next(&decode(keys)));
            let after = positions(&state);

            for (first, from) in &before {
                for (second, to) in &before {
                    if first == second {
                        continue;
                    }
                    let swapped = after.get(first) == Some(to) && after.get(second) == Some(from);
                    prop_assert!(!swapped, "{first:?} and {second:?} swapped");
                }
            }
        }
    }

    #[test]
    fn prop_ammo_is_conserved(
        seed in any::<u64>(),
        script in prop::collection::vec(prop::array::uniform4(0u8..6), 1..160),
    ) {
        let config = SimulationConfig::default();
        let mut state = GameState::new(seed, GameMode::Ffa, config).expect("generated level");
        for keys in script {
            if state.is_ended() {
                break;
            }
            prop_assert!(state.next(&decode(keys)));
            for player in PlayerId::ALL {
                let taken = state.model().statistics().power_ups_taken(player);
                let capacity = capacity(&state, player);
                prop_assert!(capacity >= config.default_bomb_ammo);
                prop_assert!(capacity <= config.default_bomb_ammo + taken);
            }
        }
    }
}

fn scripted(tick: usize, seat: usize) -> Action {
    Action::ALL[(tick * 7 + seat * 3 + tick / 5) % Action::ALL.len()]
}

fn play_out(mut state: GameState, ticks: usize) -> u64 {
    for tick in 0..ticks {
        if state.is_ended() {
            break;
        }
        let actions: Vec<Action> = (0..4).map(|seat| scripted(tick, seat)).collect();
        let _ = state.next(&actions);
    }
    state.fingerprint()
}

fn assert_copies_converge(copies: usize) {
    let origin = GameState::new(11, GameMode::Ffa, SimulationConfig::default())
        .expect("generated level");
    let expected = play_out(origin.copy(None), 300);

    let fingerprints: Vec<u64> = (0..copies)
        .into_par_iter()
        .map(|_| play_out(origin.copy(None), 300))
        .collect();
    assert_eq!(fingerprints.len(), copies);
    assert!(fingerprints.iter().all(|print| *print == expected));
}

#[test]
fn parallel_copies_share_one_future() {
    assert_copies_converge(256);
}

#[test]
#[ignore = "stress run, use `cargo test -- --ignored`"]
fn ten_thousand_copies_share_one_future() {
    assert_copies_converge(10_000);
}

#[test]
fn level_generation_is_thread_independent() {
    let config = SimulationConfig::default();
    let sequential: Vec<u64> = (0..64_u64)
        .map(|seed| {
            GameState::new(seed, GameMode::Team, config)
                .expect("generated level")
                .fingerprint()
        })
        .collect();
    let parallel: Vec<u64> = (0..64_u64)
        .into_par_iter()
        .map(|seed| {
            GameState::new(seed, GameMode::Team, config)
                .expect("generated level")
                .fingerprint()
        })
        .collect();
    assert_eq!(sequential, parallel);
}
