use bomber_core::{Competitor, GameMode, GameResult, PlayerId, TileKind, WinPolicy};
use bomber_system_rules::StandardRules;

#[derive(Debug)]
struct Seat {
    player: PlayerId,
    result: GameResult,
}

impl Competitor for Seat {
    fn player(&self) -> PlayerId {
        self.player
    }

    fn result(&self) -> GameResult {
        self.result
    }

    fn set_result(&mut self, result: GameResult) {
        self.result = result;
    }
}

fn seats() -> Vec<Seat> {
    PlayerId::ALL
        .iter()
        .map(|player| Seat {
            player: *player,
            result: GameResult::Incomplete,
        })
        .collect()
}

fn players(indices: &[usize]) -> Vec<PlayerId> {
    indices
        .iter()
        .filter_map(|index| PlayerId::from_index(*index))
        .collect()
}

fn results(seats: &[Seat]) -> Vec<GameResult> {
    seats.iter().map(|seat| seat.result).collect()
}

#[test]
fn free_for_all_last_survivor_wins() {
    let rules = StandardRules;
    let mut seats = seats();
    let mut alive = players(&[0, 1, 2, 3]);

    rules.process_dead_agents(GameMode::Ffa, &mut seats, &mut alive, &players(&[1, 2, 3]));

    assert_eq!(alive, players(&[0]));
    assert_eq!(
        results(&seats),
        vec![
            GameResult::Win,
            GameResult::Loss,
            GameResult::Loss,
            GameResult::Loss
        ]
    );
    assert!(rules.is_ended(10, 800, &seats, &alive));
}

#[test]
fn free_for_all_single_death_keeps_game_running() {
    let rules = StandardRules;
    let mut seats = seats();
    let mut alive = players(&[0, 1, 2, 3]);

    rules.process_dead_agents(GameMode::Ffa, &mut seats, &mut alive, &players(&[2]));

    assert_eq!(alive, players(&[0, 1, 3]));
    assert_eq!(seats[2].result, GameResult::Loss);
    assert_eq!(seats[0].result, GameResult::Incomplete);
    assert!(!rules.is_ended(10, 800, &seats, &alive));
}

#[test]
fn free_for_all_simultaneous_wipe_is_a_tie_for_the_dead() {
    let rules = StandardRules;
    let mut seats = seats();
    seats[0].result = GameResult::Loss;
    let mut alive = players(&[1, 2]);
    seats[3].result = GameResult::Loss;

    rules.process_dead_agents(GameMode::Ffa, &mut seats, &mut alive, &players(&[1, 2]));

    assert!(alive.is_empty());
    assert_eq!(
        results(&seats),
        vec![
            GameResult::Loss,
            GameResult::Tie,
            GameResult::Tie,
            GameResult::Loss
        ]
    );
    assert!(rules.is_ended(10, 800, &seats, &alive));
}

#[test]
fn team_wipe_awards_the_whole_surviving_team() {
    let rules = StandardRules;
    let mut seats = seats();
    let mut alive = players(&[0, 1, 2, 3]);

    rules.process_dead_agents(GameMode::Team, &mut seats, &mut alive, &players(&[1, 2]));
    assert_eq!(alive, players(&[0, 3]));
    assert_eq!(seats[0].result, GameResult::Incomplete);

    rules.process_dead_agents(GameMode::Team, &mut seats, &mut alive, &players(&[3]));
    assert_eq!(
        results(&seats),
        vec![
            GameResult::Win,
            GameResult::Loss,
            GameResult::Win,
            GameResult::Loss
        ],
        "the fallen teammate shares the team victory"
    );
}

#[test]
fn team_simultaneous_wipe_ties_entire_roster() {
    let rules = StandardRules;
    let mut seats = seats();
    let mut alive = players(&[0, 1, 2, 3]);
    rules.process_dead_agents(GameMode::Team, &mut seats, &mut alive, &players(&[2]));
    rules.process_dead_agents(GameMode::TeamRadio, &mut seats, &mut alive, &players(&[0, 1, 3]));

    assert!(alive.is_empty());
    assert!(seats.iter().all(|seat| seat.result == GameResult::Tie));
}

#[test]
fn timeout_ties_alive_agents_in_free_for_all() {
    let rules = StandardRules;
    let mut seats = seats();
    seats[1].result = GameResult::Loss;
    let alive = players(&[0, 2, 3]);

    rules.process_timeout(GameMode::Ffa, &mut seats, &alive);

    assert_eq!(
        results(&seats),
        vec![
            GameResult::Tie,
            GameResult::Loss,
            GameResult::Tie,
            GameResult::Tie
        ]
    );
}

#[test]
fn timeout_ties_whole_roster_in_team_modes() {
    let rules = StandardRules;
    let mut seats = seats();
    seats[1].result = GameResult::Loss;

    rules.process_timeout(GameMode::Team, &mut seats, &players(&[0, 2, 3]));

    assert!(seats.iter().all(|seat| seat.result == GameResult::Tie));
}

#[test]
fn winner_is_rewarded_before_the_tick_limit() {
    let rules = StandardRules;
    let rewards = rules.rewards(
        120,
        800,
        &[
            GameResult::Win,
            GameResult::Loss,
            GameResult::Tie,
            GameResult::Incomplete,
        ],
    );
    assert_eq!(rewards, vec![1.0, -1.0, -1.0, -1.0]);
}

#[test]
fn timeout_rewards_everybody_negatively_even_a_winner() {
    // Intentional quirk: reaching the tick limit is a collective failure.
    let rules = StandardRules;
    let rewards = rules.rewards(800, 800, &[GameResult::Win, GameResult::Tie]);
    assert_eq!(rewards, vec![-1.0, -1.0]);
}

#[test]
fn team_composition_pairs_opposite_corners() {
    let rules = StandardRules;
    let first = PlayerId::ALL[0];
    let second = PlayerId::ALL[1];

    assert_eq!(rules.teammates(GameMode::Team, first), vec![TileKind::Agent2]);
    assert_eq!(
        rules.enemies(GameMode::Team, second),
        vec![TileKind::Agent0, TileKind::Agent2, TileKind::AgentDummy]
    );
    assert_eq!(rules.teammates(GameMode::Ffa, first), vec![TileKind::AgentDummy]);
    assert_eq!(
        rules.enemies(GameMode::Ffa, first),
        vec![TileKind::Agent1, TileKind::Agent2, TileKind::Agent3]
    );
    assert_eq!(
        rules.teams(GameMode::TeamRadio),
        vec![
            vec![TileKind::Agent0, TileKind::Agent2],
            vec![TileKind::Agent1, TileKind::Agent3]
        ]
    );
    assert_eq!(rules.teams(GameMode::Ffa).len(), 4);
}

#[test]
fn game_ends_at_tick_limit() {
    let rules = StandardRules;
    let seats = seats();
    let alive = players(&[0, 1, 2, 3]);
    assert!(!rules.is_ended(799, 800, &seats, &alive));
    assert!(rules.is_ended(800, 800, &seats, &alive));
}
