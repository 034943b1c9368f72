use bomber_core::{Position, SimulationConfig, TileKind};
use bomber_system_level_generation::{inaccessible_passages, GenerationError, LevelGenerator};

fn generator() -> LevelGenerator {
    LevelGenerator::new(SimulationConfig::default()).expect("default config is valid")
}

#[test]
fn identical_seeds_produce_identical_levels() {
    let first = generator().generate(42).expect("level");
    let second = generator().generate(42).expect("level");
    assert_eq!(first, second, "generation diverged for the same seed");
}

#[test]
fn different_seeds_produce_different_layouts() {
    let levels: Vec<_> = (0..8)
        .map(|seed| generator().generate(seed).expect("level"))
        .collect();
    assert!(
        levels.windows(2).any(|pair| pair[0].tiles() != pair[1].tiles()),
        "eight seeds should not all share one layout"
    );
}

#[test]
fn boards_are_mirrored_along_the_main_diagonal() {
    let level = generator().generate(7).expect("level");
    let size = i32::try_from(level.size()).expect("size fits");
    for y in 0..size {
        for x in 0..size {
            let here = level.tile(Position::new(x, y)).expect("on board");
            let twin = level.tile(Position::new(y, x)).expect("on board");
            if here.is_agent() || twin.is_agent() {
                continue;
            }
            assert_eq!(here, twin, "asymmetric block at ({x}, {y})");
        }
    }
}

#[test]
fn diagonal_and_breathing_space_stay_free() {
    let level = generator().generate(3).expect("level");
    let size = i32::try_from(level.size()).expect("size fits");
    for i in 0..size {
        let tile = level.tile(Position::new(i, i)).expect("on board");
        assert!(
            matches!(tile, TileKind::Passage | TileKind::Agent0 | TileKind::Agent2),
            "diagonal cell ({i}, {i}) holds {tile:?}"
        );
    }
    for cell in [
        Position::new(1, 2),
        Position::new(1, 3),
        Position::new(2, 1),
        Position::new(3, 1),
    ] {
        assert_eq!(level.tile(cell), Some(TileKind::Passage));
    }
}

#[test]
fn agents_start_in_their_corners() {
    let level = generator().generate(11).expect("level");
    let markers: Vec<_> = level
        .agents()
        .iter()
        .map(|position| level.tile(*position))
        .collect();
    assert_eq!(
        markers,
        vec![
            Some(TileKind::Agent0),
            Some(TileKind::Agent1),
            Some(TileKind::Agent2),
            Some(TileKind::Agent3)
        ]
    );
}

#[test]
fn generated_levels_respect_the_accessibility_bound() {
    let config = SimulationConfig::default();
    for seed in 0..16 {
        let level = generator().generate(seed).expect("level");
        let start = level.agents()[3];
        assert!(
            inaccessible_passages(level.tiles(), level.size(), start)
                <= config.max_inaccessible_tiles,
            "seed {seed} produced an inaccessible board"
        );
    }
}

#[test]
fn power_ups_are_hidden_beneath_wood() {
    let level = generator().generate(5).expect("level");
    let hidden = level
        .tiles()
        .iter()
        .zip(level.power_ups())
        .filter(|(_, item)| item.is_some())
        .inspect(|(tile, _)| assert_eq!(**tile, TileKind::Wood))
        .count();
    assert_eq!(hidden, SimulationConfig::default().num_items);
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = SimulationConfig {
        num_rigid: 3,
        ..SimulationConfig::default()
    };
    assert!(matches!(
        LevelGenerator::new(config),
        Err(GenerationError::Config(_))
    ));
}
