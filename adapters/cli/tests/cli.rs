use std::{fs, path::PathBuf, process::Command};

fn bomber() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bomber"))
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bomber-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn idle_games_are_recorded_and_replayed() {
    let dir = scratch_dir("replays");
    let output = bomber()
        .args(["run", "--seed", "5", "--games", "2", "--players", "idle"])
        .args(["--max-ticks", "20", "--replay-dir"])
        .arg(&dir)
        .output()
        .expect("failed to launch bomber");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("game 0 (seed 5): [Tie, Tie, Tie, Tie] after 20 ticks"));
    assert!(stdout.contains("seat 3: 0 wins, 2 ties, 0 losses"));

    let log = dir.join("game_6.json");
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&log).expect("log written")).expect("json log");
    assert_eq!(value["actions"].as_array().map(Vec::len), Some(20));

    let output = bomber()
        .args(["replay", "--frames"])
        .arg(&log)
        .output()
        .expect("failed to launch bomber");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tick 20"));
    assert!(stdout.contains("after 20 ticks"));

    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn observations_are_printed_as_json() {
    let output = bomber()
        .args(["observe", "--mode", "team", "--seed", "3", "--player", "2", "--fog"])
        .output()
        .expect("failed to launch bomber");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("observation json");
    assert_eq!(value["action_space"], 6);
    assert_eq!(value["obs"]["game_type"], 2);
    assert_eq!(value["obs"]["position"], serde_json::json!([9, 9]));
    assert_eq!(value["obs"]["teammate"], serde_json::json!([10]));
}

#[test]
fn wrong_player_counts_fail() {
    let output = bomber()
        .args(["run", "--players", "idle,random", "--max-ticks", "5"])
        .output()
        .expect("failed to launch bomber");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("expected 1 or 4 players"));
}
