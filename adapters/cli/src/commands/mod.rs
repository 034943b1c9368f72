//! Subcommands of the `bomber` binary and the options they share.

mod observe;
mod replay;
mod run;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use bomber_core::{GameMode, SimulationConfig, TileKind};
use bomber_world::GameState;
use clap::{Args, ValueEnum};

pub(crate) use observe::Observe;
pub(crate) use replay::Replay;
pub(crate) use run::Run;

/// Team composition accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum ModeArg {
    /// Every agent for itself
    Ffa,
    /// Two teams of two
    Team,
    /// Two teams of two with radio messages
    Radio,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ffa => Self::Ffa,
            ModeArg::Team => Self::Team,
            ModeArg::Radio => Self::TeamRadio,
        }
    }
}

/// Rule options shared by every subcommand that builds a level.
#[derive(Debug, Args)]
pub(crate) struct RuleArgs {
    /// TOML file overriding the default rules
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tick limit of every game
    #[arg(long, value_name = "TICKS")]
    max_ticks: Option<u32>,

    /// Vision range of every agent
    #[arg(long, value_name = "CELLS", conflicts_with = "full_vision")]
    vision: Option<u32>,

    /// Let every agent see the whole board
    #[arg(long)]
    full_vision: bool,
}

impl RuleArgs {
    /// Resolves the rules: defaults, then the file, then the flags.
    pub(crate) fn load(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("failed to parse {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };
        if let Some(max_ticks) = self.max_ticks {
            config.max_game_ticks = max_ticks;
            if config.collapse_start >= max_ticks {
                config.collapse_enabled = false;
            }
        }
        if self.full_vision {
            config.default_vision_range = None;
        } else if let Some(vision) = self.vision {
            config.default_vision_range = Some(vision);
        }
        config.validate().context("invalid rules")?;
        Ok(config)
    }
}

/// Draws the board with one character per cell.
pub(crate) fn render_board(state: &GameState) -> String {
    let mut out = String::new();
    for row in state.board().rows() {
        out.extend(row.iter().map(|tile| glyph(*tile)));
        out.push('\n');
    }
    out
}

fn glyph(tile: TileKind) -> char {
    match tile {
        TileKind::Passage => '.',
        TileKind::Rigid => '#',
        TileKind::Wood => '+',
        TileKind::Bomb => 'o',
        TileKind::Flames => '*',
        TileKind::Fog => '~',
        TileKind::ExtraBomb => 'b',
        TileKind::IncreaseRange => 'r',
        TileKind::Kick => 'k',
        TileKind::AgentDummy => '?',
        TileKind::Agent0 => '0',
        TileKind::Agent1 => '1',
        TileKind::Agent2 => '2',
        TileKind::Agent3 => '3',
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn args(config: Option<PathBuf>) -> RuleArgs {
        RuleArgs {
            config,
            max_ticks: None,
            vision: None,
            full_vision: false,
        }
    }

    #[test]
    fn flags_override_the_defaults() {
        let mut rules = args(None);
        rules.max_ticks = Some(50);
        rules.full_vision = true;
        let config = rules.load().expect("valid rules");
        assert_eq!(config.max_game_ticks, 50);
        assert!(!config.collapse_enabled);
        assert_eq!(config.default_vision_range, None);
    }

    #[test]
    fn rule_files_fill_in_missing_fields() {
        let path = std::env::temp_dir().join(format!("bomber-rules-{}.toml", std::process::id()));
        let mut file = fs::File::create(&path).expect("temp file");
        writeln!(file, "bomb_life = 7\nnum_items = 4").expect("write rules");

        let config = args(Some(path.clone())).load().expect("valid rules");
        fs::remove_file(&path).expect("cleanup");
        assert_eq!(config.bomb_life, 7);
        assert_eq!(config.num_items, 4);
        assert_eq!(config.board_size, SimulationConfig::default().board_size);
    }

    #[test]
    fn invalid_rules_are_reported() {
        let path =
            std::env::temp_dir().join(format!("bomber-bad-rules-{}.toml", std::process::id()));
        fs::write(&path, "num_wood = 3\n").expect("write rules");
        let error = args(Some(path.clone())).load();
        fs::remove_file(&path).expect("cleanup");
        assert!(error.is_err());
    }

    #[test]
    fn boards_render_one_line_per_row() {
        let state = GameState::new(1, GameMode::Ffa, SimulationConfig::default()).expect("level");
        let drawn = render_board(&state);
        assert_eq!(drawn.lines().count(), 11);
        assert!(drawn.lines().all(|line| line.chars().count() == 11));
        assert!(drawn.contains('0'));
    }
}
