#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! JSON observation bridge.
//!
//! External processes describe the world from one agent's point of view as
//! a flat JSON object (see [`Observation`]), usually wrapped in an
//! [`Envelope`] that also carries the size of the action space. [`decode`]
//! turns such a message into a [`GameState`] observed by that agent and
//! [`encode`] serialises the same fields from a state for any player.

use bomber_core::{
    ConstructionError, GameMode, PlayerId, Position, SimulationConfig, TileKind, NUM_ACTIONS,
};
use bomber_world::{ForwardModel, GameState, Grid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Vision range of agents in the fogged game types.
pub const PARTIAL_VISION_RANGE: u32 = 4;

/// Errors raised while translating observations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The payload is not a valid observation.
    #[error("could not parse observation: {0}")]
    Json(#[from] serde_json::Error),
    /// `game_type` is outside `1..=3`.
    #[error("unknown game type {0}")]
    GameType(u8),
    /// The peer expects a different number of actions.
    #[error("action space of {found} does not match the {expected} available actions")]
    ActionSpace {
        /// Actions the model understands.
        expected: usize,
        /// Actions announced by the peer.
        found: usize,
    },
    /// An entry of `alive` is not an agent marker.
    #[error("alive list holds tile key {0}, which is not an agent")]
    NotAnAgent(u8),
    /// The observer's position does not hold an agent marker.
    #[error("no agent stands at the observer position ({x}, {y})")]
    ObserverNotAgent {
        /// Column of the reported position.
        x: i32,
        /// Row of the reported position.
        y: i32,
    },
    /// The player to export has no known position.
    #[error("{player:?} has no position to report")]
    MissingObserver {
        /// Player whose view was requested.
        player: PlayerId,
    },
    /// The board or its layers are malformed.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// One agent's view of the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Tile keys of the agents still competing.
    pub alive: Vec<u8>,
    /// Rows of tile keys, fogged beyond the observer's vision.
    pub board: Vec<Vec<u8>>,
    /// Blast strength of the bomb on each cell, zero when there is none.
    pub bomb_blast_strength: Vec<Vec<u32>>,
    /// Remaining life of the bomb on each cell, zero when there is none.
    pub bomb_life: Vec<Vec<u32>>,
    /// 1 for free for all, 2 for teams, 3 for teams with radio.
    pub game_type: u8,
    /// Observer cell as `[x, y]`.
    pub position: [i32; 2],
    /// Observer blast strength.
    pub blast_strength: u32,
    /// Whether the observer can kick bombs.
    pub can_kick: bool,
    /// Bombs the observer can still place.
    pub ammo: u32,
    /// Tile keys of the observer's teammates.
    #[serde(default)]
    pub teammate: Vec<u8>,
    /// Tile keys of the observer's enemies.
    #[serde(default)]
    pub enemies: Vec<u8>,
    /// Ticks played so far.
    pub step_count: u32,
}

/// Observation carried inline or as a JSON-encoded string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Observation object.
    Inline(Observation),
    /// Observation serialised into a string.
    Encoded(String),
}

/// Message exchanged with an external agent process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Observation of the acting agent.
    pub obs: Payload,
    /// Number of actions the peer can choose from.
    pub action_space: usize,
}

impl Envelope {
    /// Resolves the observation, parsing it first when it arrived as a string.
    pub fn observation(&self) -> Result<Observation, BridgeError> {
        if self.action_space != NUM_ACTIONS {
            return Err(BridgeError::ActionSpace {
                expected: NUM_ACTIONS,
                found: self.action_space,
            });
        }
        match &self.obs {
            Payload::Inline(observation) => Ok(observation.clone()),
            Payload::Encoded(json) => Ok(serde_json::from_str(json)?),
        }
    }
}

impl Observation {
    /// Captures the view of `player` from `state`.
    pub fn from_state(state: &GameState, player: PlayerId) -> Result<Self, BridgeError> {
        let model = state.model();
        let avatar = model
            .avatar(player)
            .ok_or(BridgeError::MissingObserver { player })?;
        let position = avatar
            .position()
            .ok_or(BridgeError::MissingObserver { player })?;

        Ok(Self {
            alive: model.alive().iter().map(|alive| alive.tile().key()).collect(),
            board: state
                .board()
                .rows()
                .map(|row| row.iter().map(|tile| tile.key()).collect())
                .collect(),
            bomb_blast_strength: layer_rows(state.bomb_blast_strength()),
            bomb_life: layer_rows(state.bomb_life()),
            game_type: state.game_mode().game_type(),
            position: [position.x(), position.y()],
            blast_strength: avatar.blast_strength(),
            can_kick: avatar.can_kick(),
            ammo: avatar.ammo(),
            teammate: avatar.teammates().iter().map(|kind| kind.key()).collect(),
            enemies: avatar.enemies().iter().map(|kind| kind.key()).collect(),
            step_count: state.tick(),
        })
    }

    /// Rebuilds the world described by the observation, seen by its agent.
    ///
    /// Bombs are taken from the layers, bombs without a glyph are assumed to
    /// lie beneath an agent and nothing is hidden under wood.
    pub fn into_state(&self, config: SimulationConfig) -> Result<GameState, BridgeError> {
        let mode =
            GameMode::from_game_type(self.game_type).ok_or(BridgeError::GameType(self.game_type))?;
        let size = self.board.len();
        check_layer("bomb_blast_strength", &self.bomb_blast_strength, size)?;
        check_layer("bomb_life", &self.bomb_life, size)?;

        let config = SimulationConfig {
            num_items: 0,
            ..config
        };
        let rows: Vec<Vec<u8>> = self
            .board
            .iter()
            .map(|row| {
                row.iter()
                    .map(|key| match TileKind::from_key(*key) {
                        Some(TileKind::Bomb) => TileKind::Passage.key(),
                        _ => *key,
                    })
                    .collect()
            })
            .collect();
        let mut model = ForwardModel::from_board(0, &rows, mode, config)?;

        for (y, row) in self.board.iter().enumerate() {
            for (x, key) in row.iter().enumerate() {
                let drawn = TileKind::from_key(*key) == Some(TileKind::Bomb);
                let blast = layer_value(&self.bomb_blast_strength, x, y);
                if blast == 0 && !drawn {
                    continue;
                }
                let (blast, life) = if blast == 0 {
                    (config.default_bomb_blast, config.bomb_life)
                } else {
                    (blast, layer_value(&self.bomb_life, x, y).max(1))
                };
                let position = Position::new(to_coordinate(x), to_coordinate(y));
                model.add_bomb(position, blast, life, None, drawn);
            }
        }

        let alive = self
            .alive
            .iter()
            .map(|key| {
                TileKind::from_key(*key)
                    .and_then(PlayerId::from_tile)
                    .ok_or(BridgeError::NotAnAgent(*key))
            })
            .collect::<Result<Vec<_>, _>>()?;
        model.set_alive(&alive);

        let [x, y] = self.position;
        let observer = model
            .board()
            .at(Position::new(x, y))
            .and_then(PlayerId::from_tile)
            .ok_or(BridgeError::ObserverNotAgent { x, y })?;
        model.set_agent_stats(observer, self.can_kick, self.ammo, self.blast_strength);
        let vision = match mode {
            GameMode::Ffa | GameMode::Team => Some(PARTIAL_VISION_RANGE),
            GameMode::TeamRadio => config.default_vision_range,
        };
        model.set_vision_range(observer, vision);

        debug!(?observer, tick = self.step_count, ?mode, "observation imported");
        Ok(GameState::from_model(0, model, self.step_count).copy(Some(observer)))
    }
}

/// Parses an [`Envelope`] and rebuilds the state it describes.
pub fn decode(json: &str, config: SimulationConfig) -> Result<GameState, BridgeError> {
    let envelope: Envelope = serde_json::from_str(json)?;
    envelope.observation()?.into_state(config)
}

/// Serialises the view of `player` wrapped in an [`Envelope`].
pub fn encode(state: &GameState, player: PlayerId) -> Result<String, BridgeError> {
    let envelope = Envelope {
        obs: Payload::Inline(Observation::from_state(state, player)?),
        action_space: state.n_actions(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

fn layer_rows(layer: &Grid<u32>) -> Vec<Vec<u32>> {
    layer.rows().map(<[u32]>::to_vec).collect()
}

fn check_layer(name: &'static str, layer: &[Vec<u32>], size: usize) -> Result<(), BridgeError> {
    if layer.len() != size || layer.iter().any(|row| row.len() != size) {
        return Err(ConstructionError::LayerMismatch { layer: name, size }.into());
    }
    Ok(())
}

fn layer_value(layer: &[Vec<u32>], x: usize, y: usize) -> u32 {
    layer
        .get(y)
        .and_then(|row| row.get(x))
        .copied()
        .unwrap_or(0)
}

fn to_coordinate(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
