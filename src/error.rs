//! Error types for the simulation core

use crate::sim::GameState;

/// Static configuration problems (catalog, prefabs, tuning values)
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// No pieces to choose from
    #[error("piece catalog is empty")]
    EmptyCatalog,

    /// `spawn_next` called before any piece exists to stitch onto
    #[error("no piece has been spawned yet")]
    NoLastPiece,

    /// A category has slots to fill but nothing to fill them with
    #[error("piece '{piece}' has {category} slots but no {category} prefabs")]
    EmptyPrefabList { piece: String, category: &'static str },

    #[error("piece '{piece}': {category} min ({min}) exceeds max ({max})")]
    InvalidCountRange {
        piece: String,
        category: &'static str,
        min: u32,
        max: u32,
    },

    /// Exit anchor must lie ahead of the entry anchor along the track
    #[error("piece '{piece}' has no forward length between entry and exit")]
    DegeneratePiece { piece: String },

    #[error("{name} must be within [0, 1], got {value}")]
    ChanceOutOfRange { name: String, value: f32 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: String, value: f32 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: String, value: f32 },

    #[error("initial move speed {initial} exceeds max move speed {max}")]
    SpeedRange { initial: f32, max: f32 },
}

/// Error returned by a listener callback
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A listener that failed during a broadcast (logged, fan-out continued)
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("listener '{listener}' failed on {broadcast}: {error}")]
pub struct ListenerFailure {
    /// Name the listener registered with
    pub listener: String,
    /// What was being broadcast, e.g. `GameState::Gameplay`
    pub broadcast: String,
    pub error: ListenerError,
}

/// Top-level simulation error
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A state rule the orchestrator enforces was observed broken
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Boosts only exist during gameplay
    #[error("boost rejected while in {state:?}")]
    BoostRejected { state: GameState },

    /// Piece or item id not present in the active world
    #[error("no active item {item} on piece {piece}")]
    UnknownItem { piece: u32, item: u32 },

    #[error("settings parse error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
