//! Deterministic simulation module
//!
//! All world logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (oldest piece first, items by ID)
//! - No rendering or platform dependencies

pub mod catalog;
pub mod difficulty;
pub mod health;
pub mod listeners;
pub mod motion;
pub mod orchestrator;
pub mod piece;
pub mod spawner;
pub mod state;
pub mod tick;

pub use catalog::{
    BoosterPrefab, CoinPattern, CoinPatternKind, ObstaclePrefab, PieceCatalog, PieceDescriptor,
    SlotGroup, SpawnSlot,
};
pub use difficulty::{DifficultyController, DifficultyState};
pub use health::{DamageOutcome, Health};
pub use listeners::{
    GameStateListener, GameStateListeners, ListenerId, ListenerRegistry, PlayerStateListener,
    PlayerStateListeners, Signal, SubscriptionId,
};
pub use motion::{Scrolling, TrailElement};
pub use orchestrator::{StateOrchestrator, Transition};
pub use piece::{ItemKind, PieceId, SpawnedItem, TrackPiece};
pub use spawner::SegmentSpawner;
pub use state::{Boost, GameState, MoveSpeed, PlayerState};
pub use tick::{RunStats, Session, TickInput, tick};
