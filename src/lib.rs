//! Scroll Runner - world simulation core for an endless side-scroller
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state machines, spawning, difficulty, motion)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Error taxonomy shared by the simulation and its loaders

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, ListenerError, ListenerFailure, SimError};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World scroll speed defaults (units/s)
    pub const INITIAL_MOVE_SPEED: f32 = 5.0;
    pub const MAX_MOVE_SPEED: f32 = 20.0;
    /// Base speed gained per second of normal gameplay
    pub const SPEED_INCREASE_RATE: f32 = 0.1;

    /// Countdown length before gameplay starts (seconds)
    pub const COUNTDOWN_SECS: f32 = 3.0;

    /// Pieces laid down when a run starts
    pub const INITIAL_PIECES: usize = 3;
    /// Spawn the next piece when the viewpoint is this close to the track end
    pub const TRIGGER_DISTANCE: f32 = 20.0;
    /// Pieces whose origin crosses this x coordinate are destroyed
    pub const DESPAWN_X: f32 = -30.0;
    /// Trail elements drifting past this x coordinate are dropped
    pub const TRAIL_DESPAWN_X: f32 = 30.0;

    pub const MAX_HEALTH: u32 = 2;

    /// Float tolerance used when comparing anchor positions
    pub const ANCHOR_EPSILON: f32 = 1e-4;
}

/// Unit vector along the scroll axis (the world moves toward -x)
pub const SCROLL_DIR: Vec2 = Vec2::NEG_X;

/// Rotate a local offset by `angle` radians
#[inline]
pub fn rotate(offset: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(offset)
}

/// Direction vector for an orientation angle (radians, 0 = +x)
#[inline]
pub fn forward(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
