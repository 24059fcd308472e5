//! Core state types: game and player state machines, boost, move speed

use serde::{Deserialize, Serialize};

use crate::settings::SpeedSettings;

/// Global game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Waiting on the menu
    #[default]
    StartMenu,
    /// Timed lead-in before gameplay
    Countdown,
    /// Active run: world scrolls, track spawns, difficulty scales
    Gameplay,
    /// Run ended
    GameOver,
}

/// Player state, driven by boosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Normal,
    Boosted,
}

/// An active speed boost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    /// Flat speed added on top of the base speed
    pub bonus: f32,
    /// Total duration (seconds)
    pub duration: f32,
    /// Seconds left before expiry
    pub remaining: f32,
}

impl Boost {
    pub fn new(bonus: f32, duration: f32) -> Self {
        Self {
            bonus,
            duration,
            remaining: duration,
        }
    }

    /// Advance the boost clock. Returns true once it has expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }
}

/// World scroll speed: bounded base component plus boost bonus
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveSpeed {
    base: f32,
    bonus: f32,
}

impl MoveSpeed {
    /// Base speed (always within [0, max])
    #[inline]
    pub fn base(&self) -> f32 {
        self.base
    }

    #[inline]
    pub fn bonus(&self) -> f32 {
        self.bonus
    }

    /// Base plus boost bonus
    #[inline]
    pub fn effective(&self) -> f32 {
        self.base + self.bonus
    }

    pub fn reset(&mut self) {
        self.base = 0.0;
    }

    pub fn start(&mut self, settings: &SpeedSettings) {
        self.base = settings.initial_move_speed.clamp(0.0, settings.max_move_speed);
    }

    /// Grow the base toward the configured maximum
    pub fn accelerate(&mut self, settings: &SpeedSettings, dt: f32) {
        self.base = (self.base + settings.speed_increase_rate * dt).clamp(0.0, settings.max_move_speed);
    }

    pub fn set_bonus(&mut self, bonus: f32) {
        self.bonus = bonus.max(0.0);
    }

    pub fn clear_bonus(&mut self) {
        self.bonus = 0.0;
    }
}
