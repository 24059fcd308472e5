//! Simulation settings
//!
//! Static tuning for a session, loaded from JSON or taken from defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, SimError};

/// World scroll speed model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedSettings {
    /// Base speed set when gameplay starts
    pub initial_move_speed: f32,
    /// Upper bound for the base speed
    pub max_move_speed: f32,
    /// Base speed added per second while playing unboosted
    pub speed_increase_rate: f32,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            initial_move_speed: INITIAL_MOVE_SPEED,
            max_move_speed: MAX_MOVE_SPEED,
            speed_increase_rate: SPEED_INCREASE_RATE,
        }
    }
}

/// Difficulty scaling inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultySettings {
    /// Chance that a piece's coin patterns are filled
    pub initial_coin_chance: f32,
    /// Chance that obstacles are placed on a piece (when the piece defers to difficulty)
    pub initial_obstacle_chance: f32,
    /// Seconds of gameplay between power-up opportunities
    pub power_up_interval: f32,
    pub coins_per_line: u32,
    pub coins_per_arc: u32,
    /// Added to the coin chance every interval (capped at 1.0)
    pub coin_chance_increase: f32,
    /// Added to the obstacle chance every interval (capped at 1.0)
    pub obstacle_chance_increase: f32,
    /// Seconds of gameplay between chance increases
    pub increase_interval: f32,
}

impl Default for DifficultySettings {
    fn default() -> Self {
        Self {
            initial_coin_chance: 0.7,
            initial_obstacle_chance: 0.6,
            power_up_interval: 15.0,
            coins_per_line: 5,
            coins_per_arc: 7,
            coin_chance_increase: 0.01,
            obstacle_chance_increase: 0.005,
            increase_interval: 30.0,
        }
    }
}

/// Track spawning and retirement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    /// Pieces laid down at run start (first piece included)
    pub initial_pieces: usize,
    /// Distance from the last exit anchor to the viewpoint that triggers a spawn
    pub trigger_distance: f32,
    /// Pieces whose position drops below this x are destroyed
    pub despawn_x: f32,
    /// Trail elements beyond this x are dropped
    pub trail_despawn_x: f32,
    /// Where the first piece is placed
    pub origin: Vec2,
    /// Fixed viewpoint (the player) the world scrolls past
    pub viewpoint: Vec2,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            initial_pieces: INITIAL_PIECES,
            trigger_distance: TRIGGER_DISTANCE,
            despawn_x: DESPAWN_X,
            trail_despawn_x: TRAIL_DESPAWN_X,
            origin: Vec2::ZERO,
            viewpoint: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub max_health: u32,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
        }
    }
}

/// Complete session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for the spawner RNG
    pub seed: u64,
    pub speed: SpeedSettings,
    /// Length of the countdown before gameplay (seconds)
    pub countdown_secs: f32,
    pub difficulty: DifficultySettings,
    pub spawner: SpawnerSettings,
    pub health: HealthSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            speed: SpeedSettings::default(),
            countdown_secs: COUNTDOWN_SECS,
            difficulty: DifficultySettings::default(),
            spawner: SpawnerSettings::default(),
            health: HealthSettings::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Check value ranges the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let speed = &self.speed;
        non_negative("speed.initial_move_speed", speed.initial_move_speed)?;
        non_negative("speed.speed_increase_rate", speed.speed_increase_rate)?;
        if speed.initial_move_speed > speed.max_move_speed {
            return Err(ConfigError::SpeedRange {
                initial: speed.initial_move_speed,
                max: speed.max_move_speed,
            });
        }
        positive("countdown_secs", self.countdown_secs)?;

        let d = &self.difficulty;
        chance("difficulty.initial_coin_chance", d.initial_coin_chance)?;
        chance("difficulty.initial_obstacle_chance", d.initial_obstacle_chance)?;
        chance("difficulty.coin_chance_increase", d.coin_chance_increase)?;
        chance("difficulty.obstacle_chance_increase", d.obstacle_chance_increase)?;
        positive("difficulty.increase_interval", d.increase_interval)?;
        positive("difficulty.power_up_interval", d.power_up_interval)?;

        positive("spawner.trigger_distance", self.spawner.trigger_distance)?;
        if self.spawner.initial_pieces == 0 {
            return Err(ConfigError::NonPositive {
                name: "spawner.initial_pieces".into(),
                value: 0.0,
            });
        }
        if self.health.max_health == 0 {
            return Err(ConfigError::NonPositive {
                name: "health.max_health".into(),
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn chance(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ChanceOutOfRange {
            name: name.into(),
            value,
        })
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            name: name.into(),
            value,
        })
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            name: name.into(),
            value,
        })
    }
}
