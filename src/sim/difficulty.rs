//! Time-based difficulty scaling
//!
//! Spawn chances climb by a fixed step every `increase_interval` seconds of
//! gameplay. The interval clock restarts from zero when it fires, so any
//! overshoot is dropped.

use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::settings::DifficultySettings;

/// Runtime difficulty values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    pub coin_chance: f32,
    pub obstacle_chance: f32,
    pub time_since_last_increase: f32,
    pub time_since_power_up: f32,
}

pub struct DifficultyController {
    settings: DifficultySettings,
    state: DifficultyState,
}

impl DifficultyController {
    pub fn new(settings: DifficultySettings) -> Self {
        let state = Self::initial_state(&settings);
        Self { settings, state }
    }

    fn initial_state(settings: &DifficultySettings) -> DifficultyState {
        DifficultyState {
            coin_chance: settings.initial_coin_chance.clamp(0.0, 1.0),
            obstacle_chance: settings.initial_obstacle_chance.clamp(0.0, 1.0),
            time_since_last_increase: 0.0,
            time_since_power_up: 0.0,
        }
    }

    /// Back to the configured starting chances (new run)
    pub fn reset(&mut self) {
        self.state = Self::initial_state(&self.settings);
    }

    /// Advance the scaling clocks. No-op outside gameplay.
    pub fn tick(&mut self, game_state: GameState, dt: f32) {
        if game_state != GameState::Gameplay {
            return;
        }

        let s = &mut self.state;
        s.time_since_last_increase += dt;
        if s.time_since_last_increase >= self.settings.increase_interval {
            s.time_since_last_increase = 0.0;
            s.coin_chance = (s.coin_chance + self.settings.coin_chance_increase).clamp(0.0, 1.0);
            s.obstacle_chance =
                (s.obstacle_chance + self.settings.obstacle_chance_increase).clamp(0.0, 1.0);
            log::info!(
                "Difficulty scaled: coin chance {:.1}%, obstacle chance {:.1}%",
                s.coin_chance * 100.0,
                s.obstacle_chance * 100.0
            );
        }

        s.time_since_power_up += dt;
    }

    pub fn state(&self) -> &DifficultyState {
        &self.state
    }

    pub fn coin_chance(&self) -> f32 {
        self.state.coin_chance
    }

    pub fn obstacle_chance(&self) -> f32 {
        self.state.obstacle_chance
    }

    pub fn power_up_interval(&self) -> f32 {
        self.settings.power_up_interval
    }

    pub fn can_spawn_power_up(&self) -> bool {
        self.state.time_since_power_up >= self.settings.power_up_interval
    }

    pub fn reset_power_up_timer(&mut self) {
        self.state.time_since_power_up = 0.0;
    }

    pub fn coins_per_line(&self) -> u32 {
        self.settings.coins_per_line
    }

    pub fn coins_per_arc(&self) -> u32 {
        self.settings.coins_per_arc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DifficultySettings {
        DifficultySettings {
            initial_coin_chance: 0.5,
            initial_obstacle_chance: 0.95,
            coin_chance_increase: 0.1,
            obstacle_chance_increase: 0.1,
            increase_interval: 1.0,
            power_up_interval: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_scales_only_in_gameplay() {
        let mut diff = DifficultyController::new(settings());
        diff.tick(GameState::StartMenu, 5.0);
        diff.tick(GameState::GameOver, 5.0);
        assert_eq!(diff.coin_chance(), 0.5);
        assert_eq!(diff.state().time_since_power_up, 0.0);

        diff.tick(GameState::Gameplay, 1.0);
        assert!((diff.coin_chance() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_chances_clamped_at_one() {
        let mut diff = DifficultyController::new(settings());
        for _ in 0..3 {
            diff.tick(GameState::Gameplay, 1.0);
        }
        assert_eq!(diff.obstacle_chance(), 1.0);
        assert!(diff.coin_chance() <= 1.0);
    }

    #[test]
    fn test_interval_drops_overshoot() {
        let mut diff = DifficultyController::new(settings());
        // One oversized step fires once and restarts the clock at zero
        diff.tick(GameState::Gameplay, 1.9);
        assert!((diff.coin_chance() - 0.6).abs() < 1e-6);
        assert_eq!(diff.state().time_since_last_increase, 0.0);
        diff.tick(GameState::Gameplay, 0.5);
        assert!((diff.coin_chance() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_power_up_gate() {
        let mut diff = DifficultyController::new(settings());
        assert!(!diff.can_spawn_power_up());
        diff.tick(GameState::Gameplay, 2.0);
        assert!(diff.can_spawn_power_up());
        diff.reset_power_up_timer();
        assert!(!diff.can_spawn_power_up());
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut diff = DifficultyController::new(settings());
        diff.tick(GameState::Gameplay, 1.0);
        diff.reset();
        assert_eq!(diff.coin_chance(), 0.5);
        assert_eq!(diff.obstacle_chance(), 0.95);
    }
}
