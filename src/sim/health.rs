//! Player health
//!
//! Invincibility (granted by boosters) keeps the player alive at 1 health.

use serde::{Deserialize, Serialize};

/// Result of applying damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Already dead or zero damage
    Ignored,
    /// Health changed, still alive
    Damaged,
    /// Health reached zero this hit
    Died,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    max: u32,
    current: u32,
    dead: bool,
    /// Seconds of invincibility left
    invincible: f32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self {
            max,
            current: max,
            dead: false,
            invincible: 0.0,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible > 0.0
    }

    /// Full health, alive, no invincibility
    pub fn reset(&mut self) {
        *self = Self::new(self.max);
    }

    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.dead || amount == 0 {
            return DamageOutcome::Ignored;
        }

        if self.is_invincible() && amount >= self.current {
            if self.current > 1 {
                self.current = 1;
                return DamageOutcome::Damaged;
            }
            return DamageOutcome::Ignored;
        }

        self.current = self.current.saturating_sub(amount);
        if self.current == 0 {
            self.dead = true;
            log::info!("Player died");
            return DamageOutcome::Died;
        }
        DamageOutcome::Damaged
    }

    pub fn heal(&mut self, amount: u32) {
        if self.dead || amount == 0 {
            return;
        }
        self.current = (self.current + amount).min(self.max);
    }

    /// Kill regardless of invincibility. Returns false if already dead.
    pub fn force_kill(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.current = 0;
        self.dead = true;
        true
    }

    /// Invincible for `duration` seconds (replaces any remaining time)
    pub fn set_invincible(&mut self, duration: f32) {
        self.invincible = duration.max(0.0);
    }

    pub fn clear_invincibility(&mut self) {
        self.invincible = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.invincible > 0.0 {
            self.invincible = (self.invincible - dt).max(0.0);
        }
    }
}
