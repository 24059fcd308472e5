//! State orchestrator
//!
//! Sole writer of `GameState`, `PlayerState`, the active boost and the move
//! speed. Every transition is broadcast synchronously before its entry logic
//! runs, and the boost/countdown timers are plain fields advanced by `tick`.

use serde::{Deserialize, Serialize};

use super::listeners::{GameStateListeners, PlayerStateListeners, Signal};
use super::state::{Boost, GameState, MoveSpeed, PlayerState};
use crate::error::{ConfigError, ListenerFailure, SimError};
use crate::settings::SpeedSettings;

/// A completed game state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: GameState,
    pub to: GameState,
}

impl Transition {
    /// Entering gameplay from anywhere else begins a new run
    pub fn starts_run(&self) -> bool {
        self.to == GameState::Gameplay && self.from != GameState::Gameplay
    }
}

pub struct StateOrchestrator {
    game_state: GameState,
    player_state: PlayerState,
    speed: MoveSpeed,
    speed_settings: SpeedSettings,
    countdown_secs: f32,
    /// Seconds left in the countdown, if one is running
    countdown: Option<f32>,
    boost: Option<Boost>,
    game_listeners: GameStateListeners,
    player_listeners: PlayerStateListeners,
    state_changed: Signal<GameState>,
    boost_started: Signal<f32>,
    failures: Vec<ListenerFailure>,
    transitions: Vec<Transition>,
}

impl StateOrchestrator {
    pub fn new(speed_settings: SpeedSettings, countdown_secs: f32) -> Self {
        Self {
            game_state: GameState::StartMenu,
            player_state: PlayerState::Normal,
            speed: MoveSpeed::default(),
            speed_settings,
            countdown_secs,
            countdown: None,
            boost: None,
            game_listeners: GameStateListeners::new(),
            player_listeners: PlayerStateListeners::new(),
            state_changed: Signal::default(),
            boost_started: Signal::default(),
            failures: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    pub fn speed(&self) -> MoveSpeed {
        self.speed
    }

    pub fn effective_speed(&self) -> f32 {
        self.speed.effective()
    }

    pub fn boost(&self) -> Option<&Boost> {
        self.boost.as_ref()
    }

    pub fn countdown_remaining(&self) -> Option<f32> {
        self.countdown
    }

    pub fn speed_settings(&self) -> &SpeedSettings {
        &self.speed_settings
    }

    pub fn game_listeners(&mut self) -> &mut GameStateListeners {
        &mut self.game_listeners
    }

    pub fn player_listeners(&mut self) -> &mut PlayerStateListeners {
        &mut self.player_listeners
    }

    /// Fired with the new state before the listener broadcast
    pub fn state_changed(&mut self) -> &mut Signal<GameState> {
        &mut self.state_changed
    }

    /// Fired with the boost duration whenever a boost starts
    pub fn boost_started(&mut self) -> &mut Signal<f32> {
        &mut self.boost_started
    }

    /// Listener failures recorded since the last call
    pub fn take_failures(&mut self) -> Vec<ListenerFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Transitions completed since the last call, oldest first
    pub fn drain_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transitions)
    }

    /// Switch the game state. Re-entering the current state is allowed and
    /// re-runs its entry logic.
    pub fn request_state(&mut self, new_state: GameState) {
        let from = self.game_state;
        self.game_state = new_state;
        self.countdown = None;

        // Any transition ends the boost; the Normal broadcast follows the
        // game state broadcast below.
        let was_boosted = self.cancel_boost();

        log::info!("State: {from:?} -> {new_state:?}");

        self.state_changed.emit(new_state);
        let failures = self.game_listeners.notify(new_state);
        self.failures.extend(failures);

        let force_normal = match new_state {
            GameState::StartMenu | GameState::GameOver => {
                self.speed.reset();
                true
            }
            GameState::Countdown => {
                self.countdown = Some(self.countdown_secs);
                was_boosted
            }
            GameState::Gameplay => {
                self.speed.start(&self.speed_settings);
                was_boosted
            }
        };
        if force_normal {
            self.request_player_state(PlayerState::Normal);
        }

        self.transitions.push(Transition {
            from,
            to: new_state,
        });
    }

    /// StartMenu -> Countdown
    pub fn request_game_start(&mut self) {
        self.request_state(GameState::Countdown);
    }

    pub fn request_game_end(&mut self) {
        self.request_state(GameState::GameOver);
    }

    /// Set and broadcast the player state
    pub(crate) fn request_player_state(&mut self, new_state: PlayerState) {
        if new_state != self.player_state {
            log::debug!("Player state: {:?} -> {:?}", self.player_state, new_state);
        }
        self.player_state = new_state;
        let failures = self.player_listeners.notify(new_state);
        self.failures.extend(failures);
    }

    /// Start a boost, replacing any active one
    pub fn apply_boost(&mut self, bonus: f32, duration: f32) -> Result<(), SimError> {
        if self.game_state != GameState::Gameplay {
            return Err(SimError::BoostRejected {
                state: self.game_state,
            });
        }
        if bonus < 0.0 {
            return Err(ConfigError::Negative {
                name: "boost bonus".into(),
                value: bonus,
            }
            .into());
        }
        if duration <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "boost duration".into(),
                value: duration,
            }
            .into());
        }

        self.boost = Some(Boost::new(bonus, duration));
        self.speed.set_bonus(bonus);
        self.boost_started.emit(duration);
        self.request_player_state(PlayerState::Boosted);
        Ok(())
    }

    /// Drop the active boost without broadcasting. Returns whether the
    /// player was boosted.
    fn cancel_boost(&mut self) -> bool {
        self.boost = None;
        self.speed.clear_bonus();
        let was_boosted = self.player_state == PlayerState::Boosted;
        self.player_state = PlayerState::Normal;
        was_boosted
    }

    /// Advance the countdown, boost expiry and speed growth by one step
    pub fn tick(&mut self, dt: f32) {
        if let Some(remaining) = self.countdown.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.countdown = None;
                self.request_state(GameState::Gameplay);
            }
        }

        let expired = self.boost.as_mut().is_some_and(|boost| boost.tick(dt));
        if expired {
            log::debug!("Boost expired");
            self.boost = None;
            self.speed.clear_bonus();
            self.request_player_state(PlayerState::Normal);
        }

        if self.game_state == GameState::Gameplay && self.player_state == PlayerState::Normal {
            self.speed.accelerate(&self.speed_settings, dt);
        }
    }

    /// Verify the rules this type enforces still hold
    pub fn check_invariants(&self) -> Result<(), SimError> {
        if self.player_state == PlayerState::Boosted && self.game_state != GameState::Gameplay {
            return Err(SimError::InvariantViolation(format!(
                "player boosted while in {:?}",
                self.game_state
            )));
        }
        if self.boost.is_some() != (self.player_state == PlayerState::Boosted) {
            return Err(SimError::InvariantViolation(format!(
                "boost active = {} but player state is {:?}",
                self.boost.is_some(),
                self.player_state
            )));
        }
        let base = self.speed.base();
        if !(0.0..=self.speed_settings.max_move_speed).contains(&base) {
            return Err(SimError::InvariantViolation(format!(
                "base speed {base} outside [0, {}]",
                self.speed_settings.max_move_speed
            )));
        }
        Ok(())
    }
}
