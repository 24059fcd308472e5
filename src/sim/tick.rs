//! Simulation session and fixed-order tick
//!
//! A `Session` owns one instance of every core component. Collaborators get
//! at them through the session instead of through globals, so any number of
//! sessions can run side by side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::PieceCatalog;
use super::difficulty::DifficultyController;
use super::health::{DamageOutcome, Health};
use super::listeners::{GameStateListeners, PlayerStateListeners, Signal};
use super::motion::{self, TrailElement};
use super::orchestrator::StateOrchestrator;
use super::piece::{ItemKind, PieceId, TrackPiece};
use super::spawner::SegmentSpawner;
use super::state::{GameState, MoveSpeed, PlayerState};
use crate::error::{ListenerFailure, SimError};
use crate::settings::Settings;

/// Commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// StartMenu -> Countdown (start button)
    pub start_game: bool,
    /// Force game over
    pub end_game: bool,
    /// Any explicit transition (e.g. restart straight into gameplay)
    pub request_state: Option<GameState>,
    /// Move the viewpoint the spawner measures against
    pub viewpoint: Option<Vec2>,
}

/// Per-run statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Seconds of gameplay this run
    pub elapsed: f32,
    /// Distance scrolled this run
    pub distance: f32,
    /// Runs started this session
    pub runs: u32,
}

pub struct Session {
    settings: Settings,
    orchestrator: StateOrchestrator,
    difficulty: DifficultyController,
    spawner: SegmentSpawner,
    health: Health,
    trails: Vec<TrailElement>,
    next_trail_id: u32,
    viewpoint: Vec2,
    stats: RunStats,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl Session {
    /// Build a session at `StartMenu`. Both inputs are validated.
    pub fn new(settings: Settings, catalog: PieceCatalog) -> Result<Self, SimError> {
        settings.validate()?;
        catalog.validate()?;

        Ok(Self {
            orchestrator: StateOrchestrator::new(settings.speed.clone(), settings.countdown_secs),
            difficulty: DifficultyController::new(settings.difficulty.clone()),
            spawner: SegmentSpawner::new(catalog, settings.spawner.clone(), settings.seed),
            health: Health::new(settings.health.max_health),
            trails: Vec::new(),
            next_trail_id: 1,
            viewpoint: settings.spawner.viewpoint,
            stats: RunStats::default(),
            time_ticks: 0,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn game_state(&self) -> GameState {
        self.orchestrator.game_state()
    }

    pub fn player_state(&self) -> PlayerState {
        self.orchestrator.player_state()
    }

    pub fn speed(&self) -> MoveSpeed {
        self.orchestrator.speed()
    }

    pub fn effective_speed(&self) -> f32 {
        self.orchestrator.effective_speed()
    }

    pub fn orchestrator(&self) -> &StateOrchestrator {
        &self.orchestrator
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    pub fn spawner(&self) -> &SegmentSpawner {
        &self.spawner
    }

    pub fn pieces(&self) -> &[TrackPiece] {
        self.spawner.pieces()
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn trails(&self) -> &[TrailElement] {
        &self.trails
    }

    pub fn viewpoint(&self) -> Vec2 {
        self.viewpoint
    }

    pub fn set_viewpoint(&mut self, viewpoint: Vec2) {
        self.viewpoint = viewpoint;
    }

    pub fn game_listeners(&mut self) -> &mut GameStateListeners {
        self.orchestrator.game_listeners()
    }

    pub fn player_listeners(&mut self) -> &mut PlayerStateListeners {
        self.orchestrator.player_listeners()
    }

    pub fn state_changed(&mut self) -> &mut Signal<GameState> {
        self.orchestrator.state_changed()
    }

    pub fn boost_started(&mut self) -> &mut Signal<f32> {
        self.orchestrator.boost_started()
    }

    /// Listener failures since the last call
    pub fn take_listener_failures(&mut self) -> Vec<ListenerFailure> {
        self.orchestrator.take_failures()
    }

    /// Lay a trail element at `position`
    pub fn add_trail(&mut self, position: Vec2) -> u32 {
        let id = self.next_trail_id;
        self.next_trail_id += 1;
        self.trails.push(TrailElement { id, position });
        id
    }

    pub fn request_state(&mut self, state: GameState) {
        self.orchestrator.request_state(state);
        self.apply_transitions();
    }

    pub fn request_game_start(&mut self) {
        self.orchestrator.request_game_start();
        self.apply_transitions();
    }

    pub fn request_game_end(&mut self) {
        self.orchestrator.request_game_end();
        self.apply_transitions();
    }

    pub fn apply_boost(&mut self, bonus: f32, duration: f32) -> Result<(), SimError> {
        self.orchestrator.apply_boost(bonus, duration)
    }

    /// Consume a booster item: boost plus invincibility for its duration
    pub fn collect_booster(&mut self, piece: PieceId, item: u32) -> Result<(), SimError> {
        if self.game_state() != GameState::Gameplay {
            return Err(SimError::BoostRejected {
                state: self.game_state(),
            });
        }
        let booster = self
            .spawner
            .piece(piece)
            .and_then(|p| p.items.iter().find(|i| i.id == item))
            .and_then(|i| match &i.kind {
                ItemKind::Booster(prefab) => Some(prefab.clone()),
                _ => None,
            })
            .ok_or(SimError::UnknownItem { piece: piece.0, item })?;

        // The item is only consumed once the boost took hold
        self.orchestrator.apply_boost(booster.speed_bonus, booster.duration)?;
        if let Some(track) = self.spawner.piece_mut(piece) {
            track.take_item(item);
        }
        self.health.set_invincible(booster.duration);
        log::debug!("Collected booster '{}'", booster.name);
        Ok(())
    }

    /// The player ran into an obstacle item
    pub fn hit_obstacle(&mut self, piece: PieceId, item: u32) -> Result<DamageOutcome, SimError> {
        let damage = self
            .spawner
            .piece(piece)
            .and_then(|p| p.items.iter().find(|i| i.id == item))
            .and_then(|i| match &i.kind {
                ItemKind::Obstacle(prefab) => Some(prefab.damage),
                _ => None,
            })
            .ok_or(SimError::UnknownItem { piece: piece.0, item })?;
        Ok(self.apply_damage(damage))
    }

    /// Damage the player; death ends the game. Ignored outside gameplay.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.game_state() != GameState::Gameplay {
            return DamageOutcome::Ignored;
        }
        let outcome = self.health.take_damage(amount);
        if outcome == DamageOutcome::Died {
            self.request_game_end();
        }
        outcome
    }

    /// Kill the player regardless of invincibility (kill zones)
    pub fn kill_player(&mut self) {
        if self.game_state() == GameState::Gameplay && self.health.force_kill() {
            self.request_game_end();
        }
    }

    /// React to transitions the orchestrator completed
    fn apply_transitions(&mut self) {
        for transition in self.orchestrator.drain_transitions() {
            self.health.clear_invincibility();
            if transition.starts_run() {
                self.difficulty.reset();
                self.spawner.restart(&mut self.difficulty);
                self.health.reset();
                self.trails.clear();
                self.stats = RunStats {
                    runs: self.stats.runs + 1,
                    ..RunStats::default()
                };
                log::info!("Run {} started", self.stats.runs);
            }
        }
    }

    /// Advance the session by one step
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Result<(), SimError> {
        self.time_ticks += 1;

        if let Some(viewpoint) = input.viewpoint {
            self.viewpoint = viewpoint;
        }
        if input.start_game {
            self.request_game_start();
        }
        if input.end_game {
            self.request_game_end();
        }
        if let Some(state) = input.request_state {
            self.request_state(state);
        }

        // Timers may complete transitions; world updates see the result
        self.orchestrator.tick(dt);
        self.apply_transitions();

        let state = self.game_state();
        let speed = self.effective_speed();

        self.difficulty.tick(state, dt);
        self.health.tick(dt);

        let delta = motion::advance_pieces(self.spawner.pieces_mut(), state, speed, dt);
        motion::advance_trails(&mut self.trails, state, speed, dt);
        motion::retire_trails(&mut self.trails, self.settings.spawner.trail_despawn_x);
        if state == GameState::Gameplay {
            self.stats.elapsed += dt;
            self.stats.distance += delta.length();
        }

        self.spawner.despawn_passed();
        self.spawner.tick(state, self.viewpoint, &mut self.difficulty);

        if let Err(e) = self.orchestrator.check_invariants() {
            log::error!("{e}");
            return Err(e);
        }
        Ok(())
    }
}

/// Advance the simulation by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) -> Result<(), SimError> {
    session.tick(input, dt)
}
