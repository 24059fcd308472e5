//! World motion
//!
//! Everything that scrolls reads the one shared effective speed. Nothing
//! moves outside gameplay.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::piece::TrackPiece;
use super::state::GameState;
use crate::SCROLL_DIR;

/// Anything displaced by the world scroll
pub trait Scrolling {
    fn translate(&mut self, delta: Vec2);
}

impl Scrolling for TrackPiece {
    fn translate(&mut self, delta: Vec2) {
        TrackPiece::translate(self, delta);
    }
}

/// Decorative element left by the player. Moves opposite to the scroll,
/// drifting away from the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailElement {
    pub id: u32,
    pub position: Vec2,
}

impl Scrolling for TrailElement {
    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

/// Drop trail elements that drifted beyond `boundary_x`. Returns how many.
pub fn retire_trails(trails: &mut Vec<TrailElement>, boundary_x: f32) -> usize {
    let before = trails.len();
    trails.retain(|trail| trail.position.x <= boundary_x);
    before - trails.len()
}

/// Displacement for one step at `speed` along `direction`
#[inline]
pub fn displacement(direction: Vec2, speed: f32, dt: f32) -> Vec2 {
    direction * speed * dt
}

/// Move every object by `speed * dt` along `direction` during gameplay.
/// Returns the applied displacement (zero when frozen).
pub fn advance<T: Scrolling>(
    objects: &mut [T],
    direction: Vec2,
    game_state: GameState,
    speed: f32,
    dt: f32,
) -> Vec2 {
    if game_state != GameState::Gameplay {
        return Vec2::ZERO;
    }
    let delta = displacement(direction, speed, dt);
    for object in objects.iter_mut() {
        object.translate(delta);
    }
    delta
}

/// Scroll track pieces toward the despawn side
pub fn advance_pieces(pieces: &mut [TrackPiece], game_state: GameState, speed: f32, dt: f32) -> Vec2 {
    advance(pieces, SCROLL_DIR, game_state, speed, dt)
}

/// Move trail elements opposite to the scroll
pub fn advance_trails(trails: &mut [TrailElement], game_state: GameState, speed: f32, dt: f32) -> Vec2 {
    advance(trails, -SCROLL_DIR, game_state, speed, dt)
}
