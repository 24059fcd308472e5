//! Segment spawner
//!
//! Lays track pieces end to end ahead of the viewpoint and fills each new
//! piece with obstacles, boosters and coins. Pieces retire on their own once
//! they scroll past the despawn boundary.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::catalog::{PieceCatalog, PieceDescriptor, SlotGroup};
use super::difficulty::DifficultyController;
use super::piece::{ItemKind, PieceId, SpawnedItem, TrackPiece};
use super::state::GameState;
use crate::error::ConfigError;
use crate::settings::SpawnerSettings;

pub struct SegmentSpawner {
    catalog: PieceCatalog,
    settings: SpawnerSettings,
    rng: Pcg32,
    /// Active pieces, oldest first
    pieces: Vec<TrackPiece>,
    /// Stitching anchor for the next piece
    last_spawned: Option<PieceId>,
    next_piece_id: u32,
    next_item_id: u32,
}

impl SegmentSpawner {
    pub fn new(catalog: PieceCatalog, settings: SpawnerSettings, seed: u64) -> Self {
        Self {
            catalog,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            pieces: Vec::new(),
            last_spawned: None,
            next_piece_id: 1,
            next_item_id: 1,
        }
    }

    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SpawnerSettings {
        &self.settings
    }

    pub fn pieces(&self) -> &[TrackPiece] {
        &self.pieces
    }

    pub fn pieces_mut(&mut self) -> &mut [TrackPiece] {
        &mut self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&TrackPiece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut TrackPiece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    pub fn last_spawned(&self) -> Option<&TrackPiece> {
        self.last_spawned.and_then(|id| self.piece(id))
    }

    /// Destroy every active piece
    pub fn clear(&mut self) {
        self.pieces.clear();
        self.last_spawned = None;
    }

    /// Clear the track and lay down the opening pieces
    pub fn restart(&mut self, difficulty: &mut DifficultyController) {
        self.clear();
        self.spawn_first(self.settings.origin, difficulty);
        for _ in 1..self.settings.initial_pieces {
            if let Err(e) = self.spawn_next(difficulty) {
                log::error!("Cannot pre-spawn track: {e}");
                break;
            }
        }
        log::debug!("Track seeded with {} pieces", self.pieces.len());
    }

    /// Place the designated first piece with its origin at `origin`
    pub fn spawn_first(&mut self, origin: Vec2, difficulty: &mut DifficultyController) -> PieceId {
        let descriptor = &self.catalog.first;
        let id = PieceId(self.next_piece_id);
        self.next_piece_id += 1;

        let items = populate(&mut self.rng, &mut self.next_item_id, descriptor, difficulty);
        self.pieces.push(TrackPiece {
            id,
            name: descriptor.name.clone(),
            position: origin,
            entry: descriptor.entry,
            exit: descriptor.exit,
            items,
        });
        self.last_spawned = Some(id);
        id
    }

    /// Pick a random piece and attach its entry to the last piece's exit
    pub fn spawn_next(&mut self, difficulty: &mut DifficultyController) -> Result<PieceId, ConfigError> {
        if self.catalog.pieces.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let anchor = self.last_spawned().ok_or(ConfigError::NoLastPiece)?.exit_world();

        let index = self.rng.random_range(0..self.catalog.pieces.len());
        let descriptor = &self.catalog.pieces[index];
        let id = PieceId(self.next_piece_id);
        self.next_piece_id += 1;

        let position = anchor - descriptor.entry;
        let items = populate(&mut self.rng, &mut self.next_item_id, descriptor, difficulty);
        log::trace!(
            "Spawned piece {} '{}' at ({:.2}, {:.2}) with {} items",
            id.0,
            descriptor.name,
            position.x,
            position.y,
            items.len()
        );

        self.pieces.push(TrackPiece {
            id,
            name: descriptor.name.clone(),
            position,
            entry: descriptor.entry,
            exit: descriptor.exit,
            items,
        });
        self.last_spawned = Some(id);
        Ok(id)
    }

    /// Spawn the next piece once the viewpoint nears the end of the track.
    /// At most one piece per call; a failed spawn is logged and retried on
    /// the next call.
    pub fn tick(
        &mut self,
        game_state: GameState,
        viewpoint: Vec2,
        difficulty: &mut DifficultyController,
    ) -> Option<PieceId> {
        if game_state != GameState::Gameplay {
            return None;
        }
        let Some(last) = self.last_spawned() else {
            log::warn!("No track to extend; waiting for a run start");
            return None;
        };
        let distance = last.exit_world().x - viewpoint.x;
        if distance >= self.settings.trigger_distance {
            return None;
        }
        match self.spawn_next(difficulty) {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!("Cannot spawn next piece: {e}");
                None
            }
        }
    }

    /// Destroy pieces behind the despawn boundary. Returns their ids.
    /// The last spawned piece is the stitching anchor and stays until a
    /// newer piece replaces it.
    pub fn despawn_passed(&mut self) -> Vec<PieceId> {
        let boundary = self.settings.despawn_x;
        let anchor = self.last_spawned;
        let mut removed = Vec::new();
        self.pieces.retain(|piece| {
            let past = piece.is_past(boundary) && Some(piece.id) != anchor;
            if past {
                removed.push(piece.id);
            }
            !past
        });
        for id in &removed {
            log::trace!("Despawned piece {}", id.0);
        }
        removed
    }
}

/// Fill a fresh piece from its descriptor
fn populate(
    rng: &mut Pcg32,
    next_item_id: &mut u32,
    descriptor: &PieceDescriptor,
    difficulty: &mut DifficultyController,
) -> Vec<SpawnedItem> {
    let mut items = Vec::new();

    let obstacle_chance = descriptor
        .obstacles
        .chance
        .unwrap_or_else(|| difficulty.obstacle_chance());
    fill_slots(
        rng,
        next_item_id,
        &descriptor.obstacles,
        obstacle_chance,
        |p| ItemKind::Obstacle(p.clone()),
        &mut items,
    );

    // Without a fixed chance, boosters appear whenever the power-up clock allows
    let booster_chance = descriptor.boosters.chance.unwrap_or_else(|| {
        if difficulty.can_spawn_power_up() {
            1.0
        } else {
            0.0
        }
    });
    let boosters = fill_slots(
        rng,
        next_item_id,
        &descriptor.boosters,
        booster_chance,
        |p| ItemKind::Booster(p.clone()),
        &mut items,
    );
    if boosters > 0 {
        difficulty.reset_power_up_timer();
    }

    if !descriptor.coins.is_empty() && rng.random::<f32>() < difficulty.coin_chance() {
        for pattern in &descriptor.coins {
            let positions =
                pattern.coin_positions(difficulty.coins_per_line(), difficulty.coins_per_arc());
            for local in positions {
                items.push(SpawnedItem {
                    id: take_id(next_item_id),
                    kind: ItemKind::Coin,
                    slot: None,
                    local,
                    rotation: pattern.anchor.rotation,
                });
            }
        }
    }

    items
}

/// Place between `min` and `max` prefabs on distinct random slots.
/// Returns how many were placed.
fn fill_slots<P>(
    rng: &mut Pcg32,
    next_item_id: &mut u32,
    group: &SlotGroup<P>,
    chance: f32,
    make: impl Fn(&P) -> ItemKind,
    items: &mut Vec<SpawnedItem>,
) -> usize {
    if rng.random::<f32>() >= chance {
        return 0;
    }
    if group.slots.is_empty() || group.prefabs.is_empty() || group.min > group.max {
        return 0;
    }

    let count = rng.random_range(group.min..=group.max);
    let mut available: Vec<usize> = (0..group.slots.len()).collect();
    let mut placed = 0;
    for _ in 0..count {
        if available.is_empty() {
            break;
        }
        let slot_index = available.remove(rng.random_range(0..available.len()));
        let prefab = &group.prefabs[rng.random_range(0..group.prefabs.len())];
        let slot = group.slots[slot_index];
        items.push(SpawnedItem {
            id: take_id(next_item_id),
            kind: make(prefab),
            slot: Some(slot_index),
            local: slot.position,
            rotation: slot.rotation,
        });
        placed += 1;
    }
    placed
}

fn take_id(next: &mut u32) -> u32 {
    let id = *next;
    *next += 1;
    id
}
