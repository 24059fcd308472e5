//! Instantiated track pieces and the items placed on them

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::{BoosterPrefab, ObstaclePrefab};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// What occupies a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Obstacle(ObstaclePrefab),
    Booster(BoosterPrefab),
    Coin,
}

impl ItemKind {
    pub fn is_obstacle(&self) -> bool {
        matches!(self, ItemKind::Obstacle(_))
    }

    pub fn is_booster(&self) -> bool {
        matches!(self, ItemKind::Booster(_))
    }
}

/// An obstacle, booster or coin riding on a piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnedItem {
    pub id: u32,
    pub kind: ItemKind,
    /// Index into the descriptor's slot list (coins have none)
    pub slot: Option<usize>,
    /// Offset from the piece origin
    pub local: Vec2,
    pub rotation: f32,
}

/// A piece placed in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPiece {
    pub id: PieceId,
    /// Catalog name of the descriptor this came from
    pub name: String,
    /// World position of the piece origin
    pub position: Vec2,
    /// Local entry anchor
    pub entry: Vec2,
    /// Local exit anchor
    pub exit: Vec2,
    /// Placed items (sorted by id)
    pub items: Vec<SpawnedItem>,
}

impl TrackPiece {
    pub fn entry_world(&self) -> Vec2 {
        self.position + self.entry
    }

    pub fn exit_world(&self) -> Vec2 {
        self.position + self.exit
    }

    pub fn item_world(&self, item: &SpawnedItem) -> Vec2 {
        self.position + item.local
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// True once the piece has scrolled behind the despawn boundary
    pub fn is_past(&self, despawn_x: f32) -> bool {
        self.position.x < despawn_x
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &SpawnedItem> {
        self.items.iter().filter(|i| i.kind.is_obstacle())
    }

    pub fn boosters(&self) -> impl Iterator<Item = &SpawnedItem> {
        self.items.iter().filter(|i| i.kind.is_booster())
    }

    pub fn coins(&self) -> impl Iterator<Item = &SpawnedItem> {
        self.items.iter().filter(|i| i.kind == ItemKind::Coin)
    }

    /// Remove an item (e.g. a collected booster)
    pub fn take_item(&mut self, item_id: u32) -> Option<SpawnedItem> {
        let index = self.items.iter().position(|i| i.id == item_id)?;
        Some(self.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece() -> TrackPiece {
        TrackPiece {
            id: PieceId(1),
            name: "test".into(),
            position: Vec2::new(10.0, 0.0),
            entry: Vec2::ZERO,
            exit: Vec2::new(20.0, 1.0),
            items: vec![SpawnedItem {
                id: 7,
                kind: ItemKind::Coin,
                slot: None,
                local: Vec2::new(2.0, 0.0),
                rotation: 0.0,
            }],
        }
    }

    #[test]
    fn test_world_anchors_follow_position() {
        let mut p = piece();
        assert_eq!(p.exit_world(), Vec2::new(30.0, 1.0));
        p.translate(Vec2::new(-5.0, 0.0));
        assert_eq!(p.entry_world(), Vec2::new(5.0, 0.0));
        assert_eq!(p.item_world(&p.items[0]), Vec2::new(7.0, 0.0));
    }

    #[test]
    fn test_despawn_boundary() {
        let mut p = piece();
        assert!(!p.is_past(-30.0));
        p.translate(Vec2::new(-40.5, 0.0));
        assert!(p.is_past(-30.0));
    }

    #[test]
    fn test_take_item() {
        let mut p = piece();
        assert!(p.take_item(99).is_none());
        assert_eq!(p.take_item(7).map(|i| i.id), Some(7));
        assert_eq!(p.coins().count(), 0);
    }
}
