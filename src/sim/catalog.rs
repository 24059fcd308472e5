//! Segment catalog: static descriptions of track pieces
//!
//! All positions in a descriptor are local to the piece origin. The spawner
//! offsets them when a piece is placed in the world.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimError};
use crate::{forward, rotate};

/// A placement point on a piece
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpawnSlot {
    pub position: Vec2,
    /// Orientation in radians
    #[serde(default)]
    pub rotation: f32,
}

impl SpawnSlot {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePrefab {
    pub name: String,
    /// Health removed on contact
    #[serde(default = "default_damage")]
    pub damage: u32,
}

fn default_damage() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterPrefab {
    pub name: String,
    /// Flat speed added while the boost lasts
    pub speed_bonus: f32,
    /// Boost (and invincibility) length in seconds
    pub duration: f32,
}

impl BoosterPrefab {
    fn validate(&self, piece: &str) -> Result<(), ConfigError> {
        if self.speed_bonus < 0.0 {
            return Err(ConfigError::Negative {
                name: format!("{piece}.booster.{}.speed_bonus", self.name),
                value: self.speed_bonus,
            });
        }
        if self.duration <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: format!("{piece}.booster.{}.duration", self.name),
                value: self.duration,
            });
        }
        Ok(())
    }
}

/// Slots of one category plus what may be placed in them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotGroup<P> {
    pub slots: Vec<SpawnSlot>,
    pub prefabs: Vec<P>,
    /// Fixed chance for this piece; `None` defers to the difficulty controller
    pub chance: Option<f32>,
    pub min: u32,
    pub max: u32,
}

impl<P> Default for SlotGroup<P> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            prefabs: Vec::new(),
            chance: None,
            min: 0,
            max: 0,
        }
    }
}

impl<P> SlotGroup<P> {
    fn validate(&self, piece: &str, category: &'static str) -> Result<(), ConfigError> {
        if !self.slots.is_empty() && self.max > 0 && self.prefabs.is_empty() {
            return Err(ConfigError::EmptyPrefabList {
                piece: piece.to_string(),
                category,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidCountRange {
                piece: piece.to_string(),
                category,
                min: self.min,
                max: self.max,
            });
        }
        if let Some(chance) = self.chance {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::ChanceOutOfRange {
                    name: format!("{piece}.{category}.chance"),
                    value: chance,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoinPatternKind {
    /// Coins in a row along the anchor's facing
    Line { spacing: f32 },
    /// Coins fanned over `angle_deg` at `radius` from the anchor
    Arc { radius: f32, angle_deg: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinPattern {
    pub anchor: SpawnSlot,
    pub kind: CoinPatternKind,
}

impl CoinPattern {
    /// Local coin positions for this pattern
    pub fn coin_positions(&self, coins_per_line: u32, coins_per_arc: u32) -> Vec<Vec2> {
        let origin = self.anchor.position;
        let facing = forward(self.anchor.rotation);
        match self.kind {
            CoinPatternKind::Line { spacing } => (0..coins_per_line)
                .map(|i| origin + facing * (i as f32 * spacing))
                .collect(),
            CoinPatternKind::Arc { radius, angle_deg } => match coins_per_arc {
                0 => Vec::new(),
                1 => vec![origin],
                n => {
                    let total = angle_deg.to_radians();
                    let step = total / (n - 1) as f32;
                    let start = -total / 2.0;
                    (0..n)
                        .map(|i| origin + rotate(facing, start + i as f32 * step) * radius)
                        .collect()
                }
            },
        }
    }
}

/// Static description of a track piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceDescriptor {
    pub name: String,
    /// Where this piece joins the previous piece's exit
    pub entry: Vec2,
    /// Where the next piece attaches
    pub exit: Vec2,
    #[serde(default)]
    pub obstacles: SlotGroup<ObstaclePrefab>,
    #[serde(default)]
    pub boosters: SlotGroup<BoosterPrefab>,
    #[serde(default)]
    pub coins: Vec<CoinPattern>,
}

impl PieceDescriptor {
    /// A bare piece with no slots
    pub fn plain(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            entry: Vec2::ZERO,
            exit: Vec2::new(length, 0.0),
            obstacles: SlotGroup::default(),
            boosters: SlotGroup::default(),
            coins: Vec::new(),
        }
    }

    pub fn length(&self) -> f32 {
        self.exit.x - self.entry.x
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length() <= 0.0 {
            return Err(ConfigError::DegeneratePiece {
                piece: self.name.clone(),
            });
        }
        self.obstacles.validate(&self.name, "obstacle")?;
        self.boosters.validate(&self.name, "booster")?;
        for prefab in &self.boosters.prefabs {
            prefab.validate(&self.name)?;
        }
        Ok(())
    }
}

/// Every piece the spawner may place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceCatalog {
    /// Always placed first when a run starts
    pub first: PieceDescriptor,
    /// Chosen uniformly for every following piece
    #[serde(default)]
    pub pieces: Vec<PieceDescriptor>,
}

impl PieceCatalog {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let catalog: PieceCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::info!(
            "Loaded piece catalog from {} ({} pieces)",
            path.display(),
            catalog.pieces.len()
        );
        Ok(catalog)
    }

    /// Checks every descriptor. An empty `pieces` list is allowed here and
    /// reported by the spawner when it needs a piece.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.first.validate()?;
        for piece in &self.pieces {
            piece.validate()?;
        }
        Ok(())
    }

    /// Small built-in catalog
    pub fn demo() -> Self {
        let cones = vec![
            ObstaclePrefab {
                name: "cone".into(),
                damage: 1,
            },
            ObstaclePrefab {
                name: "barrier".into(),
                damage: 2,
            },
        ];
        let boosters = vec![BoosterPrefab {
            name: "rocket".into(),
            speed_bonus: 5.0,
            duration: 5.0,
        }];

        let straight = PieceDescriptor {
            obstacles: SlotGroup {
                slots: vec![
                    SpawnSlot::at(6.0, 0.0),
                    SpawnSlot::at(12.0, 0.0),
                    SpawnSlot::at(18.0, 0.0),
                    SpawnSlot::at(24.0, 0.0),
                ],
                prefabs: cones.clone(),
                chance: None,
                min: 1,
                max: 2,
            },
            boosters: SlotGroup {
                slots: vec![SpawnSlot::at(15.0, 2.0)],
                prefabs: boosters.clone(),
                chance: Some(0.25),
                min: 0,
                max: 1,
            },
            coins: vec![CoinPattern {
                anchor: SpawnSlot::at(3.0, 1.0),
                kind: CoinPatternKind::Line { spacing: 1.0 },
            }],
            ..PieceDescriptor::plain("straight", 30.0)
        };

        let hill = PieceDescriptor {
            entry: Vec2::new(0.0, 0.0),
            exit: Vec2::new(20.0, 2.0),
            obstacles: SlotGroup {
                slots: vec![SpawnSlot::at(8.0, 1.0), SpawnSlot::at(14.0, 1.5)],
                prefabs: cones,
                chance: None,
                min: 1,
                max: 1,
            },
            coins: vec![CoinPattern {
                anchor: SpawnSlot::at(10.0, 2.0),
                kind: CoinPatternKind::Arc {
                    radius: 2.0,
                    angle_deg: 90.0,
                },
            }],
            ..PieceDescriptor::plain("hill", 20.0)
        };

        let dip = PieceDescriptor {
            entry: Vec2::new(0.0, 2.0),
            exit: Vec2::new(25.0, 0.0),
            boosters: SlotGroup {
                slots: vec![SpawnSlot::at(10.0, 2.0), SpawnSlot::at(18.0, 2.0)],
                prefabs: boosters,
                chance: Some(0.5),
                min: 1,
                max: 1,
            },
            ..PieceDescriptor::plain("dip", 25.0)
        };

        Self {
            first: PieceDescriptor::plain("start", 40.0),
            pieces: vec![straight, hill, dip],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_is_valid() {
        assert!(PieceCatalog::demo().validate().is_ok());
    }

    #[test]
    fn test_slots_without_prefabs_rejected() {
        let mut piece = PieceDescriptor::plain("bad", 10.0);
        piece.obstacles.slots.push(SpawnSlot::at(1.0, 0.0));
        piece.obstacles.max = 1;
        assert!(matches!(
            piece.validate(),
            Err(ConfigError::EmptyPrefabList {
                category: "obstacle",
                ..
            })
        ));
    }

    #[test]
    fn test_backwards_piece_rejected() {
        let mut piece = PieceDescriptor::plain("reverse", 10.0);
        piece.exit = Vec2::new(-5.0, 0.0);
        assert!(matches!(
            piece.validate(),
            Err(ConfigError::DegeneratePiece { .. })
        ));
    }

    fn booster_piece(speed_bonus: f32, duration: f32) -> PieceDescriptor {
        let mut piece = PieceDescriptor::plain("boost", 10.0);
        piece.boosters = SlotGroup {
            slots: vec![SpawnSlot::at(5.0, 1.0)],
            prefabs: vec![BoosterPrefab {
                name: "rocket".into(),
                speed_bonus,
                duration,
            }],
            chance: Some(1.0),
            min: 1,
            max: 1,
        };
        piece
    }

    #[test]
    fn test_booster_without_duration_rejected() {
        assert!(matches!(
            booster_piece(2.0, 0.0).validate(),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(booster_piece(2.0, 1.5).validate().is_ok());
    }

    #[test]
    fn test_booster_negative_bonus_rejected() {
        assert!(matches!(
            booster_piece(-1.0, 3.0).validate(),
            Err(ConfigError::Negative { .. })
        ));
    }

    #[test]
    fn test_line_pattern_follows_facing() {
        let pattern = CoinPattern {
            anchor: SpawnSlot {
                position: Vec2::new(1.0, 1.0),
                rotation: std::f32::consts::FRAC_PI_2,
            },
            kind: CoinPatternKind::Line { spacing: 2.0 },
        };
        let coins = pattern.coin_positions(3, 0);
        assert_eq!(coins.len(), 3);
        assert!((coins[2] - Vec2::new(1.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_arc_pattern_spread() {
        let pattern = CoinPattern {
            anchor: SpawnSlot::at(0.0, 0.0),
            kind: CoinPatternKind::Arc {
                radius: 2.0,
                angle_deg: 90.0,
            },
        };
        let coins = pattern.coin_positions(0, 3);
        assert_eq!(coins.len(), 3);
        for coin in &coins {
            assert!((coin.length() - 2.0).abs() < 1e-4);
        }
        // Middle coin sits straight ahead
        assert!((coins[1] - Vec2::new(2.0, 0.0)).length() < 1e-4);
        assert_eq!(pattern.coin_positions(0, 1), vec![Vec2::ZERO]);
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let json = serde_json::to_string(&PieceCatalog::demo()).unwrap();
        let catalog = PieceCatalog::from_json(&json).unwrap();
        assert_eq!(catalog.pieces.len(), 3);
        assert_eq!(catalog.first.name, "start");
    }
}
