use hollowvein_common::{Direction, GridPoint};
use serde::{Deserialize, Serialize};

/// Block materials. `Relic` is an unranged special: it never takes part in
/// depth-banded counting and is only placed by features.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Material {
    Dirt,
    Stone,
    Copper,
    Silver,
    Gold,
    Platinum,
    Relic,
}

impl Material {
    pub const ALL: [Material; 7] = [
        Material::Dirt,
        Material::Stone,
        Material::Copper,
        Material::Silver,
        Material::Gold,
        Material::Platinum,
        Material::Relic,
    ];
}

/// Semantic kind of a carved space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceKind {
    Cavern,
    Corridor,
    Shaft,
}

/// A placed world feature with its type-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Teleporter { channel: u32 },
    SupplyCache { capacity: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub position: GridPoint,
    pub kind: FeatureKind,
}

/// A placed hazard with its type-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Stalagmite { facing: Direction, segments: u32 },
    GasVent { radius: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazard {
    pub position: GridPoint,
    pub kind: HazardKind,
}

/// Enemy types the picker can select from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EnemyKind {
    Bat,
    Crawler,
    Spitter,
    Lurker,
    Brute,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Bat,
        EnemyKind::Crawler,
        EnemyKind::Spitter,
        EnemyKind::Lurker,
        EnemyKind::Brute,
    ];

    /// Static cost and footprint table. Never mutated at runtime; selection
    /// only reads it.
    pub const fn requirements(self) -> EnemyRequirements {
        match self {
            EnemyKind::Bat => EnemyRequirements {
                cost: 1,
                height: 1,
                length: 1,
            },
            EnemyKind::Crawler => EnemyRequirements {
                cost: 2,
                height: 1,
                length: 2,
            },
            EnemyKind::Spitter => EnemyRequirements {
                cost: 3,
                height: 2,
                length: 1,
            },
            EnemyKind::Lurker => EnemyRequirements {
                cost: 5,
                height: 2,
                length: 3,
            },
            EnemyKind::Brute => EnemyRequirements {
                cost: 8,
                height: 3,
                length: 3,
            },
        }
    }
}

/// Risk-point cost and physical footprint of an enemy type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyRequirements {
    pub cost: u32,
    pub height: i32,
    pub length: i32,
}
