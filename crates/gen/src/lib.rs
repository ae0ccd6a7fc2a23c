//! Procedural content placement.
//!
//! # Invariants
//! - Block counts are a pure function of depth and the tables; only the
//!   placement of counted blocks within a chunk is randomized.
//! - Enemy selection never exceeds its risk budget.
//! - Hazard planning degrades gracefully: a rejected placement is an
//!   omission, never a build failure.
//! - Within one chunk build, geometry carving completes before any
//!   resource, hazard, or enemy placement.

pub mod blocks;
pub mod builder;
pub mod enemies;
pub mod hazards;

pub use blocks::{BlockPicker, DepthCurve, MaterialProfile};
pub use builder::{BuildReport, ChunkGenerator, EnemySpawn, GeneratorConfig, NullSpawner, Spawner};
pub use enemies::{EnemyPicker, EnemyRequestCriteria, risk_budget};
pub use hazards::{MAX_STALAGMITE_SEGMENTS, plan_gas_vent, plan_stalagmite};

pub fn crate_info() -> &'static str {
    "hollowvein-gen v0.1.0"
}
