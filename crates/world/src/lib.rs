//! World model: chunks, spaces, blocks, features, hazards.
//!
//! # Invariants
//! - The chunk registry is keyed by chunk-grid position; re-registering a
//!   position replaces, never duplicates.
//! - Chunks use BTreeMap block storage for deterministic iteration order.
//! - Point-to-chunk mapping is pure floor-division arithmetic and works for
//!   ungenerated positions.

pub mod chunk;
pub mod content;
pub mod world;

pub use chunk::{CHUNK_SIZE, Chunk, ChunkSummary, Space, chunk_position_of};
pub use content::{
    EnemyKind, EnemyRequirements, Feature, FeatureKind, Hazard, HazardKind, Material, SpaceKind,
};
pub use world::World;

pub fn crate_info() -> &'static str {
    "hollowvein-world v0.1.0"
}
