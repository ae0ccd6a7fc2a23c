//! Geometry engine: polygons over grid points.
//!
//! # Invariants
//! - A `Shape` always closes (last vertex connects back to the first) and
//!   caches its bounding corners.
//! - Containment is on-or-right-of every directed edge; boundary points
//!   count as contained.
//! - The clipping walk is deterministic (first matching segment in declared
//!   order wins) and bounded; it never spins on malformed rings.

mod segment;
mod shape;

pub use segment::Segment;
pub use shape::Shape;

/// Errors from shape construction and clipping.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeomError {
    #[error("a shape needs at least 2 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("shapes do not overlap")]
    NoOverlap,
    #[error("clipping walk failed to close after {0} steps")]
    WalkDiverged(usize),
}

pub fn crate_info() -> &'static str {
    "hollowvein-geom v0.1.0"
}
