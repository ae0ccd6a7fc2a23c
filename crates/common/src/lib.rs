//! Shared primitives: integer grid coordinates, cardinal directions,
//! closed integer ranges, trackable ids.
//!
//! # Invariants
//! - `GridPoint` ordering is lexicographic by x then y, everywhere.
//! - `Range` is a closed interval; construction requires `min <= max`.

pub mod types;

pub use types::{Direction, GridPoint, Range, TrackableId};

pub fn crate_info() -> &'static str {
    "hollowvein-common v0.1.0"
}
