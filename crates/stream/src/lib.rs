//! Streaming: budgeted chunk activation, position tracking, timed tasks.
//!
//! # Invariants
//! - A chunk is registered with the world only after its build completed;
//!   readers never observe a partially built chunk.
//! - The pipeline executes at most its configured command budget per tick.
//! - The position tracker samples on a fixed cadence and does no work while
//!   nothing is tracked.
//! - Cancelling queued chunk work has no side effects on the world.

mod pipeline;
mod scheduler;
mod tracker;

pub use pipeline::{
    ChunkCommand, ChunkPipeline, CommandKind, PipelineConfig, PipelineError, PipelineStats,
};
pub use scheduler::TaskQueue;
pub use tracker::{PositionData, PositionTracker, TRACK_INTERVAL, TrackError};

pub fn crate_info() -> &'static str {
    "hollowvein-stream v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("stream"));
    }
}
