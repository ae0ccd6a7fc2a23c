//! Persistence: per-chunk CBOR+zstd files with integrity hashes.
//!
//! # Invariants
//! - A store written under a different schema version is rejected on open.
//! - Loading a chunk whose file hash disagrees with the manifest fails;
//!   corrupted data never reaches the world registry.
//! - Re-saving a chunk replaces its file and manifest entry.

mod store;

pub use store::{ChunkStore, IntegrityManifest, StoreError, StoreMeta};

pub fn crate_info() -> &'static str {
    "hollowvein-persist v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("persist"));
    }
}
