//! File-backed chunk persistence.
//!
//! Layout inside the store directory:
//! ```text
//! store.meta.json       - metadata and schema version
//! chunks/
//!   3_-2.chunk.cbor.zst - one CBOR+zstd file per chunk, named by position
//! integrity/
//!   manifest.json       - filename -> sha256 map
//! ```

use hollowvein_common::GridPoint;
use hollowvein_world::{Chunk, World};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Current chunk schema version.
const CHUNK_SCHEMA_VERSION: u32 = 1;

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed for {filename}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        filename: String,
        expected: String,
        actual: String,
    },
    #[error("schema version mismatch: store has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("no stored chunk at {0}")]
    MissingChunk(GridPoint),
}

/// Metadata stored in store.meta.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub chunk_schema_version: u32,
    pub chunk_count: u64,
}

/// Integrity manifest: every stored file and its content hash. Re-saving a
/// chunk replaces its entry, so the map never grows stale duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub files: BTreeMap<String, String>,
}

/// File-backed chunk store with schema versioning and integrity checking.
///
/// Opening fails closed: a store written under a different schema version is
/// rejected outright rather than partially migrated.
pub struct ChunkStore {
    root: PathBuf,
    meta: StoreMeta,
    manifest: IntegrityManifest,
}

impl ChunkStore {
    /// Open or create a chunk store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("chunks"))?;
        std::fs::create_dir_all(root.join("integrity"))?;

        let meta_path = root.join("store.meta.json");
        let manifest_path = root.join("integrity").join("manifest.json");

        let (meta, manifest) = if meta_path.exists() {
            let meta: StoreMeta = serde_json::from_reader(std::fs::File::open(&meta_path)?)?;
            if meta.chunk_schema_version != CHUNK_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: meta.chunk_schema_version,
                    expected_version: CHUNK_SCHEMA_VERSION,
                });
            }
            let manifest: IntegrityManifest = if manifest_path.exists() {
                serde_json::from_reader(std::fs::File::open(&manifest_path)?)?
            } else {
                IntegrityManifest::default()
            };
            (meta, manifest)
        } else {
            let meta = StoreMeta {
                chunk_schema_version: CHUNK_SCHEMA_VERSION,
                chunk_count: 0,
            };
            let manifest = IntegrityManifest::default();
            serde_json::to_writer_pretty(std::fs::File::create(&meta_path)?, &meta)?;
            serde_json::to_writer_pretty(std::fs::File::create(&manifest_path)?, &manifest)?;
            (meta, manifest)
        };

        Ok(Self {
            root,
            meta,
            manifest,
        })
    }

    /// Write one chunk, replacing any prior file for its position.
    pub fn save_chunk(&mut self, chunk: &Chunk) -> Result<(), StoreError> {
        let filename = chunk_filename(chunk.position());
        let path = self.root.join("chunks").join(&filename);

        let cbor_bytes = cbor_serialize(chunk)?;
        let compressed = zstd_compress(&cbor_bytes)?;
        let hash = sha256_hex(&compressed);

        std::fs::write(&path, &compressed)?;
        let fresh = self.manifest.files.insert(filename, hash).is_none();
        if fresh {
            self.meta.chunk_count += 1;
        }

        self.save_meta()?;
        self.save_manifest()?;
        tracing::debug!(position = %chunk.position(), bytes = compressed.len(), "chunk saved");
        Ok(())
    }

    /// Read one chunk back. The file's hash is checked against the manifest
    /// before decoding; a mismatch fails the load.
    pub fn load_chunk(&self, position: GridPoint) -> Result<Chunk, StoreError> {
        let filename = chunk_filename(position);
        let path = self.root.join("chunks").join(&filename);
        if !path.exists() {
            return Err(StoreError::MissingChunk(position));
        }
        let compressed = std::fs::read(&path)?;
        self.verify_file_hash(&filename, &compressed)?;

        let cbor_bytes = zstd_decompress(&compressed)?;
        cbor_deserialize(&cbor_bytes)
    }

    pub fn contains(&self, position: GridPoint) -> bool {
        self.manifest.files.contains_key(&chunk_filename(position))
    }

    /// Positions of every stored chunk, from the manifest.
    pub fn stored_positions(&self) -> Vec<GridPoint> {
        self.manifest
            .files
            .keys()
            .filter_map(|name| parse_chunk_filename(name))
            .collect()
    }

    /// Persist every chunk in the world. Returns how many were written.
    pub fn save_world(&mut self, world: &World) -> Result<usize, StoreError> {
        let _span = tracing::debug_span!("save_world").entered();
        let mut written = 0;
        for chunk in world.chunks().values() {
            self.save_chunk(chunk)?;
            written += 1;
        }
        tracing::debug!(written, "world saved");
        Ok(written)
    }

    /// Rebuild a world from every stored chunk. The returned world contains
    /// exactly the stored chunks; nothing is regenerated.
    pub fn load_world(&self) -> Result<World, StoreError> {
        let _span = tracing::debug_span!("load_world").entered();
        let mut world = World::new();
        for position in self.stored_positions() {
            world.insert_chunk(self.load_chunk(position)?);
        }
        tracing::debug!(chunks = world.chunk_count(), "world loaded");
        Ok(world)
    }

    /// Verify every manifest hash against the file on disk.
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        for (filename, expected) in &self.manifest.files {
            let data = std::fs::read(self.root.join("chunks").join(filename))?;
            let actual = sha256_hex(&data);
            if &actual != expected {
                return Err(StoreError::IntegrityMismatch {
                    filename: filename.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    fn verify_file_hash(&self, filename: &str, data: &[u8]) -> Result<(), StoreError> {
        let Some(expected) = self.manifest.files.get(filename) else {
            // Not in the manifest: a file written outside this store. Decode
            // it on its own merits.
            return Ok(());
        };
        let actual = sha256_hex(data);
        if &actual != expected {
            return Err(StoreError::IntegrityMismatch {
                filename: filename.to_string(),
                expected: expected.clone(),
                actual,
            });
        }
        Ok(())
    }

    fn save_meta(&self) -> Result<(), StoreError> {
        let path = self.root.join("store.meta.json");
        serde_json::to_writer_pretty(std::fs::File::create(path)?, &self.meta)?;
        Ok(())
    }

    fn save_manifest(&self) -> Result<(), StoreError> {
        let path = self.root.join("integrity").join("manifest.json");
        serde_json::to_writer_pretty(std::fs::File::create(path)?, &self.manifest)?;
        Ok(())
    }
}

fn chunk_filename(position: GridPoint) -> String {
    format!("{}_{}.chunk.cbor.zst", position.x, position.y)
}

fn parse_chunk_filename(name: &str) -> Option<GridPoint> {
    let stem = name.strip_suffix(".chunk.cbor.zst")?;
    let (x, y) = stem.split_once('_')?;
    Some(GridPoint::new(x.parse().ok()?, y.parse().ok()?))
}

fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, StoreError> {
    ciborium::from_reader(data).map_err(|e| StoreError::CborDecode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hollowvein_geom::Shape;
    use hollowvein_world::{Material, Space, SpaceKind};

    fn sample_chunk(position: GridPoint) -> Chunk {
        let mut chunk = Chunk::new(position);
        let origin = chunk.origin();
        let shape = Shape::rect(origin + GridPoint::new(2, 2), 6, 5).unwrap();
        chunk.add_space(Space::new(SpaceKind::Cavern, shape, true));
        chunk.set_block(origin + GridPoint::new(0, 0), Material::Stone);
        chunk.set_block(origin + GridPoint::new(1, 0), Material::Gold);
        chunk
    }

    #[test]
    fn open_creates_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(tmp.path().join("save")).unwrap();
        assert_eq!(store.meta().chunk_count, 0);
        assert!(store.root().join("chunks").is_dir());
        assert!(store.root().join("integrity").is_dir());
        assert!(store.root().join("store.meta.json").is_file());
    }

    #[test]
    fn saved_chunk_answers_queries_after_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::open(tmp.path().join("save")).unwrap();
        let chunk = sample_chunk(GridPoint::new(3, -2));
        store.save_chunk(&chunk).unwrap();

        let store2 = ChunkStore::open(tmp.path().join("save")).unwrap();
        let loaded = store2.load_chunk(GridPoint::new(3, -2)).unwrap();
        let origin = loaded.origin();
        assert_eq!(loaded.depth(), 32);
        assert_eq!(loaded.block_at(origin + GridPoint::new(1, 0)), Some(Material::Gold));
        let space = loaded.space_for(origin + GridPoint::new(4, 4)).unwrap();
        assert_eq!(space.kind, SpaceKind::Cavern);
        assert!(space.hazardous);
        assert!(loaded.space_for(origin + GridPoint::new(0, 0)).is_none());
    }

    #[test]
    fn missing_chunk_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(tmp.path().join("save")).unwrap();
        assert!(matches!(
            store.load_chunk(GridPoint::new(9, 9)),
            Err(StoreError::MissingChunk(_))
        ));
        assert!(!store.contains(GridPoint::new(9, 9)));
    }

    #[test]
    fn resave_replaces_without_duplicating() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::open(tmp.path().join("save")).unwrap();
        let mut chunk = sample_chunk(GridPoint::ZERO);
        store.save_chunk(&chunk).unwrap();
        chunk.set_block(GridPoint::new(5, 0), Material::Copper);
        store.save_chunk(&chunk).unwrap();

        assert_eq!(store.meta().chunk_count, 1);
        store.verify_integrity().unwrap();
        let loaded = store.load_chunk(GridPoint::ZERO).unwrap();
        assert_eq!(loaded.block_at(GridPoint::new(5, 0)), Some(Material::Copper));
    }

    #[test]
    fn corruption_fails_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("save");
        let mut store = ChunkStore::open(&path).unwrap();
        store.save_chunk(&sample_chunk(GridPoint::new(0, -1))).unwrap();

        let file = path.join("chunks").join("0_-1.chunk.cbor.zst");
        let mut data = std::fs::read(&file).unwrap();
        if let Some(byte) = data.last_mut() {
            *byte ^= 0xff;
        }
        std::fs::write(&file, &data).unwrap();

        let store2 = ChunkStore::open(&path).unwrap();
        assert!(store2.verify_integrity().is_err());
        assert!(matches!(
            store2.load_chunk(GridPoint::new(0, -1)),
            Err(StoreError::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn schema_mismatch_fails_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("save");
        ChunkStore::open(&path).unwrap();

        let meta = StoreMeta {
            chunk_schema_version: CHUNK_SCHEMA_VERSION + 1,
            chunk_count: 0,
        };
        serde_json::to_writer_pretty(
            std::fs::File::create(path.join("store.meta.json")).unwrap(),
            &meta,
        )
        .unwrap();

        assert!(matches!(
            ChunkStore::open(&path),
            Err(StoreError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn world_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::open(tmp.path().join("save")).unwrap();
        let mut world = World::new();
        for position in [GridPoint::ZERO, GridPoint::new(-1, -1), GridPoint::new(2, 0)] {
            world.insert_chunk(sample_chunk(position));
        }
        assert_eq!(store.save_world(&world).unwrap(), 3);

        let loaded = store.load_world().unwrap();
        assert_eq!(loaded.chunk_count(), 3);
        for (position, chunk) in world.chunks() {
            assert_eq!(loaded.get_chunk_at(*position), Some(chunk));
        }
    }

    #[test]
    fn filenames_round_trip_negative_positions() {
        let p = GridPoint::new(-7, -12);
        assert_eq!(parse_chunk_filename(&chunk_filename(p)), Some(p));
        assert!(parse_chunk_filename("garbage.txt").is_none());
    }
}
