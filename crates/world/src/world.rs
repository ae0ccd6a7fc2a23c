use crate::chunk::{Chunk, chunk_position_of};
use hollowvein_common::{Direction, GridPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Process-wide chunk registry.
///
/// Maps chunk-grid position to the generated chunk. Only the activation
/// pipeline mutates the registry; everything else performs lookups. Uses a
/// BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    chunks: BTreeMap<GridPoint, Chunk>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunk at a grid position; absence means "not generated", not an error.
    pub fn get_chunk_at(&self, position: GridPoint) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    pub fn get_chunk_at_mut(&mut self, position: GridPoint) -> Option<&mut Chunk> {
        self.chunks.get_mut(&position)
    }

    pub fn is_generated(&self, position: GridPoint) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Chunk owning a world-grid point, if generated.
    pub fn chunk_containing(&self, point: GridPoint) -> Option<&Chunk> {
        self.chunks.get(&chunk_position_of(point))
    }

    /// Neighbor chunk position in a cardinal direction. Pure arithmetic.
    pub fn neighbor_position(position: GridPoint, direction: Direction) -> GridPoint {
        position + direction.offset()
    }

    /// Register a chunk. Replaces any chunk already at that position and
    /// returns it, so re-registration never duplicates.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> Option<Chunk> {
        let position = chunk.position();
        let replaced = self.chunks.insert(position, chunk);
        tracing::debug!(%position, replaced = replaced.is_some(), "chunk registered");
        replaced
    }

    /// Unregister a chunk. Returns it if it was present.
    pub fn remove_chunk(&mut self, position: GridPoint) -> Option<Chunk> {
        let removed = self.chunks.remove(&position);
        if removed.is_some() {
            tracing::debug!(%position, "chunk retired");
        }
        removed
    }

    /// Drop every chunk (new-game teardown).
    pub fn clear(&mut self) {
        self.chunks.clear();
        tracing::debug!("world cleared");
    }

    pub fn chunks(&self) -> &BTreeMap<GridPoint, Chunk> {
        &self.chunks
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.chunks.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_world_has_no_chunks() {
        let world = World::new();
        assert_eq!(world.chunk_count(), 0);
        assert!(world.get_chunk_at(GridPoint::ZERO).is_none());
    }

    #[test]
    fn insert_and_lookup() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(GridPoint::new(2, -1)));
        assert!(world.is_generated(GridPoint::new(2, -1)));
        assert!(world.get_chunk_at(GridPoint::new(2, -1)).is_some());
        assert!(world.get_chunk_at(GridPoint::new(2, 0)).is_none());
    }

    #[test]
    fn reinsert_replaces_not_duplicates() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(GridPoint::ZERO));
        let replaced = world.insert_chunk(Chunk::new(GridPoint::ZERO));
        assert!(replaced.is_some());
        assert_eq!(world.chunk_count(), 1);
    }

    #[test]
    fn neighbor_positions_are_cardinal() {
        let p = GridPoint::new(3, -2);
        assert_eq!(
            World::neighbor_position(p, Direction::North),
            GridPoint::new(3, -1)
        );
        assert_eq!(
            World::neighbor_position(p, Direction::West),
            GridPoint::new(2, -2)
        );
    }

    #[test]
    fn chunk_containing_maps_points() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(GridPoint::new(0, -1)));
        // Point in chunk (0,-1): world cells y in [-16, -1].
        let chunk = world.chunk_containing(GridPoint::new(5, -3)).unwrap();
        assert_eq!(chunk.position(), GridPoint::new(0, -1));
        assert!(world.chunk_containing(GridPoint::new(50, 50)).is_none());
    }

    #[test]
    fn clear_empties_registry() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(GridPoint::ZERO));
        world.insert_chunk(Chunk::new(GridPoint::new(1, 0)));
        world.clear();
        assert_eq!(world.chunk_count(), 0);
    }

    #[test]
    fn remove_returns_chunk() {
        let mut world = World::new();
        world.insert_chunk(Chunk::new(GridPoint::ZERO));
        assert!(world.remove_chunk(GridPoint::ZERO).is_some());
        assert!(world.remove_chunk(GridPoint::ZERO).is_none());
    }
}
