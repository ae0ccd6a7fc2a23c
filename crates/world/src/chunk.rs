use crate::content::{Feature, Hazard, Material, SpaceKind};
use hollowvein_common::GridPoint;
use hollowvein_geom::Shape;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Side length of a chunk in grid cells.
pub const CHUNK_SIZE: i32 = 16;

/// Depth of the surface reference line. Depth grows downward from here.
pub const SURFACE_DEPTH: i32 = 0;

/// Map a world-grid point to the position of the chunk that owns it.
///
/// Pure arithmetic; valid for ungenerated chunks too.
pub fn chunk_position_of(point: GridPoint) -> GridPoint {
    GridPoint::new(point.x.div_euclid(CHUNK_SIZE), point.y.div_euclid(CHUNK_SIZE))
}

/// A polygonal sub-region of a chunk with semantic meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub kind: SpaceKind,
    pub shape: Shape,
    pub hazardous: bool,
}

impl Space {
    pub fn new(kind: SpaceKind, shape: Shape, hazardous: bool) -> Self {
        Self {
            kind,
            shape,
            hazardous,
        }
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        self.shape.contains(point)
    }
}

/// A fixed-size rectangular tile of the world.
///
/// Keyed by its chunk-grid position; owns spaces, blocks, features, and
/// hazards placed within its bounds. Blocks are stored in a BTreeMap keyed
/// by world-grid position for deterministic iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    position: GridPoint,
    spaces: Vec<Space>,
    blocks: BTreeMap<GridPoint, Material>,
    features: Vec<Feature>,
    hazards: Vec<Hazard>,
}

impl Chunk {
    pub fn new(position: GridPoint) -> Self {
        Self {
            position,
            spaces: Vec::new(),
            blocks: BTreeMap::new(),
            features: Vec::new(),
            hazards: Vec::new(),
        }
    }

    /// Chunk-grid position (not world cells).
    pub fn position(&self) -> GridPoint {
        self.position
    }

    /// World-grid coordinate of this chunk's lower-left cell.
    pub fn origin(&self) -> GridPoint {
        self.position * CHUNK_SIZE
    }

    /// Depth of this chunk below the surface reference. Deeper chunks have
    /// larger depth values.
    pub fn depth(&self) -> i32 {
        SURFACE_DEPTH - self.position.y * CHUNK_SIZE
    }

    /// Rectangular outline of this chunk as a Shape, for carving.
    pub fn bounds(&self) -> Shape {
        // Chunk corners are always distinct, so construction cannot fail.
        Shape::rect(self.origin(), CHUNK_SIZE, CHUNK_SIZE)
            .unwrap_or_else(|_| unreachable!("chunk rect is non-degenerate"))
    }

    /// Whether a world-grid point falls inside this chunk (half-open cell
    /// coverage, so neighboring chunks never share a cell).
    pub fn contains(&self, point: GridPoint) -> bool {
        let o = self.origin();
        point.x >= o.x && point.x < o.x + CHUNK_SIZE && point.y >= o.y && point.y < o.y + CHUNK_SIZE
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn add_space(&mut self, space: Space) {
        self.spaces.push(space);
    }

    /// First space containing the point, in carve order.
    pub fn space_for(&self, point: GridPoint) -> Option<&Space> {
        self.spaces.iter().find(|s| s.contains(point))
    }

    /// Index of the first space containing the point; stable identity for
    /// position tracking.
    pub fn space_index_for(&self, point: GridPoint) -> Option<usize> {
        self.spaces.iter().position(|s| s.contains(point))
    }

    pub fn block_at(&self, point: GridPoint) -> Option<Material> {
        self.blocks.get(&point).copied()
    }

    /// Place a block. Returns false (and places nothing) outside the chunk.
    pub fn set_block(&mut self, point: GridPoint, material: Material) -> bool {
        if !self.contains(point) {
            return false;
        }
        self.blocks.insert(point, material);
        true
    }

    pub fn clear_block(&mut self, point: GridPoint) -> Option<Material> {
        self.blocks.remove(&point)
    }

    pub fn blocks(&self) -> &BTreeMap<GridPoint, Material> {
        &self.blocks
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn add_hazard(&mut self, hazard: Hazard) {
        self.hazards.push(hazard);
    }

    pub fn summary(&self) -> ChunkSummary {
        ChunkSummary {
            position: self.position,
            depth: self.depth(),
            spaces: self.spaces.len(),
            blocks: self.blocks.len(),
            features: self.features.len(),
            hazards: self.hazards.len(),
        }
    }
}

/// Condensed chunk description for logs and inspection.
#[derive(Debug, Clone)]
pub struct ChunkSummary {
    pub position: GridPoint,
    pub depth: i32,
    pub spaces: usize,
    pub blocks: usize,
    pub features: usize,
    pub hazards: usize,
}

impl fmt::Display for ChunkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk {} depth={} spaces={} blocks={} features={} hazards={}",
            self.position, self.depth, self.spaces, self.blocks, self.features, self.hazards
        )
    }
}
