use crate::blocks::BlockPicker;
use crate::enemies::{EnemyPicker, EnemyRequestCriteria, risk_budget};
use crate::hazards::{plan_gas_vent, plan_stalagmite};
use hollowvein_common::{Direction, GridPoint, Range};
use hollowvein_geom::{GeomError, Shape};
use hollowvein_world::{
    CHUNK_SIZE, Chunk, EnemyKind, Feature, FeatureKind, Material, Space, SpaceKind,
};
use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Resolves an enemy type to a live instance at a world position.
///
/// The generator decides *what* and *where*; instantiation mechanics live
/// behind this seam.
pub trait Spawner {
    fn spawn_enemy(&mut self, kind: EnemyKind, position: GridPoint);
}

/// Spawner that drops every request. Useful for headless generation.
#[derive(Debug, Default)]
pub struct NullSpawner;

impl Spawner for NullSpawner {
    fn spawn_enemy(&mut self, _kind: EnemyKind, _position: GridPoint) {}
}

/// One enemy the generator decided to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub position: GridPoint,
}

/// Tuning knobs for chunk generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// World seed; per-chunk seeds are derived from it and the position.
    pub world_seed: u64,
    /// Placement attempts per hazardous space.
    pub hazard_attempts: usize,
    /// Depth at or above which the background fill is dirt rather than stone.
    pub dirt_depth: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            world_seed: 0,
            hazard_attempts: 6,
            dirt_depth: 48,
        }
    }
}

/// Everything a completed chunk build produced: the chunk itself plus the
/// enemy placements for the spawner.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub chunk: Chunk,
    pub enemies: Vec<EnemySpawn>,
}

/// Builds fully-populated chunks from their grid position.
///
/// The build sequence is fixed: carve space geometry, fill blocks, plan
/// hazards, select enemies, place features. Placement never begins before
/// carving has finished, so every placement query sees final boundaries.
#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    config: GeneratorConfig,
    block_picker: BlockPicker,
    enemy_picker: EnemyPicker,
}

impl ChunkGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            block_picker: BlockPicker::default_table(),
            enemy_picker: EnemyPicker::full_roster(),
        }
    }

    pub fn with_pickers(
        config: GeneratorConfig,
        block_picker: BlockPicker,
        enemy_picker: EnemyPicker,
    ) -> Self {
        Self {
            config,
            block_picker,
            enemy_picker,
        }
    }

    /// Build the chunk at a grid position.
    ///
    /// Identical seeds and positions rebuild identical chunks. The only
    /// error is a malformed geometry walk, which is fatal to the build;
    /// item-level placement failures are silent omissions.
    pub fn build(&self, position: GridPoint) -> Result<BuildReport, GeomError> {
        let _span = tracing::debug_span!("chunk_build", %position).entered();
        let mut rng = ChaCha8Rng::seed_from_u64(self.chunk_seed(position));
        let mut chunk = Chunk::new(position);

        self.carve_spaces(&mut chunk, &mut rng)?;
        self.fill_blocks(&mut chunk, &mut rng);
        self.place_hazards(&mut chunk, &mut rng);
        let enemies = self.select_enemies(&chunk, &mut rng);
        self.place_features(&mut chunk, &mut rng);

        tracing::debug!(summary = %chunk.summary(), enemies = enemies.len(), "chunk built");
        Ok(BuildReport { chunk, enemies })
    }

    /// Mix the world seed with the chunk position (splitmix64 finisher).
    fn chunk_seed(&self, position: GridPoint) -> u64 {
        let x = (position.x as i64 as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        let y = (position.y as i64 as u64).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        splitmix64(self.config.world_seed ^ x ^ y)
    }

    /// Carve 1-3 polygonal spaces out of the chunk rectangle.
    fn carve_spaces(&self, chunk: &mut Chunk, rng: &mut ChaCha8Rng) -> Result<(), GeomError> {
        let bounds = chunk.bounds();
        let origin = chunk.origin();
        let depth = chunk.depth();
        let candidates = rng.gen_range(1..=3);

        for _ in 0..candidates {
            let width = rng.gen_range(6..=14);
            let height = rng.gen_range(5..=12);
            let offset = GridPoint::new(rng.gen_range(-3..=12), rng.gen_range(-3..=12));
            let candidate = Shape::rect(origin + offset, width, height)?;

            let carved = if candidate.vertices().iter().all(|&v| bounds.contains(v)) {
                // Fully interior: nothing to clip.
                candidate
            } else {
                match bounds.intersect(&candidate) {
                    Ok(shape) => shape,
                    Err(GeomError::NoOverlap) => {
                        tracing::trace!(%origin, "space candidate missed the chunk");
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            };

            let (min, max) = carved.bounds();
            let kind = space_kind_for(max.x - min.x, max.y - min.y);
            let hazardous = rng.gen_bool(hazard_chance(depth));
            chunk.add_space(Space::new(kind, carved, hazardous));
        }

        if chunk.spaces().is_empty() {
            // Every chunk carries at least one open pocket.
            let fallback = Shape::rect(origin + GridPoint::new(4, 4), 8, 8)?;
            chunk.add_space(Space::new(SpaceKind::Cavern, fallback, false));
        }
        Ok(())
    }

    /// Fill cells outside the carved spaces, then swap in picked ores.
    fn fill_blocks(&self, chunk: &mut Chunk, rng: &mut ChaCha8Rng) {
        let depth = chunk.depth();
        let origin = chunk.origin();
        let background = if depth <= self.config.dirt_depth {
            Material::Dirt
        } else {
            Material::Stone
        };

        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                let cell = origin + GridPoint::new(x, y);
                if chunk.space_index_for(cell).is_none() {
                    chunk.set_block(cell, background);
                }
            }
        }

        let filled: Vec<GridPoint> = chunk.blocks().keys().copied().collect();
        if filled.is_empty() {
            return;
        }
        for (material, count) in self.block_picker.pick(depth) {
            for _ in 0..count {
                if let Some(&cell) = filled.choose(rng) {
                    chunk.set_block(cell, material);
                }
            }
        }
    }

    fn place_hazards(&self, chunk: &mut Chunk, rng: &mut ChaCha8Rng) {
        let spaces = chunk.spaces().to_vec();
        let mut planned = Vec::new();
        for space in spaces.iter().filter(|s| s.hazardous) {
            for _ in 0..self.config.hazard_attempts {
                let (min, max) = space.shape.bounds();
                let anchor = GridPoint::new(
                    rng.gen_range(min.x..=max.x),
                    rng.gen_range(min.y..=max.y),
                );
                let hazard = if rng.gen_bool(0.7) {
                    let facing = Direction::CARDINAL[rng.gen_range(0..4)];
                    plan_stalagmite(chunk, space, anchor, facing, rng)
                } else {
                    plan_gas_vent(chunk, space, anchor, rng)
                };
                // A failed placement is simply omitted.
                if let Some(h) = hazard {
                    planned.push(h);
                }
            }
        }
        for hazard in planned {
            chunk.add_hazard(hazard);
        }
    }

    /// Choose enemy types under the chunk's risk budget and assign open
    /// cells. Selection order is preserved in the output.
    fn select_enemies(&self, chunk: &Chunk, rng: &mut ChaCha8Rng) -> Vec<EnemySpawn> {
        let remoteness = chunk.position().chebyshev(GridPoint::ZERO);
        let budget = risk_budget(chunk.depth(), remoteness, rng);
        let criteria = criteria_for_spaces(chunk);
        let kinds = self.enemy_picker.pick(budget, &criteria, rng);

        let open = open_cells(chunk);
        if open.is_empty() {
            return Vec::new();
        }
        kinds
            .into_iter()
            .filter_map(|kind| {
                open.choose(rng)
                    .map(|&position| EnemySpawn { kind, position })
            })
            .collect()
    }

    fn place_features(&self, chunk: &mut Chunk, rng: &mut ChaCha8Rng) {
        let open = open_cells(chunk);
        if open.is_empty() {
            return;
        }
        if rng.gen_bool(0.25) {
            if let Some(&position) = open.choose(rng) {
                chunk.add_feature(Feature {
                    position,
                    kind: FeatureKind::SupplyCache {
                        capacity: rng.gen_range(1..=3),
                    },
                });
                // Caches bury a relic nearby; specials bypass depth counting.
                let filled: Vec<GridPoint> = chunk.blocks().keys().copied().collect();
                if let Some(&cell) = filled.choose(rng) {
                    chunk.set_block(cell, Material::Relic);
                }
            }
        }
        if rng.gen_bool(0.1) {
            if let Some(&position) = open.choose(rng) {
                chunk.add_feature(Feature {
                    position,
                    kind: FeatureKind::Teleporter {
                        channel: rng.gen_range(0..8),
                    },
                });
            }
        }
    }
}

/// Footprint filter derived from the carved spaces: enemies taller or longer
/// than the largest space never fit.
fn criteria_for_spaces(chunk: &Chunk) -> EnemyRequestCriteria {
    let mut tallest = 1;
    let mut longest = 1;
    for space in chunk.spaces() {
        let (min, max) = space.shape.bounds();
        tallest = tallest.max(max.y - min.y);
        longest = longest.max(max.x - min.x);
    }
    EnemyRequestCriteria {
        height: Some(Range::new(1, tallest)),
        length: Some(Range::new(1, longest)),
    }
}

/// Cells inside a space with no block: valid spots for enemies and features.
fn open_cells(chunk: &Chunk) -> Vec<GridPoint> {
    let origin = chunk.origin();
    let mut cells = Vec::new();
    for x in 0..CHUNK_SIZE {
        for y in 0..CHUNK_SIZE {
            let cell = origin + GridPoint::new(x, y);
            if chunk.space_index_for(cell).is_some() && chunk.block_at(cell).is_none() {
                cells.push(cell);
            }
        }
    }
    cells
}

fn space_kind_for(width: i32, height: i32) -> SpaceKind {
    if height >= width * 2 {
        SpaceKind::Shaft
    } else if width >= height * 2 {
        SpaceKind::Corridor
    } else {
        SpaceKind::Cavern
    }
}

fn hazard_chance(depth: i32) -> f64 {
    (f64::from(depth) / 400.0).clamp(0.05, 0.6)
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hollowvein_world::HazardKind;

    fn generator(seed: u64) -> ChunkGenerator {
        ChunkGenerator::new(GeneratorConfig {
            world_seed: seed,
            ..GeneratorConfig::default()
        })
    }

    #[test]
    fn build_is_deterministic_per_seed() {
        let g = generator(42);
        let a = g.build(GridPoint::new(2, -3)).unwrap();
        let b = g.build(GridPoint::new(2, -3)).unwrap();
        assert_eq!(a.chunk, b.chunk);
        assert_eq!(a.enemies, b.enemies);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = generator(1).build(GridPoint::new(0, -2)).unwrap();
        let b = generator(2).build(GridPoint::new(0, -2)).unwrap();
        assert_ne!(a.chunk, b.chunk);
    }

    #[test]
    fn every_chunk_has_a_space() {
        let g = generator(7);
        for y in -4..=0 {
            for x in -2..=2 {
                let report = g.build(GridPoint::new(x, y)).unwrap();
                assert!(!report.chunk.spaces().is_empty());
            }
        }
    }

    #[test]
    fn blocks_never_occupy_spaces() {
        // Carving runs first, so the fill only touches cells outside spaces.
        let g = generator(9);
        let report = g.build(GridPoint::new(1, -5)).unwrap();
        for (&cell, _) in report.chunk.blocks() {
            assert!(
                report.chunk.space_index_for(cell).is_none(),
                "block at {cell} sits inside a space"
            );
        }
    }

    #[test]
    fn blocks_stay_inside_the_chunk() {
        let g = generator(3);
        let report = g.build(GridPoint::new(-2, -1)).unwrap();
        for (&cell, _) in report.chunk.blocks() {
            assert!(report.chunk.contains(cell));
        }
    }

    #[test]
    fn hazard_segments_respect_the_cap() {
        let g = generator(12);
        // Deep chunks roll hazardous spaces often; scan a few.
        for y in -12..=-6 {
            let report = g.build(GridPoint::new(0, y)).unwrap();
            for hazard in report.chunk.hazards() {
                if let HazardKind::Stalagmite { segments, .. } = hazard.kind {
                    assert!(segments >= 1);
                    assert!(segments <= crate::hazards::MAX_STALAGMITE_SEGMENTS);
                }
            }
        }
    }

    #[test]
    fn enemy_spawns_land_in_open_cells() {
        let g = generator(21);
        for y in -10..=-1 {
            let report = g.build(GridPoint::new(0, y)).unwrap();
            for spawn in &report.enemies {
                assert!(report.chunk.contains(spawn.position));
                assert!(report.chunk.space_index_for(spawn.position).is_some());
                assert!(report.chunk.block_at(spawn.position).is_none());
            }
        }
    }

    #[test]
    fn surface_chunks_spawn_little_or_nothing() {
        // Depth 0, remoteness 0: the budget is jitter-clamped near zero.
        let g = generator(5);
        let report = g.build(GridPoint::new(0, 0)).unwrap();
        assert!(report.enemies.len() <= 2);
    }
}
