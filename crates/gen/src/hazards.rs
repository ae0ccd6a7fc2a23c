use hollowvein_common::{Direction, GridPoint};
use hollowvein_world::{Chunk, Hazard, HazardKind, Space};
use rand::Rng;

/// Hard cap on stalagmite extension.
pub const MAX_STALAGMITE_SEGMENTS: u32 = 4;

/// Largest gas vent cloud radius.
pub const MAX_GAS_VENT_RADIUS: u32 = 2;

/// Plan a stalagmite-style hazard growing from `anchor` along `facing`.
///
/// Placement requires structural support: the block behind the anchor must
/// exist. Extension walks cell by cell along the facing direction and stops
/// at the first cell outside the space, outside the chunk, or occupied by a
/// block, or at the hard cap. The final segment count is uniform in
/// `[1, max]`. Returns `None` when no valid extension exists; the caller
/// simply omits the hazard.
pub fn plan_stalagmite<R: Rng>(
    chunk: &Chunk,
    space: &Space,
    anchor: GridPoint,
    facing: Direction,
    rng: &mut R,
) -> Option<Hazard> {
    let support = anchor - facing.offset();
    chunk.block_at(support)?;

    let mut max_segments = 0u32;
    let mut cell = anchor;
    while max_segments < MAX_STALAGMITE_SEGMENTS {
        if !chunk.contains(cell) || !space.contains(cell) || chunk.block_at(cell).is_some() {
            break;
        }
        max_segments += 1;
        cell = cell + facing.offset();
    }
    if max_segments == 0 {
        return None;
    }

    let segments = rng.gen_range(1..=max_segments);
    Some(Hazard {
        position: anchor,
        kind: HazardKind::Stalagmite { facing, segments },
    })
}

/// Plan a gas vent at an open floor cell of a hazardous space.
///
/// The anchor must be an unoccupied cell inside the space and the chunk,
/// resting on a block below.
pub fn plan_gas_vent<R: Rng>(
    chunk: &Chunk,
    space: &Space,
    anchor: GridPoint,
    rng: &mut R,
) -> Option<Hazard> {
    if !space.hazardous {
        return None;
    }
    if !chunk.contains(anchor) || !space.contains(anchor) || chunk.block_at(anchor).is_some() {
        return None;
    }
    let below = anchor + Direction::South.offset();
    chunk.block_at(below)?;

    let radius = rng.gen_range(1..=MAX_GAS_VENT_RADIUS);
    Some(Hazard {
        position: anchor,
        kind: HazardKind::GasVent { radius },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hollowvein_geom::Shape;
    use hollowvein_world::{Material, SpaceKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    /// Chunk (0,0) with a 10x10 cavern space and a floor of stone at y=0.
    fn chunk_with_floor(hazardous: bool) -> (Chunk, Space) {
        let mut chunk = Chunk::new(GridPoint::ZERO);
        let shape = Shape::rect(GridPoint::new(0, 0), 10, 10).unwrap();
        let space = Space::new(SpaceKind::Cavern, shape, hazardous);
        chunk.add_space(space.clone());
        for x in 0..10 {
            chunk.set_block(GridPoint::new(x, 0), Material::Stone);
        }
        (chunk, space)
    }

    #[test]
    fn stalagmite_needs_support_behind_anchor() {
        let (chunk, space) = chunk_with_floor(true);
        // Anchor at y=1 grows north; support at y=0 exists.
        let hazard = plan_stalagmite(&chunk, &space, GridPoint::new(4, 1), Direction::North, &mut rng());
        assert!(hazard.is_some());
        // Anchor at y=5 has no block at y=4 behind it.
        let unsupported =
            plan_stalagmite(&chunk, &space, GridPoint::new(4, 5), Direction::North, &mut rng());
        assert!(unsupported.is_none());
    }

    #[test]
    fn stalagmite_segments_within_bounds() {
        let (chunk, space) = chunk_with_floor(true);
        let mut r = rng();
        for _ in 0..40 {
            let hazard =
                plan_stalagmite(&chunk, &space, GridPoint::new(4, 1), Direction::North, &mut r)
                    .unwrap();
            match hazard.kind {
                HazardKind::Stalagmite { segments, .. } => {
                    assert!(segments >= 1);
                    assert!(segments <= MAX_STALAGMITE_SEGMENTS);
                }
                other => panic!("unexpected hazard {other:?}"),
            }
        }
    }

    #[test]
    fn stalagmite_extension_stops_at_blocks() {
        let (mut chunk, space) = chunk_with_floor(true);
        // Ceiling block two cells above the anchor limits growth to 2.
        chunk.set_block(GridPoint::new(4, 3), Material::Stone);
        let mut r = rng();
        for _ in 0..40 {
            let hazard =
                plan_stalagmite(&chunk, &space, GridPoint::new(4, 1), Direction::North, &mut r)
                    .unwrap();
            match hazard.kind {
                HazardKind::Stalagmite { segments, .. } => assert!(segments <= 2),
                other => panic!("unexpected hazard {other:?}"),
            }
        }
    }

    #[test]
    fn stalagmite_rejected_when_anchor_occupied() {
        let (mut chunk, space) = chunk_with_floor(true);
        chunk.set_block(GridPoint::new(4, 1), Material::Dirt);
        let hazard =
            plan_stalagmite(&chunk, &space, GridPoint::new(4, 1), Direction::North, &mut rng());
        assert!(hazard.is_none());
    }

    #[test]
    fn stalagmite_extension_stops_at_space_edge() {
        let (chunk, space) = chunk_with_floor(true);
        // Anchor near the space ceiling (space spans y<=10).
        let mut r = rng();
        let hazard =
            plan_stalagmite(&chunk, &space, GridPoint::new(9, 9), Direction::East, &mut r);
        // Support at (8,9) is missing, so this anchor is rejected outright.
        assert!(hazard.is_none());
    }

    #[test]
    fn gas_vent_only_in_hazardous_spaces() {
        let (chunk, safe_space) = chunk_with_floor(false);
        assert!(plan_gas_vent(&chunk, &safe_space, GridPoint::new(3, 1), &mut rng()).is_none());

        let (chunk, hazardous_space) = chunk_with_floor(true);
        let vent = plan_gas_vent(&chunk, &hazardous_space, GridPoint::new(3, 1), &mut rng());
        match vent {
            Some(Hazard {
                kind: HazardKind::GasVent { radius },
                ..
            }) => assert!(radius >= 1 && radius <= MAX_GAS_VENT_RADIUS),
            other => panic!("expected a gas vent, got {other:?}"),
        }
    }

    #[test]
    fn gas_vent_needs_floor_below() {
        let (chunk, space) = chunk_with_floor(true);
        // (3,5) floats in the open.
        assert!(plan_gas_vent(&chunk, &space, GridPoint::new(3, 5), &mut rng()).is_none());
    }
}
