use hollowvein_common::Range;
use hollowvein_world::Material;
use std::collections::BTreeMap;

/// How a material's raw count responds to depth inside its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthCurve {
    /// `band.max - depth`: plentiful at the shallow end of the band,
    /// tapering toward its limit.
    Rising,
    /// `band.size - distance_from_center(depth)`: peaks at the band center.
    Bell,
    /// Excluded from depth counting entirely (placed by features only).
    Special,
}

/// Per-material eligibility band and count curve.
#[derive(Debug, Clone)]
pub struct MaterialProfile {
    pub material: Material,
    pub band: Option<Range>,
    pub curve: DepthCurve,
}

/// Depth-banded block distribution.
///
/// `pick` is pure and deterministic for a fixed depth and fixed tables;
/// callers randomize only *where* the counted blocks land.
#[derive(Debug, Clone)]
pub struct BlockPicker {
    profiles: Vec<MaterialProfile>,
    scarcity: BTreeMap<Material, f64>,
}

impl BlockPicker {
    /// Build a picker from a profile table and scarcity multipliers.
    ///
    /// Table rules are enforced up front: every counted curve needs a band,
    /// a bell curve needs a bounded band, and scarcity lives in (0, 1].
    pub fn new(profiles: Vec<MaterialProfile>, scarcity: BTreeMap<Material, f64>) -> Self {
        for profile in &profiles {
            match profile.curve {
                DepthCurve::Special => {}
                DepthCurve::Rising => {
                    assert!(
                        profile.band.is_some(),
                        "rising profile for {:?} needs a depth band",
                        profile.material
                    );
                }
                DepthCurve::Bell => {
                    let band = profile
                        .band
                        .unwrap_or_else(|| panic!("bell profile for {:?} needs a depth band", profile.material));
                    assert!(
                        band.min != i32::MIN,
                        "bell profile for {:?} needs a bounded band",
                        profile.material
                    );
                }
            }
        }
        for (material, multiplier) in &scarcity {
            assert!(
                *multiplier > 0.0 && *multiplier <= 1.0,
                "scarcity for {material:?} must be in (0, 1]"
            );
        }
        Self { profiles, scarcity }
    }

    /// The stock band layout used by chunk generation.
    pub fn default_table() -> Self {
        let profiles = vec![
            MaterialProfile {
                material: Material::Dirt,
                band: Some(Range::new(0, 48)),
                curve: DepthCurve::Rising,
            },
            MaterialProfile {
                material: Material::Stone,
                band: Some(Range::up_to(100)),
                curve: DepthCurve::Rising,
            },
            MaterialProfile {
                material: Material::Copper,
                band: Some(Range::new(16, 96)),
                curve: DepthCurve::Bell,
            },
            MaterialProfile {
                material: Material::Silver,
                band: Some(Range::new(64, 160)),
                curve: DepthCurve::Bell,
            },
            MaterialProfile {
                material: Material::Gold,
                band: Some(Range::new(112, 240)),
                curve: DepthCurve::Bell,
            },
            MaterialProfile {
                material: Material::Platinum,
                band: Some(Range::new(192, 352)),
                curve: DepthCurve::Bell,
            },
            MaterialProfile {
                material: Material::Relic,
                band: None,
                curve: DepthCurve::Special,
            },
        ];
        let scarcity = BTreeMap::from([
            (Material::Copper, 0.8),
            (Material::Silver, 0.6),
            (Material::Gold, 0.35),
            (Material::Platinum, 0.2),
        ]);
        Self::new(profiles, scarcity)
    }

    /// Material -> count to place at the given depth. Deterministic.
    pub fn pick(&self, depth: i32) -> BTreeMap<Material, u32> {
        let mut counts = BTreeMap::new();
        for profile in &self.profiles {
            let band = match (profile.curve, profile.band) {
                (DepthCurve::Special, _) => continue,
                (_, Some(band)) => band,
                // Rejected by the constructor; a counted curve always has a band.
                (_, None) => continue,
            };
            if !band.contains(depth) {
                continue;
            }
            // Saturating arithmetic: unbounded-below bands admit depths near
            // i32::MIN, where plain subtraction overflows.
            let raw = match profile.curve {
                DepthCurve::Rising => band.max.saturating_sub(depth),
                DepthCurve::Bell => band.size().saturating_sub(band.distance_from_center(depth)),
                DepthCurve::Special => continue,
            };
            if raw <= 0 {
                continue;
            }
            let multiplier = self
                .scarcity
                .get(&profile.material)
                .copied()
                .unwrap_or(1.0);
            let count = (f64::from(raw) * multiplier).floor() as u32;
            if count > 0 {
                counts.insert(profile.material, count);
            }
        }
        counts
    }
}

impl Default for BlockPicker {
    fn default() -> Self {
        Self::default_table()
    }
}
