use hollowvein_common::Range;
use hollowvein_world::{EnemyKind, EnemyRequirements};
use rand::Rng;
use rand::seq::SliceRandom;

/// Request-side filter on enemy footprints. `None` means unconstrained.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyRequestCriteria {
    pub height: Option<Range>,
    pub length: Option<Range>,
}

impl EnemyRequestCriteria {
    /// Accept anything.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, requirements: &EnemyRequirements) -> bool {
        self.height.is_none_or(|r| r.contains(requirements.height))
            && self.length.is_none_or(|r| r.contains(requirements.length))
    }
}

/// Budgeted weighted-random enemy selection.
#[derive(Debug, Clone)]
pub struct EnemyPicker {
    roster: Vec<EnemyKind>,
}

impl EnemyPicker {
    pub fn new(roster: Vec<EnemyKind>) -> Self {
        Self { roster }
    }

    pub fn full_roster() -> Self {
        Self::new(EnemyKind::ALL.to_vec())
    }

    /// Select enemy types under a risk-point budget.
    ///
    /// Each round the affordable candidates are reshuffled (every affordable
    /// type gets an equal chance of being tried first) and scanned for the
    /// first one satisfying the criteria. When no affordable candidate
    /// matches, the remaining budget is abandoned, not partially spent.
    /// Output order is selection order.
    pub fn pick<R: Rng>(
        &self,
        budget: i32,
        criteria: &EnemyRequestCriteria,
        rng: &mut R,
    ) -> Vec<EnemyKind> {
        let mut chosen = Vec::new();
        let mut remaining = budget;
        while remaining > 0 {
            let mut affordable: Vec<EnemyKind> = self
                .roster
                .iter()
                .copied()
                .filter(|k| k.requirements().cost as i32 <= remaining)
                .collect();
            if affordable.is_empty() {
                break;
            }
            affordable.shuffle(rng);
            let Some(kind) = affordable
                .into_iter()
                .find(|k| criteria.matches(&k.requirements()))
            else {
                break;
            };
            remaining -= kind.requirements().cost as i32;
            chosen.push(kind);
        }
        chosen
    }
}

impl Default for EnemyPicker {
    fn default() -> Self {
        Self::full_roster()
    }
}

/// Jitter applied on top of the depth/remoteness base.
const RISK_JITTER: i32 = 2;
/// Depth cells per risk point.
const RISK_DEPTH_DIVISOR: i32 = 16;
/// Risk points per ring of remoteness.
const RISK_REMOTENESS_WEIGHT: i32 = 2;

/// Risk-point budget for a chunk: depth-derived base plus a remoteness
/// bonus and a small random jitter, clamped at zero.
pub fn risk_budget<R: Rng>(depth: i32, remoteness: i32, rng: &mut R) -> i32 {
    let base = depth / RISK_DEPTH_DIVISOR + remoteness * RISK_REMOTENESS_WEIGHT;
    (base + rng.gen_range(-RISK_JITTER..=RISK_JITTER)).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn spent(picks: &[EnemyKind]) -> i32 {
        picks.iter().map(|k| k.requirements().cost as i32).sum()
    }

    #[test]
    fn zero_or_negative_budget_yields_empty() {
        let picker = EnemyPicker::full_roster();
        assert!(picker.pick(0, &EnemyRequestCriteria::any(), &mut rng()).is_empty());
        assert!(picker.pick(-5, &EnemyRequestCriteria::any(), &mut rng()).is_empty());
    }

    #[test]
    fn never_exceeds_budget() {
        let picker = EnemyPicker::full_roster();
        let mut r = rng();
        for budget in [1, 3, 7, 12, 25] {
            let picks = picker.pick(budget, &EnemyRequestCriteria::any(), &mut r);
            assert!(spent(&picks) <= budget, "budget {budget} overspent");
        }
    }

    #[test]
    fn exact_cost_match_spends_budget_fully() {
        // Budget 3, only candidate costs 3: exactly one pick, then stop.
        let picker = EnemyPicker::new(vec![EnemyKind::Spitter]);
        let picks = picker.pick(3, &EnemyRequestCriteria::any(), &mut rng());
        assert_eq!(picks, vec![EnemyKind::Spitter]);
    }

    #[test]
    fn budget_one_only_affords_bats() {
        let picker = EnemyPicker::full_roster();
        let picks = picker.pick(1, &EnemyRequestCriteria::any(), &mut rng());
        assert_eq!(picks, vec![EnemyKind::Bat]);
    }

    #[test]
    fn criteria_filter_blocks_unaffordable_fits() {
        // Tall filter excludes everything but Brute (height 3); with budget
        // below Brute's cost the whole budget is abandoned.
        let picker = EnemyPicker::full_roster();
        let tall_only = EnemyRequestCriteria {
            height: Some(Range::new(3, 10)),
            length: None,
        };
        let picks = picker.pick(5, &tall_only, &mut rng());
        assert!(picks.is_empty());
    }

    #[test]
    fn criteria_filter_selects_matching_kinds_only() {
        let picker = EnemyPicker::full_roster();
        let short_only = EnemyRequestCriteria {
            height: Some(Range::new(1, 1)),
            length: None,
        };
        let picks = picker.pick(20, &short_only, &mut rng());
        assert!(!picks.is_empty());
        for kind in picks {
            assert_eq!(kind.requirements().height, 1);
        }
    }

    #[test]
    fn risk_budget_clamps_at_zero() {
        let mut r = rng();
        for _ in 0..50 {
            assert!(risk_budget(0, 0, &mut r) >= 0);
            assert!(risk_budget(-200, 0, &mut r) >= 0);
        }
    }

    #[test]
    fn risk_budget_grows_with_depth_and_remoteness() {
        let mut r = rng();
        let shallow = risk_budget(16, 0, &mut r);
        let deep = risk_budget(320, 5, &mut r);
        assert!(deep > shallow);
    }
}
