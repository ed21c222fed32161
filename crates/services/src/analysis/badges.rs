use mathpace_core::model::{Badge, BadgeSet, ProblemResult};

const SUB_SECOND_MS: f64 = 1_000.0;
const CONSISTENT_MIN_RESULTS: usize = 50;
const CONSISTENT_THRESHOLD_MS: f64 = 3_000.0;
const CONSISTENT_SHARE: f64 = 0.9;

/// Applies every badge predicate to the full history.
///
/// Predicates are monotonic over an append-only history, so a badge once
/// earned stays earned even on a shrunken history (the set never unsets).
/// Returns `true` when at least one badge was newly earned, meaning the set
/// needs persisting; re-running on unchanged history returns `false`.
///
/// Only five predicates exist. `score50`, `score100`, and `weekStreak` are
/// catalog entries without an evaluator and are never awarded here.
pub fn evaluate_badges(results: &[ProblemResult], badges: &mut BadgeSet) -> bool {
    let mut changed = false;

    if results.len() >= 10 {
        changed |= badges.award(Badge::First10);
    }
    if results.len() >= 100 {
        changed |= badges.award(Badge::First100);
    }
    if results.len() >= 1000 {
        changed |= badges.award(Badge::First1000);
    }

    if results.iter().any(|r| r.time < SUB_SECOND_MS) {
        changed |= badges.award(Badge::Sub1Sec);
    }

    if results.len() >= CONSISTENT_MIN_RESULTS {
        let under = results
            .iter()
            .filter(|r| r.time < CONSISTENT_THRESHOLD_MS)
            .count();
        if under as f64 / results.len() as f64 >= CONSISTENT_SHARE {
            changed |= badges.award(Badge::Consistent);
        }
    }

    changed
}
