use std::collections::BTreeMap;

use chrono::NaiveDate;

use mathpace_core::model::{DailyBestMap, ProblemResult};
use mathpace_core::time::millis_between;

/// Solves closer together than this belong to the same practice run, in ms.
pub const SESSION_GAP_MS: f64 = 150_000.0;

/// Infers the best run length per UTC calendar day from the solve history.
///
/// Within each day, solves are sorted by timestamp and split into runs
/// wherever consecutive timestamps are at least [`SESSION_GAP_MS`] apart.
/// A day's best is its longest run, not its total volume.
#[must_use]
pub fn infer_daily_bests(results: &[ProblemResult]) -> BTreeMap<NaiveDate, u32> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&ProblemResult>> = BTreeMap::new();
    for result in results {
        by_day
            .entry(result.timestamp.date_naive())
            .or_default()
            .push(result);
    }

    let mut bests = BTreeMap::new();
    for (day, mut day_results) in by_day {
        day_results.sort_by_key(|r| r.timestamp);

        let mut best: u32 = 0;
        let mut run: u32 = 0;
        let mut previous: Option<&ProblemResult> = None;
        for result in day_results {
            let same_run = previous.is_none_or(|prev| {
                millis_between(prev.timestamp, result.timestamp) < SESSION_GAP_MS
            });
            if same_run {
                run += 1;
            } else {
                best = best.max(run);
                run = 1;
            }
            previous = Some(result);
        }
        best = best.max(run);
        if best > 0 {
            bests.insert(day, best);
        }
    }
    bests
}

/// Folds inferred day bests into the stored map.
///
/// Returns `true` when any day improved, meaning the map needs persisting.
pub fn merge_daily_bests(stored: &mut DailyBestMap, inferred: &BTreeMap<NaiveDate, u32>) -> bool {
    let mut changed = false;
    for (day, best) in inferred {
        changed |= stored.merge_best(*day, *best);
    }
    changed
}
