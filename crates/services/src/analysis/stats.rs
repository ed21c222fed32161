use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use mathpace_core::model::{Operator, ProblemExpr, ProblemResult};

/// Below this many tracked problems the dashboard shows a placeholder
/// instead of the main statistics.
pub const MIN_RESULTS_FOR_STATS: usize = 10;
/// Below this many tracked problems the multiplication analysis is withheld.
pub const MIN_RESULTS_FOR_MULT: usize = 20;

const MIN_RESULTS_FOR_TREND: usize = 20;
const MULT_OPERAND_MIN: u32 = 2;
const MULT_OPERAND_MAX: u32 = 12;

//
// ─── OPERATOR BREAKDOWN ────────────────────────────────────────────────────────
//

/// Volume and mean latency for one operator.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorStats {
    pub op: Operator,
    pub count: usize,
    pub avg_ms: f64,
}

/// Per-operator solve statistics, in dashboard listing order.
///
/// Problem texts that do not parse as `<int> <op> <int>` with a known
/// operator glyph contribute to no bucket; operators with no solves are
/// omitted entirely.
#[must_use]
pub fn operator_breakdown(results: &[ProblemResult]) -> Vec<OperatorStats> {
    let mut totals: BTreeMap<Operator, (f64, usize)> = BTreeMap::new();
    for result in results {
        if let Some(expr) = ProblemExpr::parse(&result.problem) {
            let entry = totals.entry(expr.op).or_insert((0.0, 0));
            entry.0 += result.time;
            entry.1 += 1;
        }
    }

    Operator::ALL
        .iter()
        .filter_map(|op| {
            totals.get(op).map(|(total, count)| OperatorStats {
                op: *op,
                count: *count,
                avg_ms: total / *count as f64,
            })
        })
        .collect()
}

/// The largest per-operator average, used to mark the slowest rows.
#[must_use]
pub fn slowest_average(rows: &[OperatorStats]) -> Option<f64> {
    rows.iter().map(|row| row.avg_ms).max_by(f64::total_cmp)
}

//
// ─── IMPROVEMENT TREND ─────────────────────────────────────────────────────────
//

/// Mean latency of the earlier half of the history against the later half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendStats {
    /// Signed percentage; positive means the later half was faster.
    pub change_pct: f64,
    pub before_avg_ms: f64,
    pub now_avg_ms: f64,
}

/// Compares the earlier and later halves of the history, split at the
/// midpoint. `None` until twenty results exist.
#[must_use]
pub fn improvement_trend(results: &[ProblemResult]) -> Option<TrendStats> {
    if results.len() < MIN_RESULTS_FOR_TREND {
        return None;
    }
    let mid = results.len() / 2;
    let before_avg_ms = mean(&results[..mid]);
    let now_avg_ms = mean(&results[mid..]);
    let change_pct = (before_avg_ms - now_avg_ms) / before_avg_ms * 100.0;
    Some(TrendStats {
        change_pct,
        before_avg_ms,
        now_avg_ms,
    })
}

fn mean(results: &[ProblemResult]) -> f64 {
    let total: f64 = results.iter().map(|r| r.time).sum();
    total / results.len() as f64
}

//
// ─── SPEED DISTRIBUTION ────────────────────────────────────────────────────────
//

/// Percentage share per latency band.
///
/// Each band is rounded independently, so the four values need not sum
/// to exactly 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeedBands {
    /// Under one second.
    pub lightning: u8,
    /// One to two seconds.
    pub fast: u8,
    /// Two to three seconds.
    pub medium: u8,
    /// Three seconds and up.
    pub slow: u8,
}

#[must_use]
pub fn speed_distribution(results: &[ProblemResult]) -> SpeedBands {
    if results.is_empty() {
        return SpeedBands::default();
    }

    let mut counts = [0_usize; 4];
    for result in results {
        counts[band(result.time)] += 1;
    }

    let total = results.len() as f64;
    let pct = |count: usize| (count as f64 / total * 100.0).round() as u8;
    SpeedBands {
        lightning: pct(counts[0]),
        fast: pct(counts[1]),
        medium: pct(counts[2]),
        slow: pct(counts[3]),
    }
}

fn band(time_ms: f64) -> usize {
    if time_ms < 1_000.0 {
        0
    } else if time_ms < 2_000.0 {
        1
    } else if time_ms < 3_000.0 {
        2
    } else {
        3
    }
}

//
// ─── MULTIPLICATION DIFFICULTY ─────────────────────────────────────────────────
//

/// Mean latency of multiplication problems involving one operand.
#[derive(Debug, Clone, PartialEq)]
pub struct OperandDifficulty {
    pub operand: u32,
    pub avg_ms: f64,
    pub count: usize,
}

/// Ranks multiplication operands 2 through 12 by how slowly they are solved.
///
/// Each operand of a problem is counted independently, so `6 × 6` feeds the
/// 6-bucket twice and `4 × 6` feeds both 4 and 6 with the same latency.
/// Rows are ordered hardest first; equal averages order by ascending operand.
#[must_use]
pub fn multiplication_difficulty(results: &[ProblemResult]) -> Vec<OperandDifficulty> {
    let mut totals: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for result in results {
        let Some(expr) = ProblemExpr::parse(&result.problem) else {
            continue;
        };
        if expr.op != Operator::Mul {
            continue;
        }
        for operand in expr.operands() {
            if (MULT_OPERAND_MIN..=MULT_OPERAND_MAX).contains(&operand) {
                let entry = totals.entry(operand).or_insert((0.0, 0));
                entry.0 += result.time;
                entry.1 += 1;
            }
        }
    }

    let mut rows: Vec<OperandDifficulty> = totals
        .into_iter()
        .map(|(operand, (total, count))| OperandDifficulty {
            operand,
            avg_ms: total / count as f64,
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.avg_ms.total_cmp(&a.avg_ms).then(a.operand.cmp(&b.operand)));
    rows
}

//
// ─── COMBINED STATISTICS + CACHE ───────────────────────────────────────────────
//

/// Everything the dashboard derives from the raw solve history.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub operators: Vec<OperatorStats>,
    pub trend: Option<TrendStats>,
    pub speed: SpeedBands,
    pub multiplication: Vec<OperandDifficulty>,
}

#[must_use]
pub fn compute_stats(results: &[ProblemResult]) -> DashboardStats {
    DashboardStats {
        total: results.len(),
        operators: operator_breakdown(results),
        trend: improvement_trend(results),
        speed: speed_distribution(results),
        multiplication: multiplication_difficulty(results),
    }
}

/// Memoizes [`compute_stats`] across dashboard loads.
///
/// The history is append-only and a clear empties it, so `(length, last
/// timestamp)` is a sufficient fingerprint: anything that changes the data
/// changes the fingerprint.
#[derive(Debug, Default)]
pub struct StatsCache {
    fingerprint: Option<(usize, Option<DateTime<Utc>>)>,
    stats: Option<DashboardStats>,
    computations: u64,
}

impl StatsCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Times the statistics were actually recomputed.
    #[must_use]
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Statistics for `results`, recomputed only when the history changed.
    pub fn stats_for(&mut self, results: &[ProblemResult]) -> &DashboardStats {
        let fingerprint = (results.len(), results.last().map(|r| r.timestamp));
        if self.fingerprint != Some(fingerprint) || self.stats.is_none() {
            self.stats = Some(compute_stats(results));
            self.fingerprint = Some(fingerprint);
            self.computations += 1;
        }
        self.stats.get_or_insert_with(|| compute_stats(results))
    }
}
