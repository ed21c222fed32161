use chrono::Duration;

use mathpace_core::model::{ProblemResult, SessionRecord};
use mathpace_core::time::{fixed_clock, fixed_now};
use services::{AnalysisService, DifficultyTier};
use storage::TrackerStore;

/// Two same-day practice runs separated by a long break, 24 solves total.
fn plausible_history() -> Vec<ProblemResult> {
    let start = fixed_now();
    let mut results = Vec::new();

    // first run: 14 steady solves, multiplication-heavy
    for i in 0..14_i64 {
        let problem = if i % 2 == 0 { "6 × 7" } else { "8 + 5" };
        let at = start + Duration::milliseconds(i * 4_000);
        results.push(ProblemResult::new(problem, 2_200.0, at).unwrap());
    }

    // second run after a 200s break: faster, one sub-second solve
    let second_start = start + Duration::milliseconds(13 * 4_000 + 200_000);
    for i in 0..10_i64 {
        let (problem, time) = match i {
            0 => ("9 × 9", 900.0),
            i if i % 2 == 0 => ("9 − 3", 1_100.0),
            _ => ("12 ÷ 4", 1_100.0),
        };
        let at = second_start + Duration::milliseconds(i * 3_000);
        results.push(ProblemResult::new(problem, time, at).unwrap());
    }

    results
}

#[tokio::test]
async fn dashboard_reflects_a_seeded_history() {
    let store = TrackerStore::in_memory();
    store.replace_results(&plausible_history()).await.unwrap();
    store
        .append_record(SessionRecord::new(47, fixed_now()))
        .await
        .unwrap();
    store
        .append_record(SessionRecord::new(52, fixed_now() + Duration::days(1)))
        .await
        .unwrap();

    let mut service = AnalysisService::new(store).with_clock(fixed_clock());
    let view = service.load_dashboard(0).await.unwrap();

    assert_eq!(view.total_tracked, 24);

    let stats = view.stats.expect("enough history for statistics");
    let labels: Vec<&str> = stats.operators.iter().map(|row| row.label).collect();
    assert_eq!(labels, vec!["Add", "Sub", "Mult", "Div"]);

    // additions stayed at 2200ms throughout; one quick 9 × 9 pulls Mult below
    assert!(stats.operators[0].slowest);
    assert!(!stats.operators[2].slowest);

    let trend = stats.trend.expect("twenty-plus results give a trend");
    assert!(trend.faster);
    assert!(trend.now_avg_ms < trend.before_avg_ms);

    assert_eq!(stats.speed.lightning, 4);
    assert_eq!(stats.speed.fast, 38);
    assert_eq!(stats.speed.medium, 58);
    assert_eq!(stats.speed.slow, 0);

    // ties rank by ascending operand, then the quicker nine
    let mult = view.multiplication.expect("twenty-plus results");
    let ranked: Vec<u32> = mult.iter().map(|row| row.operand).collect();
    assert_eq!(ranked, vec![6, 7, 9]);
    assert!((mult[0].bar_pct - 100.0).abs() < f64::EPSILON);
    assert_eq!(mult[2].count, 2);
    assert_eq!(mult[2].tier, DifficultyTier::Hard);

    let podium_scores: Vec<u32> = view.podium.iter().map(|row| row.score).collect();
    assert_eq!(podium_scores, vec![52, 47]);

    // the larger same-day run sets the daily best
    let today_cell = view
        .week
        .days
        .iter()
        .find(|day| day.is_today)
        .expect("fixed clock day in current week");
    assert_eq!(today_cell.best, Some(14));

    let earned: Vec<&str> = view
        .badges
        .iter()
        .filter(|badge| badge.earned)
        .map(|badge| badge.id)
        .collect();
    assert_eq!(earned, vec!["first10", "sub1sec"]);
}
