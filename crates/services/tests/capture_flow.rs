use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tokio::sync::mpsc;
use tokio::time::sleep;

use mathpace_core::time::fixed_now;
use services::{CaptureService, CaptureSettings, CaptureState, PageSnapshot};
use storage::TrackerStore;

const DEFAULT_SOURCE: &str = concat!(
    r#"import { init } from "./game.js"; "#,
    r#"init({"add": true, "sub": true, "mul": true, "div": true, "seconds": 120});"#,
);

fn fast_settings() -> CaptureSettings {
    CaptureSettings::new(
        Duration::from_millis(5),
        Duration::from_millis(10),
        110_000.0,
        120,
    )
    .unwrap()
}

#[tokio::test]
async fn a_full_default_session_is_captured_end_to_end() {
    let store = TrackerStore::in_memory();
    let service = CaptureService::new(store.clone()).with_settings(fast_settings());

    let (tx, rx) = mpsc::channel(16);
    let capture = tokio::spawn(async move { service.run(rx).await });

    // page becomes ready in default mode
    let start = fixed_now();
    let ready = PageSnapshot::at(start)
        .with_problem("2 + 3")
        .with_countdown("Seconds left: 120")
        .with_settings_source(DEFAULT_SOURCE);
    tx.send(ready).await.unwrap();
    sleep(Duration::from_millis(50)).await;

    // three problems appear; the first change only starts the clock
    for (at_ms, problem) in [(500, "7 × 8"), (1_750, "9 − 4"), (3_000, "12 + 19")] {
        let snapshot =
            PageSnapshot::at(start + ChronoDuration::milliseconds(at_ms)).with_problem(problem);
        tx.send(snapshot).await.unwrap();
    }
    sleep(Duration::from_millis(30)).await;

    // the countdown runs out after a full-length session
    let ended = PageSnapshot::at(start + ChronoDuration::milliseconds(111_000))
        .with_problem("")
        .with_countdown("Seconds left: 0");
    tx.send(ended).await.unwrap();
    sleep(Duration::from_millis(60)).await;
    drop(tx);

    let outcome = capture.await.unwrap();
    assert_eq!(outcome.problems_recorded, 2);
    assert!(outcome.session_recorded);
    assert_eq!(outcome.failed_writes, 0);
    assert_eq!(outcome.final_state, CaptureState::Tracking);

    let results = store.results().await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].problem, "7 × 8");
    assert!((results[0].time - 1_250.0).abs() < f64::EPSILON);
    assert_eq!(results[1].problem, "9 − 4");
    assert!((results[1].time - 1_250.0).abs() < f64::EPSILON);

    // many zero reads after the end, still exactly one record
    let records = store.records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].score, 2);
    assert_eq!(
        records[0].timestamp,
        start + ChronoDuration::milliseconds(111_000)
    );
}

#[tokio::test]
async fn a_custom_configuration_is_never_tracked() {
    let store = TrackerStore::in_memory();
    let service = CaptureService::new(store.clone()).with_settings(fast_settings());

    let (tx, rx) = mpsc::channel(16);
    let capture = tokio::spawn(async move { service.run(rx).await });

    let start = fixed_now();
    let sub_off = r#"init({"add": true, "sub": false, "mul": true, "div": true});"#;
    let ready = PageSnapshot::at(start)
        .with_problem("2 + 3")
        .with_countdown("Seconds left: 120")
        .with_settings_source(sub_off);
    tx.send(ready).await.unwrap();
    sleep(Duration::from_millis(50)).await;

    for (at_ms, problem) in [(400, "7 × 8"), (900, "5 + 5")] {
        let snapshot =
            PageSnapshot::at(start + ChronoDuration::milliseconds(at_ms)).with_problem(problem);
        tx.send(snapshot).await.unwrap();
    }
    sleep(Duration::from_millis(30)).await;
    drop(tx);

    let outcome = capture.await.unwrap();
    assert_eq!(outcome.problems_recorded, 0);
    assert!(!outcome.session_recorded);
    assert_eq!(outcome.final_state, CaptureState::Stopped);

    assert!(store.results().await.unwrap().is_empty());
    assert!(store.records().await.unwrap().is_empty());
}
