use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use storage::TrackerStore;

use super::engine::{CaptureEngine, CaptureSettings, CaptureState, PollDirective};
use super::page::PageSnapshot;
use super::writer::{StoreWriter, WriterConfig};

/// Everything the capture loop reacts to, merged into one queue.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    Page(PageSnapshot),
    PollTick,
    CountdownTick,
    /// The page feed ended; the loop shuts down after this.
    FeedClosed,
}

/// Summary of one capture run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Problem results handed to storage (successfully or not).
    pub problems_recorded: u64,
    pub session_recorded: bool,
    /// Writes dropped after exhausting their retries.
    pub failed_writes: u64,
    pub final_state: CaptureState,
}

const EVENT_QUEUE: usize = 64;

/// Drives a `CaptureEngine` from a live page feed.
///
/// The engine lives inside a single consumer loop; page snapshots and
/// timer ticks reach it only as messages on one queue, so nothing else
/// can observe or mutate capture state mid-decision.
#[derive(Clone)]
pub struct CaptureService {
    store: TrackerStore,
    settings: CaptureSettings,
    writer_config: WriterConfig,
}

impl CaptureService {
    #[must_use]
    pub fn new(store: TrackerStore) -> Self {
        Self {
            store,
            settings: CaptureSettings::default(),
            writer_config: WriterConfig::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: CaptureSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_writer_config(mut self, config: WriterConfig) -> Self {
        self.writer_config = config;
        self
    }

    /// Consumes page snapshots until the feed closes.
    ///
    /// Solve results and the session record are persisted as they are
    /// produced; storage trouble is retried and counted, never fatal.
    pub async fn run(&self, mut pages: mpsc::Receiver<PageSnapshot>) -> CaptureOutcome {
        let (tx, mut events) = mpsc::channel(EVENT_QUEUE);

        let poll_ticks = spawn_ticker(
            tx.clone(),
            self.settings.poll_interval,
            CaptureEvent::PollTick,
        );
        let countdown_ticks = spawn_ticker(
            tx.clone(),
            self.settings.countdown_interval,
            CaptureEvent::CountdownTick,
        );
        let feed = tokio::spawn(async move {
            while let Some(snapshot) = pages.recv().await {
                if tx.send(CaptureEvent::Page(snapshot)).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(CaptureEvent::FeedClosed).await;
        });

        let mut engine = CaptureEngine::new(self.settings.clone());
        let mut writer = StoreWriter::new(self.store.clone(), self.writer_config.clone());
        let mut problems_recorded = 0u64;
        let mut session_recorded = false;

        while let Some(event) = events.recv().await {
            match event {
                CaptureEvent::Page(snapshot) => {
                    if let Some(result) = engine.on_page(snapshot) {
                        writer.append_result(&result).await;
                        problems_recorded += 1;
                    }
                }
                CaptureEvent::PollTick => {
                    if engine.on_poll_tick() == PollDirective::Cancel {
                        poll_ticks.abort();
                    }
                }
                CaptureEvent::CountdownTick => {
                    if let Some(record) = engine.on_countdown_tick() {
                        writer.append_record(record).await;
                        session_recorded = true;
                    }
                }
                CaptureEvent::FeedClosed => break,
            }
        }

        poll_ticks.abort();
        countdown_ticks.abort();
        feed.abort();

        info!(
            "capture loop stopped in {:?} with {} problems timed",
            engine.state(),
            problems_recorded
        );

        CaptureOutcome {
            problems_recorded,
            session_recorded,
            failed_writes: writer.failed_writes(),
            final_state: engine.state(),
        }
    }
}

fn spawn_ticker(
    tx: mpsc::Sender<CaptureEvent>,
    period: Duration,
    event: CaptureEvent,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if tx.send(event.clone()).await.is_err() {
                return;
            }
        }
    })
}
