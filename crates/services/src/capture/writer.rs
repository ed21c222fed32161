use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use mathpace_core::model::{ProblemResult, SessionRecord};
use storage::TrackerStore;

/// Retry policy for persistence attempts.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
    /// Total attempts per write, including the first.
    pub max_attempts: u32,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            max_attempts: 3,
        }
    }
}

impl WriterConfig {
    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2_u32.saturating_pow(attempt)
    }
}

/// Persists capture output without taking the capture loop down.
///
/// A write that still fails after its retry budget is logged and counted;
/// the session keeps running and the next write starts with a fresh budget.
pub struct StoreWriter {
    store: TrackerStore,
    config: WriterConfig,
    failed_writes: u64,
}

impl StoreWriter {
    #[must_use]
    pub fn new(store: TrackerStore, config: WriterConfig) -> Self {
        Self {
            store,
            config,
            failed_writes: 0,
        }
    }

    /// Writes dropped after exhausting their retries.
    #[must_use]
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    pub async fn append_result(&mut self, result: &ProblemResult) {
        let attempts = self.config.max_attempts.max(1);
        for attempt in 0..attempts {
            match self.store.append_result(result).await {
                Ok(()) => return,
                Err(err) if attempt + 1 < attempts => {
                    warn!("result write failed, retrying: {}", err);
                    sleep(self.config.delay(attempt)).await;
                }
                Err(err) => {
                    error!("dropping result after {} attempts: {}", attempts, err);
                    self.failed_writes += 1;
                }
            }
        }
    }

    pub async fn append_record(&mut self, record: SessionRecord) {
        let attempts = self.config.max_attempts.max(1);
        for attempt in 0..attempts {
            match self.store.append_record(record.clone()).await {
                Ok(()) => return,
                Err(err) if attempt + 1 < attempts => {
                    warn!("record write failed, retrying: {}", err);
                    sleep(self.config.delay(attempt)).await;
                }
                Err(err) => {
                    error!("dropping session record after {} attempts: {}", attempts, err);
                    self.failed_writes += 1;
                }
            }
        }
    }
}
