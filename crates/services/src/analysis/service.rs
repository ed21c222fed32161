use tracing::debug;

use mathpace_core::Clock;
use storage::TrackerStore;

use crate::error::AnalysisError;

use super::badges::evaluate_badges;
use super::daily::{infer_daily_bests, merge_daily_bests};
use super::stats::StatsCache;
use super::view::{self, DashboardView};

/// Read side of the tracker: refreshes derived data and assembles the
/// dashboard.
pub struct AnalysisService {
    store: TrackerStore,
    clock: Clock,
    cache: StatsCache,
}

impl AnalysisService {
    #[must_use]
    pub fn new(store: TrackerStore) -> Self {
        Self {
            store,
            clock: Clock::default(),
            cache: StatsCache::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Loads the dashboard for the week `week_offset` pages back.
    ///
    /// Badges and daily bests are reevaluated against the full history on
    /// the way and written back only when something actually changed, so a
    /// reload of unchanged data performs no store writes.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` when the store cannot be read or written.
    pub async fn load_dashboard(
        &mut self,
        week_offset: u32,
    ) -> Result<DashboardView, AnalysisError> {
        let results = self.store.results().await?;
        let records = self.store.records().await?;
        let mut badges = self.store.badges().await?;
        let mut daily = self.store.daily_bests().await?;

        if evaluate_badges(&results, &mut badges) {
            debug!("badge set changed, persisting");
            self.store.save_badges(&badges).await?;
        }

        let inferred = infer_daily_bests(&results);
        if merge_daily_bests(&mut daily, &inferred) {
            debug!("daily bests changed, persisting");
            self.store.save_daily_bests(&daily).await?;
        }

        let today = self.clock.now().date_naive();
        let stats = self.cache.stats_for(&results);
        Ok(view::assemble(
            stats,
            &records,
            &badges,
            &daily,
            today,
            week_offset,
        ))
    }

    /// Erases the solve history. Records, badges, and daily bests stay.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` when the store write fails.
    pub async fn clear_results(&self) -> Result<(), AnalysisError> {
        self.store.replace_results(&[]).await?;
        Ok(())
    }
}
