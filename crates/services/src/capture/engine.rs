use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use mathpace_core::model::{DEFAULT_SESSION_SECS, ProblemResult, SessionRecord};
use mathpace_core::time::millis_between;

use crate::error::SettingsError;

use super::page::PageSnapshot;
use super::validator;

/// Cadences and thresholds of the capture process.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Config-detection cadence while waiting for the page to become ready.
    pub poll_interval: Duration,
    /// Session-completion cadence.
    pub countdown_interval: Duration,
    /// Minimum tracked duration for a run to count as a full session, in ms.
    pub full_session_ms: f64,
    /// Countdown value a default session starts from, in seconds.
    pub baseline_secs: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            countdown_interval: Duration::from_millis(1000),
            full_session_ms: 110_000.0,
            baseline_secs: DEFAULT_SESSION_SECS,
        }
    }
}

impl CaptureSettings {
    /// Validated constructor for non-default cadences.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for zero cadences or a full-session threshold
    /// that is unmeasurable or longer than the session baseline itself.
    pub fn new(
        poll_interval: Duration,
        countdown_interval: Duration,
        full_session_ms: f64,
        baseline_secs: u32,
    ) -> Result<Self, SettingsError> {
        if poll_interval.is_zero() {
            return Err(SettingsError::ZeroPollInterval);
        }
        if countdown_interval.is_zero() {
            return Err(SettingsError::ZeroCountdownInterval);
        }
        if !full_session_ms.is_finite() || full_session_ms < 0.0 {
            return Err(SettingsError::InvalidThreshold(full_session_ms));
        }
        if full_session_ms > f64::from(baseline_secs) * 1_000.0 {
            return Err(SettingsError::ThresholdBeyondBaseline {
                threshold_ms: full_session_ms,
                baseline_secs,
            });
        }
        Ok(Self {
            poll_interval,
            countdown_interval,
            full_session_ms,
            baseline_secs,
        })
    }
}

/// Lifecycle of one page visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Not all page elements have appeared yet.
    Waiting,
    /// Elements present; configuration being checked.
    Validating,
    /// Default mode confirmed; problems are being timed.
    Tracking,
    /// Non-default configuration; inert until the page is visited again.
    Stopped,
}

/// What the runtime should do with the config poll after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDirective {
    Continue,
    Cancel,
}

/// The capture state machine.
///
/// The engine owns its state exclusively: the runtime feeds it page
/// snapshots and timer ticks as messages and applies whatever it emits.
/// All timing derives from snapshot instants, never from a clock read
/// inside the engine, so scripted feeds behave exactly like live ones.
#[derive(Debug)]
pub struct CaptureEngine {
    settings: CaptureSettings,
    state: CaptureState,
    latest: Option<PageSnapshot>,
    tracked_since: Option<DateTime<Utc>>,
    current_problem: Option<String>,
    problem_since: Option<DateTime<Utc>>,
    score: u32,
    record_taken: bool,
}

impl CaptureEngine {
    #[must_use]
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            state: CaptureState::Waiting,
            latest: None,
            tracked_since: None,
            current_problem: None,
            problem_since: None,
            score: 0,
            record_taken: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Problems timed so far in the current tracking run.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Feeds one page observation.
    ///
    /// Outside `Tracking` the snapshot is only remembered for the next poll
    /// tick. While tracking, a genuine problem change closes the previous
    /// problem's timing window and yields its result; the first change of a
    /// run and spurious notifications (same or empty text) yield nothing.
    pub fn on_page(&mut self, snapshot: PageSnapshot) -> Option<ProblemResult> {
        let observed_at = snapshot.observed_at;
        let text = snapshot
            .problem
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        self.latest = Some(snapshot);

        if self.state != CaptureState::Tracking {
            return None;
        }
        let text = text?;
        if Some(text.as_str()) == self.current_problem.as_deref() {
            return None;
        }

        let result = match (self.current_problem.take(), self.problem_since) {
            (Some(previous), Some(since)) => {
                let elapsed = millis_between(since, observed_at);
                match ProblemResult::new(previous, elapsed, observed_at) {
                    Ok(result) => {
                        self.score += 1;
                        Some(result)
                    }
                    Err(err) => {
                        warn!("discarding unmeasurable solve: {}", err);
                        None
                    }
                }
            }
            _ => None,
        };

        self.current_problem = Some(text);
        self.problem_since = Some(observed_at);
        result
    }

    /// One config-detection tick.
    ///
    /// Stays in `Waiting` until both the problem and countdown elements have
    /// been seen, then validates on that same tick: default mode starts a
    /// tracking run at the snapshot instant, anything else parks the engine
    /// in `Stopped`. Both outcomes cancel the poll.
    pub fn on_poll_tick(&mut self) -> PollDirective {
        if self.state != CaptureState::Waiting {
            return PollDirective::Cancel;
        }
        let Some(snapshot) = self.latest.as_ref() else {
            return PollDirective::Continue;
        };
        if snapshot.problem.is_none() || snapshot.countdown.is_none() {
            debug!("page not ready yet");
            return PollDirective::Continue;
        }

        self.state = CaptureState::Validating;
        if validator::is_default_mode(snapshot, self.settings.baseline_secs) {
            info!("default configuration confirmed, tracking session");
            self.state = CaptureState::Tracking;
            self.tracked_since = Some(snapshot.observed_at);
            self.current_problem = None;
            self.problem_since = None;
            self.score = 0;
            self.record_taken = false;
        } else {
            info!("non-default configuration, capture disabled");
            self.state = CaptureState::Stopped;
        }
        PollDirective::Cancel
    }

    /// One session-completion tick.
    ///
    /// While tracking, a countdown reading of zero after at least the
    /// full-session threshold of tracked time produces the run's record.
    /// A run produces at most one record; later zero readings are the same
    /// session still sitting on its end screen.
    pub fn on_countdown_tick(&mut self) -> Option<SessionRecord> {
        if self.state != CaptureState::Tracking || self.record_taken {
            return None;
        }
        let snapshot = self.latest.as_ref()?;
        let countdown = snapshot.countdown.as_deref()?;
        if validator::parse_countdown(countdown) != Some(0) {
            return None;
        }
        let since = self.tracked_since?;
        let elapsed = millis_between(since, snapshot.observed_at);
        if elapsed < self.settings.full_session_ms {
            debug!("countdown hit zero after only {:.0}ms, not a full session", elapsed);
            return None;
        }

        self.record_taken = true;
        info!("full session finished with {} problems", self.score);
        Some(SessionRecord::new(self.score, snapshot.observed_at))
    }
}
