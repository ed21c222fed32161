use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the observer saw on the practice page at one instant.
///
/// Each text field is `None` when its element was absent from the page. A
/// snapshot carries its own observation instant, and the engine times
/// everything from those instants rather than reading a clock, so a replayed
/// feed produces byte-identical results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Text of the problem element.
    #[serde(default)]
    pub problem: Option<String>,
    /// Text of the countdown element ("Seconds left: N").
    #[serde(default)]
    pub countdown: Option<String>,
    /// Source of the page script carrying the embedded init call.
    #[serde(default)]
    pub settings_source: Option<String>,
    /// When the page looked like this.
    pub observed_at: DateTime<Utc>,
}

impl PageSnapshot {
    /// Snapshot of a page with no elements yet; chain the `with_*` builders.
    #[must_use]
    pub fn at(observed_at: DateTime<Utc>) -> Self {
        Self {
            problem: None,
            countdown: None,
            settings_source: None,
            observed_at,
        }
    }

    #[must_use]
    pub fn with_problem(mut self, text: impl Into<String>) -> Self {
        self.problem = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_countdown(mut self, text: impl Into<String>) -> Self {
        self.countdown = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_settings_source(mut self, source: impl Into<String>) -> Self {
        self.settings_source = Some(source.into());
        self
    }
}
