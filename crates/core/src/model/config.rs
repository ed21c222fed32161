use serde::{Deserialize, Serialize};

/// Countdown length of a default-mode session, in seconds.
pub const DEFAULT_SESSION_SECS: u32 = 120;

/// Operation toggles from the practice page's embedded initialization call.
///
/// The page hands these to its own `init(...)` as a JSON object; the capture
/// process only ever reads them. A configuration counts as default when every
/// operation is enabled; timings taken under any other mix are not
/// comparable and must never be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeConfig {
    pub add: bool,
    pub sub: bool,
    pub mul: bool,
    pub div: bool,
}

impl PracticeConfig {
    /// The configuration every recorded timing is comparable under.
    #[must_use]
    pub fn default_mode() -> Self {
        Self {
            add: true,
            sub: true,
            mul: true,
            div: true,
        }
    }

    #[must_use]
    pub fn all_enabled(self) -> bool {
        self.add && self.sub && self.mul && self.div
    }
}
