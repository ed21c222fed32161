use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use mathpace_core::model::PracticeConfig;

use super::page::PageSnapshot;

static INIT_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"init\((.*?)\);").expect("init-call pattern is valid"));

static COUNTDOWN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Seconds left:\s*(\d+)").expect("countdown pattern is valid"));

/// Pulls the practice configuration out of the page's script source.
///
/// The page configures itself through a single embedded `init({...});` call
/// whose argument is a JSON object of operation toggles. No such call, or an
/// argument that does not parse, yields `None`: an unreadable configuration
/// is treated as non-default, never guessed at.
#[must_use]
pub fn extract_settings(source: &str) -> Option<PracticeConfig> {
    let caps = INIT_CALL_RE.captures(source)?;
    match serde_json::from_str(&caps[1]) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!("embedded init argument is not a settings object: {}", err);
            None
        }
    }
}

/// Parses the countdown element's fixed "Seconds left: N" phrasing.
#[must_use]
pub fn parse_countdown(text: &str) -> Option<u32> {
    let caps = COUNTDOWN_RE.captures(text)?;
    caps[1].parse().ok()
}

/// Whether the snapshot shows an untouched default session: every operation
/// enabled and the countdown still at the full baseline.
///
/// Every failure path answers `false`; nothing here is an error.
#[must_use]
pub fn is_default_mode(snapshot: &PageSnapshot, baseline_secs: u32) -> bool {
    let Some(source) = snapshot.settings_source.as_deref() else {
        debug!("page carries no settings script");
        return false;
    };
    let Some(config) = extract_settings(source) else {
        return false;
    };
    if !config.all_enabled() {
        debug!("non-default operations: {:?}", config);
        return false;
    }
    let Some(countdown) = snapshot.countdown.as_deref() else {
        return false;
    };
    parse_countdown(countdown) == Some(baseline_secs)
}
