use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

//
// ─── BADGES ────────────────────────────────────────────────────────────────────
//

/// Achievement identifiers, in catalog display order.
///
/// `Score50`, `Score100`, and `WeekStreak` appear in the catalog but no
/// evaluator awards them yet; they only ever render locked unless an earlier
/// store already carries the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Badge {
    First10,
    First100,
    First1000,
    Sub1Sec,
    Score50,
    Score100,
    Consistent,
    WeekStreak,
}

impl Badge {
    /// Catalog order, as the dashboard lists badges.
    pub const ALL: [Badge; 8] = [
        Badge::First10,
        Badge::First100,
        Badge::First1000,
        Badge::Sub1Sec,
        Badge::Score50,
        Badge::Score100,
        Badge::Consistent,
        Badge::WeekStreak,
    ];

    /// Stable identifier used as the key inside the stored badge map.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Badge::First10 => "first10",
            Badge::First100 => "first100",
            Badge::First1000 => "first1000",
            Badge::Sub1Sec => "sub1sec",
            Badge::Score50 => "score50",
            Badge::Score100 => "score100",
            Badge::Consistent => "consistent",
            Badge::WeekStreak => "weekStreak",
        }
    }
}

//
// ─── BADGE SET ─────────────────────────────────────────────────────────────────
//

/// Earned-badge flags, keyed by badge id.
///
/// Monotonic: awarding is the only mutation and never unsets a flag. Keys the
/// current catalog does not know are preserved verbatim so an older or newer
/// store never loses data on rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeSet {
    flags: BTreeMap<String, bool>,
}

impl BadgeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_earned(&self, badge: Badge) -> bool {
        self.flags.get(badge.id()).copied().unwrap_or(false)
    }

    /// Sets the badge flag. Returns `true` only when the badge was not
    /// already earned, so callers can tell whether anything changed.
    pub fn award(&mut self, badge: Badge) -> bool {
        let newly = !self.is_earned(badge);
        if newly {
            self.flags.insert(badge.id().to_string(), true);
        }
        newly
    }

    /// Number of earned badges known to the current catalog.
    #[must_use]
    pub fn earned_count(&self) -> usize {
        Badge::ALL.iter().filter(|b| self.is_earned(**b)).count()
    }
}
