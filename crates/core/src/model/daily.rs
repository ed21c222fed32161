use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Best inferred session score per calendar day.
///
/// Keys serialize as `YYYY-MM-DD`. Values only ever grow: a day's best is
/// replaced when a larger score is inferred, never lowered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyBestMap {
    bests: BTreeMap<NaiveDate, u32>,
}

impl DailyBestMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn best_for(&self, day: NaiveDate) -> Option<u32> {
        self.bests.get(&day).copied()
    }

    /// Records `score` for `day` if it beats the stored best.
    ///
    /// Returns `true` when the map changed.
    pub fn merge_best(&mut self, day: NaiveDate, score: u32) -> bool {
        match self.bests.get(&day) {
            Some(existing) if *existing >= score => false,
            _ => {
                self.bests.insert(day, score);
                true
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.bests.iter().map(|(day, score)| (*day, *score))
    }
}
