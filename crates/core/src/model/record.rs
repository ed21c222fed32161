use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many session records the board retains.
pub const RECORD_BOARD_CAP: usize = 10;

/// A completed full-length session and its score.
///
/// Only sessions that ran (close to) the full countdown are recorded; the
/// capture process refuses to append anything for runs abandoned early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Problems solved during the session.
    pub score: u32,
    /// When the session completed.
    pub timestamp: DateTime<Utc>,
}

impl SessionRecord {
    #[must_use]
    pub fn new(score: u32, timestamp: DateTime<Utc>) -> Self {
        Self { score, timestamp }
    }
}

/// Inserts a record into the board, keeping only the top
/// [`RECORD_BOARD_CAP`] entries by score, descending.
///
/// The sort is stable, so of two equal scores the longer-standing record
/// stays ahead of the newcomer.
pub fn merge_record(board: &mut Vec<SessionRecord>, record: SessionRecord) {
    board.push(record);
    board.sort_by(|a, b| b.score.cmp(&a.score));
    board.truncate(RECORD_BOARD_CAP);
}

/// Top `n` records by score, descending.
#[must_use]
pub fn top_records(board: &[SessionRecord], n: usize) -> Vec<SessionRecord> {
    let mut sorted: Vec<SessionRecord> = board.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn board_keeps_top_ten_descending() {
        let mut board = Vec::new();
        for score in [40, 55, 31, 62, 48, 50, 45, 58, 36, 44, 53, 29] {
            merge_record(&mut board, SessionRecord::new(score, fixed_now()));
        }

        assert_eq!(board.len(), RECORD_BOARD_CAP);
        assert_eq!(board[0].score, 62);
        assert_eq!(board[RECORD_BOARD_CAP - 1].score, 40);
        assert!(board.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn equal_scores_keep_the_older_record_first() {
        let earlier = fixed_now();
        let later = earlier + chrono::Duration::days(1);

        let mut board = vec![SessionRecord::new(50, earlier)];
        merge_record(&mut board, SessionRecord::new(50, later));

        assert_eq!(board[0].timestamp, earlier);
        assert_eq!(board[1].timestamp, later);
    }

    #[test]
    fn top_records_takes_a_prefix_without_mutating() {
        let board = vec![
            SessionRecord::new(12, fixed_now()),
            SessionRecord::new(60, fixed_now()),
            SessionRecord::new(45, fixed_now()),
            SessionRecord::new(51, fixed_now()),
        ];

        let podium = top_records(&board, 3);
        assert_eq!(
            podium.iter().map(|r| r.score).collect::<Vec<_>>(),
            vec![60, 51, 45]
        );
        assert_eq!(board.len(), 4);
    }
}
