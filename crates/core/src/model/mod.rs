mod badge;
mod config;
mod daily;
mod problem;
mod record;
mod result;

pub use badge::{Badge, BadgeSet};
pub use config::{DEFAULT_SESSION_SECS, PracticeConfig};
pub use daily::DailyBestMap;
pub use problem::{Operator, ProblemExpr};
pub use record::{RECORD_BOARD_CAP, SessionRecord, merge_record, top_records};
pub use result::{ProblemResult, ResultError};
