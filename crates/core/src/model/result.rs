use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("solve latency must be finite and non-negative, got {0}")]
    InvalidLatency(f64),
}

/// One solved practice problem.
///
/// `time` is the solve latency in milliseconds, measured from the moment the
/// problem appeared until the next one replaced it. Results are immutable and
/// the stored collection is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemResult {
    /// Raw expression text as the page displayed it.
    pub problem: String,
    /// Solve latency in milliseconds.
    pub time: f64,
    /// When the problem was solved (when its successor appeared).
    pub timestamp: DateTime<Utc>,
}

impl ProblemResult {
    /// Builds a result, rejecting latencies that cannot have been measured.
    ///
    /// # Errors
    ///
    /// Returns `ResultError::InvalidLatency` if `time` is negative, NaN, or
    /// infinite.
    pub fn new(
        problem: impl Into<String>,
        time: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ResultError> {
        if !time.is_finite() || time < 0.0 {
            return Err(ResultError::InvalidLatency(time));
        }
        Ok(Self {
            problem: problem.into(),
            time,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn accepts_zero_and_positive_latency() {
        assert!(ProblemResult::new("2 + 2", 0.0, fixed_now()).is_ok());
        assert!(ProblemResult::new("2 + 2", 843.2, fixed_now()).is_ok());
    }

    #[test]
    fn rejects_unmeasurable_latency() {
        let err = ProblemResult::new("2 + 2", -1.0, fixed_now()).unwrap_err();
        assert!(matches!(err, ResultError::InvalidLatency(_)));
        assert!(ProblemResult::new("2 + 2", f64::NAN, fixed_now()).is_err());
        assert!(ProblemResult::new("2 + 2", f64::INFINITY, fixed_now()).is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let result = ProblemResult::new("3 × 4", 512.0, fixed_now()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("problem").is_some());
        assert!(json.get("time").is_some());
        assert!(json.get("timestamp").is_some());
    }
}
