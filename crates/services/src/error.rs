//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted when constructing capture settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("config poll cadence must be non-zero")]
    ZeroPollInterval,
    #[error("countdown check cadence must be non-zero")]
    ZeroCountdownInterval,
    #[error("full-session threshold must be a finite non-negative duration, got {0}ms")]
    InvalidThreshold(f64),
    #[error("full-session threshold {threshold_ms}ms exceeds the {baseline_secs}s session baseline")]
    ThresholdBeyondBaseline { threshold_ms: f64, baseline_secs: u32 },
}

/// Errors emitted by `AnalysisService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
