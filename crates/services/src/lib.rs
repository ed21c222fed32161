#![forbid(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod error;

pub use mathpace_core::Clock;

pub use error::{AnalysisError, SettingsError};

pub use analysis::{
    AnalysisService, BadgeView, CalendarDayView, DashboardStats, DashboardView, DifficultyTier,
    MultRowView, OperatorRowView, RecordRowView, SpeedBands, StatsCache, StatsView, TrendView,
    WeekView,
};
pub use capture::{
    CaptureEngine, CaptureEvent, CaptureOutcome, CaptureService, CaptureSettings, CaptureState,
    PageSnapshot,
};
