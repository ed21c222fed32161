// Public API of the analysis subsystem.

mod badges;
mod daily;
mod service;
mod stats;
mod view;

pub use badges::evaluate_badges;
pub use daily::{SESSION_GAP_MS, infer_daily_bests, merge_daily_bests};
pub use service::AnalysisService;
pub use stats::{
    DashboardStats, MIN_RESULTS_FOR_MULT, MIN_RESULTS_FOR_STATS, OperandDifficulty, OperatorStats,
    SpeedBands, StatsCache, TrendStats, compute_stats, improvement_trend,
    multiplication_difficulty, operator_breakdown, slowest_average, speed_distribution,
};
pub use view::{
    BadgeView, CalendarDayView, DashboardView, DifficultyTier, MultRowView, OperatorRowView,
    RecordRowView, StatsView, TrendView, WeekView, assemble,
};
