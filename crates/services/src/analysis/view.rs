use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

use mathpace_core::model::{Badge, BadgeSet, DailyBestMap, SessionRecord, top_records};

use super::stats::{
    DashboardStats, MIN_RESULTS_FOR_MULT, MIN_RESULTS_FOR_STATS, OperandDifficulty, SpeedBands,
    TrendStats, slowest_average,
};

//
// ─── VIEW ITEMS ────────────────────────────────────────────────────────────────
//

/// One operator line in the statistics section.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorRowView {
    pub label: &'static str,
    pub symbol: char,
    pub count: usize,
    pub avg_ms: f64,
    /// Set on every row whose average equals the slowest one.
    pub slowest: bool,
}

/// Progress line comparing the later half of the history to the earlier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendView {
    /// Signed percentage change rounded to one decimal place.
    pub change_pct: f64,
    /// Judged on the rounded value; an exact 0.0 reads as slower.
    pub faster: bool,
    pub now_avg_ms: f64,
    pub before_avg_ms: f64,
}

/// One personal-record line. Rank 1 is gold, 2 silver, 3 bronze.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRowView {
    pub rank: usize,
    pub score: u32,
    pub achieved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyTier {
    Hard,
    Medium,
    Easy,
}

/// One operand line in the multiplication difficulty section.
#[derive(Debug, Clone, PartialEq)]
pub struct MultRowView {
    pub operand: u32,
    pub avg_ms: f64,
    pub count: usize,
    /// Bar width relative to the hardest operand, 0.0 through 100.0.
    pub bar_pct: f64,
    pub tier: DifficultyTier,
}

/// One day cell of the weekly calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDayView {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub best: Option<u32>,
    pub is_today: bool,
}

/// One calendar page: a Sunday-first week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekView {
    /// The Sunday the displayed week starts on.
    pub week_of: NaiveDate,
    pub days: [CalendarDayView; 7],
    /// Pages back from the current week; 0 is this week.
    pub week_offset: u32,
    /// Forward navigation is unavailable at the current week.
    pub at_current_week: bool,
}

/// One catalog badge, earned or locked.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeView {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub requirement: &'static str,
    pub earned: bool,
}

/// The main statistics section, present once ten problems are tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub operators: Vec<OperatorRowView>,
    pub trend: Option<TrendView>,
    pub speed: SpeedBands,
}

/// Everything a dashboard render needs, free of any output format.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub total_tracked: usize,
    /// `None` below ten tracked problems; render the placeholder instead.
    pub stats: Option<StatsView>,
    /// Top three records, best first; empty when nothing is recorded yet.
    pub podium: Vec<RecordRowView>,
    /// `None` below twenty tracked problems.
    pub multiplication: Option<Vec<MultRowView>>,
    pub week: WeekView,
    /// All catalog badges in display order, locked ones included.
    pub badges: Vec<BadgeView>,
}

//
// ─── ASSEMBLY ──────────────────────────────────────────────────────────────────
//

#[must_use]
pub fn assemble(
    stats: &DashboardStats,
    records: &[SessionRecord],
    badges: &BadgeSet,
    daily_bests: &DailyBestMap,
    today: NaiveDate,
    week_offset: u32,
) -> DashboardView {
    DashboardView {
        total_tracked: stats.total,
        stats: (stats.total >= MIN_RESULTS_FOR_STATS).then(|| stats_view(stats)),
        podium: podium(records),
        multiplication: (stats.total >= MIN_RESULTS_FOR_MULT)
            .then(|| multiplication_rows(&stats.multiplication)),
        week: week_view(daily_bests, today, week_offset),
        badges: badge_views(badges),
    }
}

fn stats_view(stats: &DashboardStats) -> StatsView {
    let max_avg = slowest_average(&stats.operators);
    let operators = stats
        .operators
        .iter()
        .map(|row| OperatorRowView {
            label: row.op.label(),
            symbol: row.op.symbol(),
            count: row.count,
            avg_ms: row.avg_ms,
            slowest: max_avg.is_some_and(|max| row.avg_ms >= max),
        })
        .collect();

    StatsView {
        operators,
        trend: stats.trend.map(trend_view),
        speed: stats.speed,
    }
}

fn trend_view(trend: TrendStats) -> TrendView {
    let change_pct = (trend.change_pct * 10.0).round() / 10.0;
    TrendView {
        change_pct,
        faster: change_pct > 0.0,
        now_avg_ms: trend.now_avg_ms,
        before_avg_ms: trend.before_avg_ms,
    }
}

fn podium(records: &[SessionRecord]) -> Vec<RecordRowView> {
    top_records(records, 3)
        .into_iter()
        .enumerate()
        .map(|(i, record)| RecordRowView {
            rank: i + 1,
            score: record.score,
            achieved_at: record.timestamp,
        })
        .collect()
}

fn multiplication_rows(rows: &[OperandDifficulty]) -> Vec<MultRowView> {
    let hardest = rows.first().map_or(0.0, |row| row.avg_ms);
    rows.iter()
        .enumerate()
        .map(|(i, row)| MultRowView {
            operand: row.operand,
            avg_ms: row.avg_ms,
            count: row.count,
            bar_pct: if hardest > 0.0 {
                row.avg_ms / hardest * 100.0
            } else {
                0.0
            },
            tier: match i {
                0..=2 => DifficultyTier::Hard,
                3..=5 => DifficultyTier::Medium,
                _ => DifficultyTier::Easy,
            },
        })
        .collect()
}

fn week_view(daily_bests: &DailyBestMap, today: NaiveDate, week_offset: u32) -> WeekView {
    let days_into_week = i64::from(today.weekday().num_days_from_sunday());
    let week_of = today - Duration::days(days_into_week + 7 * i64::from(week_offset));

    let days = std::array::from_fn(|i| {
        let date = week_of + Duration::days(i as i64);
        CalendarDayView {
            date,
            day_name: day_name(date.weekday()),
            best: daily_bests.best_for(date),
            is_today: date == today,
        }
    });

    WeekView {
        week_of,
        days,
        week_offset,
        at_current_week: week_offset == 0,
    }
}

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

fn badge_views(badges: &BadgeSet) -> Vec<BadgeView> {
    Badge::ALL
        .iter()
        .map(|badge| {
            let (name, icon, requirement) = catalog_entry(*badge);
            BadgeView {
                id: badge.id(),
                name,
                icon,
                requirement,
                earned: badges.is_earned(*badge),
            }
        })
        .collect()
}

fn catalog_entry(badge: Badge) -> (&'static str, &'static str, &'static str) {
    match badge {
        Badge::First10 => ("Starter", "🌱", "Complete 10 problems"),
        Badge::First100 => ("Dedicated", "💪", "Complete 100 problems"),
        Badge::First1000 => ("Master", "🏆", "Complete 1000 problems"),
        Badge::Sub1Sec => ("Lightning", "⚡", "Solve a problem in under 1 second"),
        Badge::Score50 => ("Half Century", "5️⃣0️⃣", "Score 50+ in one session"),
        Badge::Score100 => ("Century", "💯", "Score 100+ in one session"),
        Badge::Consistent => (
            "Consistent",
            "🎯",
            "90% problems under 3 seconds (50+ problems)",
        ),
        Badge::WeekStreak => ("Week Warrior", "📅", "Play 7 days in a row"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::compute_stats;
    use mathpace_core::model::ProblemResult;
    use mathpace_core::time::fixed_now;

    fn solves(specs: &[(&str, f64)]) -> Vec<ProblemResult> {
        specs
            .iter()
            .enumerate()
            .map(|(i, (problem, time))| {
                ProblemResult::new(
                    *problem,
                    *time,
                    fixed_now() + Duration::milliseconds(i as i64 * 1_000),
                )
                .unwrap()
            })
            .collect()
    }

    fn today() -> NaiveDate {
        fixed_now().date_naive()
    }

    fn empty_view_inputs() -> (BadgeSet, DailyBestMap) {
        (BadgeSet::new(), DailyBestMap::new())
    }

    #[test]
    fn statistics_unlock_at_ten_problems() {
        let (badges, bests) = empty_view_inputs();

        let nine = compute_stats(&solves(&[("2 + 3", 1_000.0); 9]));
        let view = assemble(&nine, &[], &badges, &bests, today(), 0);
        assert_eq!(view.total_tracked, 9);
        assert!(view.stats.is_none());

        let ten = compute_stats(&solves(&[("2 + 3", 1_000.0); 10]));
        let view = assemble(&ten, &[], &badges, &bests, today(), 0);
        assert!(view.stats.is_some());
        assert!(view.multiplication.is_none());
    }

    #[test]
    fn the_slowest_operator_rows_are_marked() {
        let (badges, bests) = empty_view_inputs();
        let mut specs = vec![("2 + 3", 1_000.0); 5];
        specs.extend([("9 − 4", 2_000.0); 5]);

        let stats = compute_stats(&solves(&specs));
        let view = assemble(&stats, &[], &badges, &bests, today(), 0);
        let rows = view.stats.unwrap().operators;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Add");
        assert!(!rows[0].slowest);
        assert_eq!(rows[1].label, "Sub");
        assert!(rows[1].slowest);
    }

    #[test]
    fn tied_operator_averages_are_all_marked_slowest() {
        let (badges, bests) = empty_view_inputs();
        let mut specs = vec![("2 + 3", 1_500.0); 5];
        specs.extend([("8 ÷ 2", 1_500.0); 5]);

        let stats = compute_stats(&solves(&specs));
        let view = assemble(&stats, &[], &badges, &bests, today(), 0);
        let rows = view.stats.unwrap().operators;
        assert!(rows.iter().all(|row| row.slowest));
    }

    #[test]
    fn trend_direction_is_judged_on_the_rounded_value() {
        let (badges, bests) = empty_view_inputs();
        let mut stats = compute_stats(&solves(&[("2 + 3", 1_000.0); 10]));

        stats.trend = Some(TrendStats {
            change_pct: 0.04,
            before_avg_ms: 2_000.0,
            now_avg_ms: 1_999.2,
        });
        let view = assemble(&stats, &[], &badges, &bests, today(), 0);
        let trend = view.stats.unwrap().trend.unwrap();
        assert!(trend.change_pct.abs() < f64::EPSILON);
        assert!(!trend.faster);

        stats.trend = Some(TrendStats {
            change_pct: 0.06,
            before_avg_ms: 2_000.0,
            now_avg_ms: 1_998.8,
        });
        let view = assemble(&stats, &[], &badges, &bests, today(), 0);
        let trend = view.stats.unwrap().trend.unwrap();
        assert!((trend.change_pct - 0.1).abs() < f64::EPSILON);
        assert!(trend.faster);
    }

    #[test]
    fn podium_takes_the_top_three_records() {
        let (badges, bests) = empty_view_inputs();
        let records = vec![
            SessionRecord::new(38, fixed_now()),
            SessionRecord::new(55, fixed_now() + Duration::days(1)),
            SessionRecord::new(47, fixed_now() + Duration::days(2)),
            SessionRecord::new(51, fixed_now() + Duration::days(3)),
        ];

        let stats = compute_stats(&[]);
        let view = assemble(&stats, &records, &badges, &bests, today(), 0);

        let scores: Vec<u32> = view.podium.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![55, 51, 47]);
        assert_eq!(view.podium[0].rank, 1);
        assert_eq!(view.podium[2].rank, 3);

        let empty = assemble(&stats, &[], &badges, &bests, today(), 0);
        assert!(empty.podium.is_empty());
    }

    #[test]
    fn multiplication_rows_carry_relative_bars_and_tiers() {
        let (badges, bests) = empty_view_inputs();
        let mut specs: Vec<(String, f64)> = (2..=8)
            .map(|n| (format!("{n} × 100"), (9 - n) as f64 * 100.0))
            .collect();
        for _ in 0..13 {
            specs.push(("1 + 1".to_string(), 1_000.0));
        }
        let results = solves(
            &specs
                .iter()
                .map(|(p, t)| (p.as_str(), *t))
                .collect::<Vec<_>>(),
        );

        let stats = compute_stats(&results);
        let view = assemble(&stats, &[], &badges, &bests, today(), 0);
        let rows = view.multiplication.unwrap();

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].operand, 2);
        assert!((rows[0].bar_pct - 100.0).abs() < f64::EPSILON);
        assert!((rows[1].bar_pct - 600.0 / 700.0 * 100.0).abs() < 1e-9);

        assert_eq!(rows[0].tier, DifficultyTier::Hard);
        assert_eq!(rows[2].tier, DifficultyTier::Hard);
        assert_eq!(rows[3].tier, DifficultyTier::Medium);
        assert_eq!(rows[5].tier, DifficultyTier::Medium);
        assert_eq!(rows[6].tier, DifficultyTier::Easy);
    }

    #[test]
    fn calendar_weeks_start_on_sunday_and_page_backwards() {
        let (badges, _) = empty_view_inputs();
        let today: NaiveDate = "2025-06-18".parse().unwrap(); // a Wednesday

        let mut bests = DailyBestMap::new();
        bests.merge_best("2025-06-15".parse().unwrap(), 41);
        bests.merge_best("2025-06-10".parse().unwrap(), 38);

        let stats = compute_stats(&[]);
        let week = assemble(&stats, &[], &badges, &bests, today, 0).week;
        assert_eq!(week.week_of, "2025-06-15".parse::<NaiveDate>().unwrap());
        assert!(week.at_current_week);
        assert_eq!(week.days[0].day_name, "Sun");
        assert_eq!(week.days[0].best, Some(41));
        assert_eq!(week.days[6].day_name, "Sat");
        assert!(week.days[3].is_today);
        assert_eq!(week.days[3].date, today);

        let previous = assemble(&stats, &[], &badges, &bests, today, 1).week;
        assert_eq!(previous.week_of, "2025-06-08".parse::<NaiveDate>().unwrap());
        assert!(!previous.at_current_week);
        assert_eq!(previous.days[2].best, Some(38));
        assert!(previous.days.iter().all(|day| !day.is_today));
    }

    #[test]
    fn badge_catalog_renders_all_eight_in_order() {
        let (_, bests) = empty_view_inputs();
        let mut set = BadgeSet::new();
        set.award(Badge::First10);

        let stats = compute_stats(&[]);
        let view = assemble(&stats, &[], &set, &bests, today(), 0);

        assert_eq!(view.badges.len(), 8);
        let names: Vec<&str> = view.badges.iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            vec![
                "Starter",
                "Dedicated",
                "Master",
                "Lightning",
                "Half Century",
                "Century",
                "Consistent",
                "Week Warrior",
            ]
        );

        assert!(view.badges[0].earned);
        assert!(!view.badges[1].earned);
        assert_eq!(view.badges[0].icon, "🌱");
        assert_eq!(
            view.badges[3].requirement,
            "Solve a problem in under 1 second"
        );
    }
}
