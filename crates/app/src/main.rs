use std::fmt;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write as _};

use chrono::Datelike;
use services::{AnalysisService, CaptureService, DashboardView, DifficultyTier, PageSnapshot};
use storage::TrackerStore;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidWeek { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidWeek { raw } => write!(f, "invalid --week value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    week_offset: u32,
    assume_yes: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- stats   [--db <sqlite_url>] [--week <n>]");
    eprintln!("  cargo run -p app -- watch   [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- records [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- clear   [--db <sqlite_url>] [--yes]");
    eprintln!();
    eprintln!("watch reads one page snapshot per line from stdin, as JSON:");
    eprintln!(r#"  {{"observed_at":"2025-06-15T15:06:40Z","problem":"7 × 8"}}"#);
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:dev.sqlite3");
    eprintln!("  --week 0 (current week; larger values page back)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MATHPACE_DB_URL, MATHPACE_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stats,
    Watch,
    Records,
    Clear,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "stats" => Some(Self::Stats),
            "watch" => Some(Self::Watch),
            "records" => Some(Self::Records),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("MATHPACE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut week_offset = 0u32;
        let mut assume_yes = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--week" => {
                    let value = require_value(args, "--week")?;
                    week_offset = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidWeek { raw: value.clone() })?;
                }
                "--yes" => assume_yes = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            week_offset,
            assume_yes,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

fn tier_label(tier: DifficultyTier) -> &'static str {
    match tier {
        DifficultyTier::Hard => "hard",
        DifficultyTier::Medium => "medium",
        DifficultyTier::Easy => "easy",
    }
}

fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} problems tracked", view.total_tracked);
    let _ = writeln!(out, "Only default mode (2 min, full range) counts");

    match &view.stats {
        None => {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Need at least 10 problems in default mode to show statistics"
            );
        }
        Some(stats) => {
            let _ = writeln!(out);
            let _ = writeln!(out, "Operations");
            for row in &stats.operators {
                let _ = writeln!(
                    out,
                    "  {:<5} {:>5}ms ({}){}",
                    format!("{}:", row.label),
                    row.avg_ms.round(),
                    row.count,
                    if row.slowest { "  slowest" } else { "" },
                );
            }

            if let Some(trend) = &stats.trend {
                let _ = writeln!(out);
                let _ = writeln!(out, "Progress");
                if trend.faster {
                    let _ = writeln!(out, "  ▲ {:.1}% faster than earlier", trend.change_pct);
                } else {
                    let _ = writeln!(
                        out,
                        "  ▼ {:.1}% slower than earlier",
                        trend.change_pct.abs()
                    );
                }
                let _ = writeln!(
                    out,
                    "  Now: {}ms | Before: {}ms",
                    trend.now_avg_ms.round(),
                    trend.before_avg_ms.round(),
                );
            }

            let _ = writeln!(out);
            let _ = writeln!(out, "Speed Distribution");
            let _ = writeln!(out, "  <1s:  {}%", stats.speed.lightning);
            let _ = writeln!(out, "  1-2s: {}%", stats.speed.fast);
            let _ = writeln!(out, "  2-3s: {}%", stats.speed.medium);
            let _ = writeln!(out, "  >3s:  {}%", stats.speed.slow);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Personal Records");
    if view.podium.is_empty() {
        let _ = writeln!(out, "  No records yet. Complete a full 2-minute session!");
    } else {
        for row in &view.podium {
            let _ = writeln!(
                out,
                "  {} {} problems  {}/{}",
                MEDALS[row.rank - 1],
                row.score,
                row.achieved_at.month(),
                row.achieved_at.day(),
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Multiplication Difficulty (2-12)");
    match &view.multiplication {
        None => {
            let _ = writeln!(out, "  Need 20+ problems for multiplication analysis");
        }
        Some(rows) => {
            for row in rows {
                let bar = "█".repeat((row.bar_pct / 100.0 * 20.0).round() as usize);
                let _ = writeln!(
                    out,
                    "  ×{:<2} {:<20} {:>5}ms ({})  {}",
                    row.operand,
                    bar,
                    row.avg_ms.round(),
                    row.count,
                    tier_label(row.tier),
                );
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Week of {}/{}",
        view.week.week_of.month(),
        view.week.week_of.day(),
    );
    for day in &view.week.days {
        let best = day.best.map_or_else(|| "-".to_string(), |b| b.to_string());
        let _ = writeln!(
            out,
            "  {} {:>2}/{:<2} {:>4}{}",
            day.day_name,
            day.date.month(),
            day.date.day(),
            best,
            if day.is_today { "  (today)" } else { "" },
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Badges");
    for badge in &view.badges {
        let icon = if badge.earned { badge.icon } else { "🔒" };
        let _ = writeln!(out, "  {} {:<12} {}", icon, badge.name, badge.requirement);
    }

    out
}

/// Blocking stdin reader for the watch command. Runs on a plain thread so
/// the capture loop never waits on terminal input.
fn feed_snapshots(tx: mpsc::Sender<PageSnapshot>) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<PageSnapshot>(trimmed) {
            Ok(snapshot) => {
                if tx.blocking_send(snapshot).is_err() {
                    break;
                }
            }
            Err(err) => warn!("skipping malformed snapshot line: {}", err),
        }
    }
}

fn confirm_clear() -> io::Result<bool> {
    print!("Clear all statistics? Your personal records will be kept. [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MATHPACE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: showing the dashboard when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Stats,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Stats,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let store = TrackerStore::sqlite(&parsed.db_url).await?;

    match cmd {
        Command::Stats => {
            let mut service = AnalysisService::new(store);
            let view = service.load_dashboard(parsed.week_offset).await?;
            print!("{}", render_dashboard(&view));
            Ok(())
        }
        Command::Watch => {
            info!("watching stdin for page snapshots");
            let (tx, rx) = mpsc::channel(64);
            let reader = std::thread::spawn(move || feed_snapshots(tx));
            let outcome = CaptureService::new(store).run(rx).await;
            let _ = reader.join();

            println!("Problems timed: {}", outcome.problems_recorded);
            println!(
                "Session record: {}",
                if outcome.session_recorded {
                    "taken"
                } else {
                    "none"
                },
            );
            if outcome.failed_writes > 0 {
                println!("Writes dropped after retries: {}", outcome.failed_writes);
            }
            Ok(())
        }
        Command::Records => {
            let records = store.records().await?;
            if records.is_empty() {
                println!("No records yet. Complete a full 2-minute session!");
            } else {
                println!("Personal records");
                for (rank, record) in records.iter().enumerate() {
                    println!(
                        "  {:>2}. {:>3} problems  {}/{}",
                        rank + 1,
                        record.score,
                        record.timestamp.month(),
                        record.timestamp.day(),
                    );
                }
            }
            Ok(())
        }
        Command::Clear => {
            if !parsed.assume_yes && !confirm_clear()? {
                println!("Nothing cleared.");
                return Ok(());
            }
            AnalysisService::new(store).clear_results().await?;
            println!("History cleared. Personal records were kept.");
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
