use std::fmt;

use chrono::{DateTime, Duration, Utc};
use mathpace_core::model::{ProblemResult, SessionRecord};
use rand::Rng;
use storage::repository::TrackerStore;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    sessions: u32,
    duration_secs: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSessions { raw: String },
    InvalidDuration { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSessions { raw } => write!(f, "invalid --sessions value: {raw}"),
            ArgsError::InvalidDuration { raw } => write!(f, "invalid --duration value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("MATHPACE_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut sessions = std::env::var("MATHPACE_SESSIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut duration_secs = std::env::var("MATHPACE_DURATION")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(120);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--sessions" => {
                    let value = require_value(&mut args, "--sessions")?;
                    sessions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSessions { raw: value.clone() })?;
                }
                "--duration" => {
                    let value = require_value(&mut args, "--duration")?;
                    duration_secs = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidDuration { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            sessions,
            duration_secs,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --sessions <n>            Number of practice sessions to generate (default: 5)");
    eprintln!("  --duration <secs>         Session length in seconds (default: 120)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic day placement");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  MATHPACE_DB_URL, MATHPACE_SESSIONS, MATHPACE_DURATION");
}

fn jitter(rng: &mut impl Rng, base_ms: f64) -> f64 {
    base_ms * rng.random_range(0.6..1.4)
}

/// Produces one problem in the practice site's generation ranges, with a
/// plausible solve latency for its operator.
fn generate_problem(rng: &mut impl Rng) -> (String, f64) {
    match rng.random_range(0..4_u8) {
        0 => {
            let a = rng.random_range(2..=100_u32);
            let b = rng.random_range(2..=100_u32);
            (format!("{a} + {b}"), jitter(rng, 1_100.0))
        }
        1 => {
            let a = rng.random_range(2..=100_u32);
            let b = rng.random_range(2..=100_u32);
            (format!("{} - {}", a + b, a), jitter(rng, 1_500.0))
        }
        2 => {
            let a = rng.random_range(2..=12_u32);
            let b = rng.random_range(2..=100_u32);
            (format!("{a} × {b}"), jitter(rng, 2_200.0))
        }
        _ => {
            let answer = rng.random_range(2..=100_u32);
            let divisor = rng.random_range(2..=12_u32);
            (format!("{} ÷ {}", answer * divisor, divisor), jitter(rng, 2_400.0))
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // sqlx does not create missing database files on its own.
    let path = args.db_url.trim_start_matches("sqlite://");
    let path = path.strip_prefix("sqlite:").unwrap_or(path);
    let path = path.split('?').next().unwrap_or(path);
    if !path.is_empty() && path != ":memory:" && !std::path::Path::new(path).exists() {
        std::fs::File::create(path)?;
    }

    let store = TrackerStore::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let mut rng = rand::rng();

    let budget_ms = f64::from(args.duration_secs) * 1_000.0;
    let mut seeded = Vec::new();
    let mut records = Vec::new();

    // One full session per day, oldest first so the history stays ordered.
    for session in 0..args.sessions {
        let days_back = i64::from(args.sessions - 1 - session);
        let started_at = now
            - Duration::days(days_back)
            - Duration::seconds(i64::from(args.duration_secs));

        let mut elapsed_ms = 0.0;
        let mut score = 0_u32;
        loop {
            let (problem, latency_ms) = generate_problem(&mut rng);
            if elapsed_ms + latency_ms > budget_ms {
                break;
            }
            elapsed_ms += latency_ms;
            let solved_at = started_at + Duration::milliseconds(elapsed_ms as i64);
            seeded.push(ProblemResult::new(problem, latency_ms, solved_at)?);
            score += 1;
        }

        let finished_at = started_at + Duration::seconds(i64::from(args.duration_secs));
        records.push(SessionRecord::new(score, finished_at));
    }

    let mut history = store.results().await?;
    let seeded_count = seeded.len();
    history.append(&mut seeded);
    store.replace_results(&history).await?;

    for record in records {
        store.append_record(record).await?;
    }

    println!(
        "Seeded {} sessions ({} problems) into {}",
        args.sessions, seeded_count, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
