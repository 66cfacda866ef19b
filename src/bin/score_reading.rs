use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tarot_shade::scoring::{
    analyze_reading_patterns, parse_date, parse_interpretation, parse_readings, ModifierStage,
    ReadingEvaluator,
};
use tarot_shade::settings::Settings;
use tarot_shade::utils::{log_error, log_history_loaded, ReadingReport};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Grade an interpretation payload against the shade rubric.
#[derive(Debug, Parser)]
#[command(name = "score-reading")]
struct Args {
    /// Interpretation JSON ({"text": ..., "scores": ...})
    #[arg(short, long)]
    payload: PathBuf,

    /// Spread layout the reading used
    #[arg(short, long, default_value = "classic")]
    spread: String,

    /// Evaluation date as YYYY-MM-DD (defaults to today, UTC)
    #[arg(short, long)]
    date: Option<String>,

    /// Judge spread-adjusted scores ("before") or raw scores ("after")
    #[arg(long, default_value = "before")]
    stage: ModifierStage,

    /// Past readings JSON array, used for pattern context
    #[arg(long)]
    history: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        log_error(&format!("{e:#}"));
        process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("tarot_shade=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let args = Args::parse();

    Settings::init_from_files(Path::new(".")).context("failed to load settings")?;

    let today = match &args.date {
        Some(date) => parse_date(date)?,
        None => Utc::now().date_naive(),
    };

    let raw = fs::read_to_string(&args.payload)
        .with_context(|| format!("failed to read {}", args.payload.display()))?;
    let payload = parse_interpretation(&raw)?;

    let patterns = match &args.history {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let readings = parse_readings(&raw)?;
            log_history_loaded(readings.len());
            Some(analyze_reading_patterns(&readings)?)
        }
        None => None,
    };

    let evaluation = ReadingEvaluator::new(args.stage).evaluate(&payload, &args.spread, today)?;

    ReadingReport {
        text: &payload.text,
        evaluation: &evaluation,
        patterns: patterns.as_ref(),
    }
    .print();

    if !evaluation.passes() {
        process::exit(2);
    }

    Ok(())
}
