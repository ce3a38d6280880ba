//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads configuration
//! - runs ingestion or one of the three queries
//! - prints text or JSON
//! - writes optional exports

use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use serde::Serialize;
use tracing::debug;

use crate::cli::{
    Cli, Command, IngestArgs, LatestArgs, PlotArgs, SnapshotArgs, TimeseriesArgs,
};
use crate::config::Config;
use crate::data::{BoeClient, FredClient, YieldProvider};
use crate::domain::Country;
use crate::error::CurveError;
use crate::query::QueryEngine;
use crate::store::SqliteStore;

pub mod pipeline;

/// Default ingest look-back when `--start` is omitted.
const INGEST_DEFAULT_DAYS: i64 = 730;
/// Default time-series look-back when `--start` is omitted.
const TIMESERIES_DEFAULT_DAYS: i64 = 365;

/// Entry point for the `yc` binary.
pub fn run() -> Result<(), CurveError> {
    let cli = Cli::parse();
    crate::logging::init_logging(cli.verbose);

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    debug!(db = %config.db_path.display(), "using observation store");

    match cli.command {
        Command::Ingest(args) => handle_ingest(&config, args),
        Command::Latest(args) => handle_latest(&config, args),
        Command::Timeseries(args) => handle_timeseries(&config, args),
        Command::Snapshot(args) => handle_snapshot(&config, args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_ingest(config: &Config, args: IngestArgs) -> Result<(), CurveError> {
    let (start, end) = resolve_window(args.start, args.end, INGEST_DEFAULT_DAYS)?;
    let countries = if args.countries.is_empty() {
        Country::ALL.to_vec()
    } else {
        args.countries
    };

    let mut providers: Vec<Box<dyn YieldProvider>> = Vec::with_capacity(countries.len());
    for country in countries {
        match country {
            Country::Us => providers.push(Box::new(FredClient::new(&config.fred)?)),
            Country::Uk => providers.push(Box::new(BoeClient::new(&config.boe))),
        }
    }
    let providers: Vec<&dyn YieldProvider> = providers.iter().map(|p| p.as_ref()).collect();

    let store = SqliteStore::open(&config.db_path)?;
    let summary = pipeline::run_ingest(&providers, &store, start, end)?;

    for (country, n) in &summary.written {
        println!("{country}: {n} observations stored ({start} to {end})");
    }
    Ok(())
}

fn handle_latest(config: &Config, args: LatestArgs) -> Result<(), CurveError> {
    let engine = QueryEngine::new(SqliteStore::open(&config.db_path)?, args.fit.to_config());
    let point = engine.latest_point(args.country, args.maturity)?;

    if args.json {
        println!("{}", to_json(&point)?);
    } else {
        print!("{}", crate::report::format_point(&point));
    }
    Ok(())
}

fn handle_timeseries(config: &Config, args: TimeseriesArgs) -> Result<(), CurveError> {
    let (start, end) = resolve_window(args.start, args.end, TIMESERIES_DEFAULT_DAYS)?;
    let engine = QueryEngine::new(SqliteStore::open(&config.db_path)?, args.fit.to_config());
    let series = engine.time_series(args.country, args.maturity, start, end)?;

    if args.json {
        println!("{}", to_json(&series)?);
    } else {
        print!("{}", crate::report::format_time_series(&series));
        if !args.no_plot {
            println!();
            print!(
                "{}",
                crate::plot::render_time_series_plot(&series, args.width, args.height)
            );
        }
    }

    if let Some(path) = &args.export {
        crate::io::write_time_series_csv(path, &series)?;
    }
    Ok(())
}

fn handle_snapshot(config: &Config, args: SnapshotArgs) -> Result<(), CurveError> {
    let engine = QueryEngine::new(SqliteStore::open(&config.db_path)?, args.fit.to_config());
    let snapshot = engine.latest_curve_snapshot(args.country)?;

    if args.json {
        println!("{}", to_json(&snapshot)?);
    } else {
        print!("{}", crate::report::format_snapshot(&snapshot));
        if !args.no_plot {
            println!();
            print!(
                "{}",
                crate::plot::render_snapshot_plot(&snapshot, args.width, args.height)
            );
        }
    }

    if let Some(path) = &args.export_curve {
        crate::io::write_curve_json(path, &snapshot)?;
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), CurveError> {
    let snapshot = crate::io::read_curve_json(&args.curve)?;
    print!(
        "{}",
        crate::plot::render_snapshot_plot(&snapshot, args.width, args.height)
    );
    Ok(())
}

/// Fill in a missing `end` (today) and `start` (`default_days` before `end`),
/// then reject inverted windows.
fn resolve_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    default_days: i64,
) -> Result<(NaiveDate, NaiveDate), CurveError> {
    let end = end.unwrap_or_else(|| Local::now().date_naive());
    let start = start.unwrap_or(end - Duration::days(default_days));
    if start > end {
        return Err(CurveError::validation(format!(
            "start date {start} is after end date {end}"
        )));
    }
    Ok((start, end))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CurveError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CurveError::output(format!("failed to encode JSON: {e}")))
}
