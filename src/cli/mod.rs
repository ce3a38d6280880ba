//! Command-line parsing for `yc`.
//!
//! The goal of this module is to keep **argument parsing** and **input
//! validation** separate from the query engine: malformed countries, dates and
//! maturities are rejected here, before any store access.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Country, FitConfig, ModelSpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "yc", version, about = "Sovereign yield curve engine (Nelson-Siegel)")]
pub struct Cli {
    /// SQLite observation store (overrides YC_DB_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch observations from FRED / the Bank of England into the store.
    Ingest(IngestArgs),
    /// Yield at one maturity on the latest stored date.
    Latest(LatestArgs),
    /// Yield at one maturity across a date range.
    Timeseries(TimeseriesArgs),
    /// The latest fitted curve with observed points.
    Snapshot(SnapshotArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// First date to fetch (YYYY-MM-DD). Defaults to two years before `--end`.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last date to fetch (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Countries to ingest; repeat for several. Defaults to all.
    #[arg(long = "country", value_enum, ignore_case = true)]
    pub countries: Vec<Country>,
}

#[derive(Debug, Args)]
pub struct LatestArgs {
    #[arg(long, value_enum, ignore_case = true)]
    pub country: Country,

    /// Maturity in years.
    #[arg(long, value_parser = parse_maturity, allow_negative_numbers = true)]
    pub maturity: f64,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub fit: FitArgs,
}

#[derive(Debug, Args)]
pub struct TimeseriesArgs {
    #[arg(long, value_enum, ignore_case = true)]
    pub country: Country,

    /// Maturity in years.
    #[arg(long, value_parser = parse_maturity, allow_negative_numbers = true)]
    pub maturity: f64,

    /// First date (YYYY-MM-DD). Defaults to one year before `--end`.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    #[arg(long)]
    pub json: bool,

    /// Skip the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also write the series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub fit: FitArgs,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[arg(long, value_enum, ignore_case = true)]
    pub country: Country,

    #[arg(long)]
    pub json: bool,

    /// Skip the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Save the snapshot as curve JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,

    #[command(flatten)]
    pub fit: FitArgs,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Curve JSON file produced by `yc snapshot --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    #[arg(long, default_value_t = 100)]
    pub width: usize,

    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Calibration options shared by the query commands.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Which model(s) to fit.
    #[arg(long, value_enum, default_value_t = ModelSpec::Ns)]
    pub model: ModelSpec,

    /// Minimum tau (years) for grid search.
    #[arg(long, default_value_t = 0.05)]
    pub tau_min: f64,

    /// Maximum tau (years) for grid search.
    #[arg(long, default_value_t = 30.0)]
    pub tau_max: f64,

    /// Tau grid steps for NS.
    #[arg(long, default_value_t = 60)]
    pub tau_steps_ns: usize,

    /// Tau grid steps per dimension for NSS.
    #[arg(long, default_value_t = 25)]
    pub tau_steps_nss: usize,
}

impl FitArgs {
    pub fn to_config(&self) -> FitConfig {
        FitConfig {
            model: self.model,
            tau_min: self.tau_min,
            tau_max: self.tau_max,
            tau_steps_ns: self.tau_steps_ns,
            tau_steps_nss: self.tau_steps_nss,
            ..FitConfig::default()
        }
    }
}

/// Maturities must be finite and non-negative (years).
pub fn parse_maturity(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("maturity must be finite, got {raw}"));
    }
    if value < 0.0 {
        return Err(format!("maturity must be non-negative, got {raw}"));
    }
    Ok(value)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("'{raw}' is not a YYYY-MM-DD date: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn latest_parses_country_case_insensitively() {
        let cli = Cli::try_parse_from(["yc", "latest", "--country", "uk", "--maturity", "7.5"])
            .unwrap();
        let Command::Latest(args) = cli.command else {
            panic!("expected latest");
        };
        assert_eq!(args.country, Country::Uk);
        assert_eq!(args.maturity, 7.5);
        assert_eq!(args.fit.to_config(), FitConfig::default());
    }

    #[test]
    fn zero_maturity_is_accepted() {
        assert_eq!(parse_maturity("0"), Ok(0.0));
    }

    #[test]
    fn negative_and_non_finite_maturities_are_rejected() {
        for bad in ["-1", "NaN", "inf", "ten"] {
            assert!(parse_maturity(bad).is_err(), "{bad}");
        }
        let res = Cli::try_parse_from(["yc", "latest", "--country", "US", "--maturity", "-1"]);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_country_is_rejected() {
        let res = Cli::try_parse_from(["yc", "latest", "--country", "DE", "--maturity", "10"]);
        assert!(res.is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "yc",
            "snapshot",
            "--country",
            "US",
            "--db",
            "/tmp/x.db",
            "-v",
            "--model",
            "auto",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        let Command::Snapshot(args) = cli.command else {
            panic!("expected snapshot");
        };
        assert_eq!(args.fit.model, ModelSpec::Auto);
    }

    #[test]
    fn ingest_accepts_repeated_countries() {
        let cli = Cli::try_parse_from([
            "yc", "ingest", "--country", "US", "--country", "UK", "--start", "2024-01-01",
        ])
        .unwrap();
        let Command::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(args.countries, vec![Country::Us, Country::Uk]);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.end, None);
    }

    #[test]
    fn timeseries_plot_flags() {
        let cli = Cli::try_parse_from(["yc", "timeseries", "--country", "US", "--maturity", "10"])
            .unwrap();
        let Command::Timeseries(args) = cli.command else {
            panic!("expected timeseries");
        };
        assert!(!args.no_plot);
        assert_eq!((args.width, args.height), (100, 25));

        let cli = Cli::try_parse_from([
            "yc", "timeseries", "--country", "UK", "--maturity", "5", "--no-plot", "--width", "60",
        ])
        .unwrap();
        let Command::Timeseries(args) = cli.command else {
            panic!("expected timeseries");
        };
        assert!(args.no_plot);
        assert_eq!(args.width, 60);
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("03/06/2024").is_err());
    }
}
