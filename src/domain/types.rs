//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - read from / written to the observation store
//! - used in-memory during fitting
//! - printed as JSON by the CLI, or saved and reloaded for plotting
//!
//! Units are fixed crate-wide: maturities are in **years** (`f64`), yields are
//! **decimal fractions** (4.25% is `0.0425`).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CurveError;

/// Sovereign curve the observations belong to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum Country {
    #[serde(rename = "US")]
    #[value(name = "US")]
    Us,
    #[serde(rename = "UK")]
    #[value(name = "UK")]
    Uk,
}

impl Country {
    pub const ALL: [Country; 2] = [Country::Us, Country::Uk];

    /// Code stored in the `country` column and shown to users.
    pub fn code(self) -> &'static str {
        match self {
            Country::Us => "US",
            Country::Uk => "UK",
        }
    }

    /// The benchmark government instrument quoted for this country.
    pub fn instrument(self) -> Instrument {
        match self {
            Country::Us => Instrument::Treasury,
            Country::Uk => Instrument::Gilt,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Country::Us),
            "UK" | "GB" => Ok(Country::Uk),
            other => Err(CurveError::validation(format!(
                "unknown country code '{other}' (expected US or UK)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    Treasury,
    Gilt,
}

impl Instrument {
    pub fn as_str(self) -> &'static str {
        match self {
            Instrument::Treasury => "Treasury",
            Instrument::Gilt => "Gilt",
        }
    }

    /// Parse the stored column value; `None` for anything unrecognised.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Treasury" => Some(Instrument::Treasury),
            "Gilt" => Some(Instrument::Gilt),
            _ => None,
        }
    }
}

/// One raw yield observation.
///
/// Identity is `(date, country, maturity)`; writing the same identity again
/// replaces the yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub country: Country,
    pub instrument: Instrument,
    pub maturity: f64,
    #[serde(rename = "yield")]
    pub yield_: f64,
}

/// A `(maturity, yield)` pair: what a single date contributes to a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaturityYield {
    pub maturity: f64,
    #[serde(rename = "yield")]
    pub yield_: f64,
}

/// Which model(s) to calibrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    /// Classic Nelson–Siegel.
    Ns,
    /// Nelson–Siegel–Svensson (second curvature/decay pair).
    Nss,
    /// Fit every model the data supports and pick by BIC.
    Auto,
}

/// Concrete fitted model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Ns,
    Nss,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Ns => "Nelson-Siegel",
            ModelKind::Nss => "Nelson-Siegel-Svensson",
        }
    }

    /// Number of β coefficients (linear parameters).
    pub fn beta_len(self) -> usize {
        match self {
            ModelKind::Ns => 3,
            ModelKind::Nss => 4,
        }
    }

    /// Number of decay time-scales τ.
    pub fn tau_len(self) -> usize {
        match self {
            ModelKind::Ns => 1,
            ModelKind::Nss => 2,
        }
    }

    /// Total parameter count for information criteria (βs + τs).
    pub fn param_count(self) -> usize {
        self.beta_len() + self.tau_len()
    }
}

/// Calibration settings.
///
/// Passed explicitly into the query engine; there is no process-wide default
/// other than `FitConfig::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub model: ModelSpec,
    /// Smallest decay time-scale searched (years).
    pub tau_min: f64,
    /// Largest decay time-scale searched (years).
    pub tau_max: f64,
    /// Grid points for the NS τ search.
    pub tau_steps_ns: usize,
    /// Grid points per dimension for the NSS τ search.
    pub tau_steps_nss: usize,
    /// NSS requires `τ2 >= τ1 * tau_min_ratio` so the two humps stay distinct.
    pub tau_min_ratio: f64,
    /// Polish the best grid τ with a golden-section search.
    pub refine: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            model: ModelSpec::Ns,
            tau_min: 0.05,
            tau_max: 30.0,
            tau_steps_ns: 60,
            tau_steps_nss: 25,
            tau_min_ratio: 1.5,
            refine: true,
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub bic: f64,
    pub n: usize,
}

/// Calibrated curve parameters.
///
/// Evaluation lives in `crate::models`; see `CurveModel::evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveModel {
    pub kind: ModelKind,
    pub betas: Vec<f64>,
    pub taus: Vec<f64>,
}

/// Calibration output: the curve plus how well it fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: CurveModel,
    pub quality: FitQuality,
}

/// Yield at one maturity on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointYield {
    pub date: NaiveDate,
    pub country: Country,
    pub maturity: f64,
    #[serde(rename = "yield")]
    pub yield_: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    #[serde(rename = "yield")]
    pub yield_: f64,
}

/// Yield at one maturity across a date range, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub country: Country,
    pub maturity: f64,
    pub data: Vec<SeriesPoint>,
}

/// The latest fitted curve: observed points plus a dense evaluation grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveSnapshot {
    pub date: NaiveDate,
    pub country: Country,
    pub model: CurveModel,
    pub quality: FitQuality,
    pub points: Vec<MaturityYield>,
    pub curve: Vec<MaturityYield>,
}
