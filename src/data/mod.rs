//! External yield providers.
//!
//! - `fred`: US Treasury constant-maturity yields from the FRED API (JSON)
//! - `boe`: UK gilt par yields from the Bank of England database (CSV)
//!
//! Both normalise to `Observation`s in crate units (years, decimal yields).

use chrono::NaiveDate;

use crate::domain::{Country, Observation};
use crate::error::CurveError;

pub mod boe;
pub mod fred;

pub use boe::BoeClient;
pub use fred::FredClient;

/// A source of raw observations for one country.
pub trait YieldProvider {
    fn country(&self) -> Country;

    /// Every observation published in `[start, end]`.
    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, CurveError>;
}

/// Convert a tenor label such as `1M`, `6M`, `10Y` to years.
pub fn label_to_years(label: &str) -> Option<f64> {
    let label = label.trim();
    let unit = label.chars().last()?;
    let count: f64 = label[..label.len() - unit.len_utf8()].parse().ok()?;
    if !(count.is_finite() && count > 0.0) {
        return None;
    }
    match unit {
        'M' | 'm' => Some(count / 12.0),
        'Y' | 'y' => Some(count),
        _ => None,
    }
}

/// Parse a quoted percentage into a decimal yield; blank and `.` mean missing.
pub(crate) fn parse_percent(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v / 100.0) } else { None }
}
