//! Export a yield time series to CSV.
//!
//! One row per date: `date,country,maturity,yield` with the yield as a decimal.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Country, TimeSeries};
use crate::error::CurveError;

#[derive(Debug, Serialize)]
struct SeriesRow {
    date: NaiveDate,
    country: Country,
    maturity: f64,
    #[serde(rename = "yield")]
    yield_: f64,
}

/// Write `series` to a CSV file at `path`.
pub fn write_time_series_csv(path: &Path, series: &TimeSeries) -> Result<(), CurveError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        CurveError::output(format!("failed to create export CSV '{}': {e}", path.display()))
    })?;

    for point in &series.data {
        writer
            .serialize(SeriesRow {
                date: point.date,
                country: series.country,
                maturity: series.maturity,
                yield_: point.yield_,
            })
            .map_err(|e| CurveError::output(format!("failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| CurveError::output(format!("failed to flush export CSV: {e}")))
}
