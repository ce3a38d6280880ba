//! FRED API integration for US Treasury constant-maturity yields.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::FredConfig;
use crate::data::{label_to_years, parse_percent, YieldProvider};
use crate::domain::{Country, Instrument, Observation};
use crate::error::CurveError;

/// Constant-maturity Treasury series, by tenor label.
pub const TREASURY_SERIES: [(&str, &str); 10] = [
    ("1M", "DGS1MO"),
    ("3M", "DGS3MO"),
    ("6M", "DGS6MO"),
    ("1Y", "DGS1"),
    ("2Y", "DGS2"),
    ("5Y", "DGS5"),
    ("7Y", "DGS7"),
    ("10Y", "DGS10"),
    ("20Y", "DGS20"),
    ("30Y", "DGS30"),
];

pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(config: &FredConfig) -> Result<Self, CurveError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            CurveError::Config("missing FRED_API_KEY in environment (.env)".into())
        })?;
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetch one series as `(date, decimal yield)` pairs; missing values are skipped.
    pub fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, CurveError> {
        let start = start.to_string();
        let end = end.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .map_err(|e| CurveError::provider(format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(CurveError::provider(format!(
                "FRED request for {series_id} failed with status {}",
                resp.status()
            )));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| CurveError::provider(format!("failed to parse FRED response: {e}")))?;

        series_points(series_id, body)
    }
}

impl YieldProvider for FredClient {
    fn country(&self) -> Country {
        Country::Us
    }

    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, CurveError> {
        let mut out = Vec::new();
        for (label, series_id) in TREASURY_SERIES {
            let maturity = label_to_years(label).ok_or_else(|| {
                CurveError::provider(format!("unrecognised tenor label '{label}'"))
            })?;
            let points = self.fetch_series(series_id, start, end)?;
            debug!(series_id, maturity, n = points.len(), "fetched FRED series");

            out.extend(points.into_iter().map(|(date, yield_)| Observation {
                date,
                country: Country::Us,
                instrument: Instrument::Treasury,
                maturity,
                yield_,
            }));
        }
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

fn series_points(
    series_id: &str,
    body: ObservationsResponse,
) -> Result<Vec<(NaiveDate, f64)>, CurveError> {
    let mut out = Vec::with_capacity(body.observations.len());
    let mut skipped = 0usize;
    for obs in body.observations {
        // FRED marks holidays and gaps with "."
        let Some(value) = parse_percent(&obs.value) else {
            skipped += 1;
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
            CurveError::provider(format!("invalid FRED date '{}': {e}", obs.date))
        })?;
        out.push((date, value));
    }
    if skipped > 0 {
        warn!(series_id, skipped, "skipped missing FRED observations");
    }
    Ok(out)
}
