//! Bank of England interactive database (IADB) client for UK gilt yields.
//!
//! The IADB CSV export has one `DATE` column followed by one column per
//! requested series code; dates look like `02 Jan 2024` and yields are in
//! percent. Blank cells mean no observation.

use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::config::BoeConfig;
use crate::data::{parse_percent, YieldProvider};
use crate::domain::{Country, Instrument, Observation};
use crate::error::CurveError;

/// Nominal par yield series, by series code, with maturity in years.
pub const GILT_SERIES: [(&str, f64); 3] = [("IUDSNPY", 5.0), ("IUDMNPY", 10.0), ("IUDLNPY", 20.0)];

const IADB_DATE_FORMAT: &str = "%d %b %Y";
/// The query-string date format the IADB expects, e.g. `01/Jan/2024`.
const IADB_QUERY_DATE_FORMAT: &str = "%d/%b/%Y";

pub struct BoeClient {
    client: Client,
    base_url: String,
}

impl BoeClient {
    pub fn new(config: &BoeConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    fn fetch_csv(&self, start: NaiveDate, end: NaiveDate) -> Result<String, CurveError> {
        let codes = GILT_SERIES.map(|(code, _)| code).join(",");
        let start = start.format(IADB_QUERY_DATE_FORMAT).to_string();
        let end = end.format(IADB_QUERY_DATE_FORMAT).to_string();

        let resp = self
            .client
            .get(&self.base_url)
            // The IADB rejects requests without a browser-like agent and referer.
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
            .header(
                reqwest::header::REFERER,
                "https://www.bankofengland.co.uk/boeapps/database/",
            )
            .query(&[
                ("csv.x", "yes"),
                ("Datefrom", start.as_str()),
                ("Dateto", end.as_str()),
                ("SeriesCodes", codes.as_str()),
                ("UsingCodes", "Y"),
                ("CSVF", "TN"),
            ])
            .send()
            .map_err(|e| CurveError::provider(format!("BoE request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(CurveError::provider(format!(
                "BoE request failed with status {}",
                resp.status()
            )));
        }

        resp.text()
            .map_err(|e| CurveError::provider(format!("failed to read BoE response: {e}")))
    }
}

impl YieldProvider for BoeClient {
    fn country(&self) -> Country {
        Country::Uk
    }

    fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, CurveError> {
        let body = self.fetch_csv(start, end)?;
        let observations = parse_gilt_csv(&body)?;
        debug!(n = observations.len(), "fetched BoE gilt yields");
        Ok(observations)
    }
}

/// Parse an IADB CSV export into gilt observations.
pub fn parse_gilt_csv(body: &str) -> Result<Vec<Observation>, CurveError> {
    let maturities: HashMap<&str, f64> = GILT_SERIES.into_iter().collect();

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CurveError::provider(format!("failed to read BoE CSV headers: {e}")))?
        .clone();

    let date_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("DATE"))
        .ok_or_else(|| CurveError::provider("BoE CSV has no DATE column"))?;

    let mut columns = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == date_col {
            continue;
        }
        match maturities.get(header) {
            Some(&maturity) => columns.push((idx, maturity)),
            None => warn!(column = header, "ignoring unknown BoE series column"),
        }
    }

    let mut out = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| CurveError::provider(format!("BoE CSV parse error: {e}")))?;
        let raw_date = record.get(date_col).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, IADB_DATE_FORMAT).map_err(|e| {
            CurveError::provider(format!(
                "invalid BoE date '{raw_date}' on line {}: {e}",
                line + 2
            ))
        })?;

        for &(idx, maturity) in &columns {
            let Some(yield_) = record.get(idx).and_then(parse_percent) else {
                continue;
            };
            out.push(Observation {
                date,
                country: Country::Uk,
                instrument: Instrument::Gilt,
                maturity,
                yield_,
            });
        }
    }

    Ok(out)
}
