//! Ingestion pipeline shared by the CLI and tests.
//!
//! provider fetch -> observations -> one store session -> upsert
//!
//! Every provider is fetched before anything is written, so a provider failure
//! leaves the store untouched.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::data::YieldProvider;
use crate::domain::{Country, Observation};
use crate::error::CurveError;
use crate::store::{ObservationStore, ObservationWriter};

/// Per-country row counts written by one ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub written: BTreeMap<Country, usize>,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.written.values().sum()
    }
}

/// Fetch `[start, end]` from every provider and upsert the results.
pub fn run_ingest<S: ObservationStore>(
    providers: &[&dyn YieldProvider],
    store: &S,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<IngestSummary, CurveError> {
    if start > end {
        return Err(CurveError::validation(format!(
            "start date {start} is after end date {end}"
        )));
    }

    let mut batches: Vec<(Country, Vec<Observation>)> = Vec::with_capacity(providers.len());
    for provider in providers {
        let country = provider.country();
        let observations = provider.fetch(start, end)?;
        info!(%country, n = observations.len(), "fetched observations");
        batches.push((country, observations));
    }

    let session = store.session()?;
    let mut summary = IngestSummary::default();
    for (country, observations) in batches {
        let n = session.upsert(&observations)?;
        *summary.written.entry(country).or_default() += n;
    }
    info!(total = summary.total(), "ingest complete");
    Ok(summary)
}
