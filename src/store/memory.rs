//! In-process observation store.
//!
//! Same contract as the SQLite store, kept in a `BTreeMap` so date iteration
//! is naturally ascending. Useful for tests and for embedding the engine
//! without a database file.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::domain::{Country, Observation};
use crate::error::StoreError;
use crate::store::{ObservationReader, ObservationStore, ObservationWriter};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<BTreeMap<(Country, NaiveDate), Vec<Observation>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `observations` (upsert semantics).
    pub fn with_observations(observations: &[Observation]) -> Self {
        let store = Self::new();
        store.insert_all(observations);
        store
    }

    fn insert_all(&self, observations: &[Observation]) {
        let mut rows = self.rows.write();
        for o in observations {
            let day = rows.entry((o.country, o.date)).or_default();
            match day.iter_mut().find(|existing| existing.maturity == o.maturity) {
                Some(existing) => *existing = o.clone(),
                None => day.push(o.clone()),
            }
        }
    }
}

impl ObservationReader for MemoryStore {
    fn latest_date(&self, country: Country) -> Result<Option<NaiveDate>, StoreError> {
        let rows = self.rows.read();
        Ok(rows
            .keys()
            .filter(|(c, _)| *c == country)
            .map(|(_, d)| *d)
            .next_back())
    }

    fn dates_between(
        &self,
        country: Country,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        if start > end {
            return Ok(Vec::new());
        }
        let rows = self.rows.read();
        Ok(rows
            .range((country, start)..=(country, end))
            .filter(|(_, day)| !day.is_empty())
            .map(|((_, d), _)| *d)
            .collect())
    }

    fn observations(
        &self,
        country: Country,
        date: NaiveDate,
    ) -> Result<Vec<Observation>, StoreError> {
        let rows = self.rows.read();
        Ok(rows.get(&(country, date)).cloned().unwrap_or_default())
    }
}

impl ObservationWriter for MemoryStore {
    fn upsert(&self, observations: &[Observation]) -> Result<usize, StoreError> {
        self.insert_all(observations);
        Ok(observations.len())
    }
}

impl ObservationStore for MemoryStore {
    type Session<'a> = &'a MemoryStore;

    fn session(&self) -> Result<&MemoryStore, StoreError> {
        Ok(self)
    }
}
