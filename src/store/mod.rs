//! Observation storage.
//!
//! The engine only talks to storage through these traits:
//!
//! - `ObservationReader`: the three read queries the engine needs
//! - `ObservationWriter`: last-write-wins upsert keyed by `(date, country, maturity)`
//! - `ObservationStore`: hands out a scoped session; dropping the session
//!   releases whatever it holds (for SQLite, the connection)
//!
//! "No rows" is reported as `None` / an empty vector, never as an error.

use chrono::NaiveDate;

use crate::domain::{Country, MaturityYield, Observation};
use crate::error::StoreError;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteSession, SqliteStore};

pub trait ObservationReader {
    /// Most recent date with any observation for `country`.
    fn latest_date(&self, country: Country) -> Result<Option<NaiveDate>, StoreError>;

    /// Distinct observation dates in `[start, end]`, ascending.
    fn dates_between(
        &self,
        country: Country,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError>;

    /// Every stored observation for `country` on `date`.
    fn observations(
        &self,
        country: Country,
        date: NaiveDate,
    ) -> Result<Vec<Observation>, StoreError>;

    /// The `(maturity, yield)` pairs recorded for `country` on `date`.
    fn observations_on(
        &self,
        country: Country,
        date: NaiveDate,
    ) -> Result<Vec<MaturityYield>, StoreError> {
        Ok(self
            .observations(country, date)?
            .into_iter()
            .map(|o| MaturityYield {
                maturity: o.maturity,
                yield_: o.yield_,
            })
            .collect())
    }
}

pub trait ObservationWriter {
    /// Insert or replace each observation; returns the number written.
    fn upsert(&self, observations: &[Observation]) -> Result<usize, StoreError>;
}

pub trait ObservationStore {
    type Session<'a>: ObservationReader + ObservationWriter
    where
        Self: 'a;

    /// Acquire a session. It is released when dropped.
    fn session(&self) -> Result<Self::Session<'_>, StoreError>;
}

impl<T: ObservationReader + ?Sized> ObservationReader for &T {
    fn latest_date(&self, country: Country) -> Result<Option<NaiveDate>, StoreError> {
        (**self).latest_date(country)
    }

    fn dates_between(
        &self,
        country: Country,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        (**self).dates_between(country, start, end)
    }

    fn observations(
        &self,
        country: Country,
        date: NaiveDate,
    ) -> Result<Vec<Observation>, StoreError> {
        (**self).observations(country, date)
    }
}

impl<T: ObservationWriter + ?Sized> ObservationWriter for &T {
    fn upsert(&self, observations: &[Observation]) -> Result<usize, StoreError> {
        (**self).upsert(observations)
    }
}
