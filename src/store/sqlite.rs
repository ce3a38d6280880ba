//! SQLite-backed observation store.
//!
//! One table, keyed by `(date, country, maturity)`:
//!
//! ```text
//! yields(date TEXT, country TEXT, instrument TEXT, maturity REAL, yield REAL)
//! ```
//!
//! Dates are stored as ISO `YYYY-MM-DD` text, so lexical order is date order.
//! Every session opens its own connection and closes it on drop.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::domain::{Country, Instrument, Observation};
use crate::error::StoreError;
use crate::store::{ObservationReader, ObservationStore, ObservationWriter};

/// Create the `yields` table if it does not exist.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS yields (
            date TEXT NOT NULL,
            country TEXT NOT NULL,
            instrument TEXT NOT NULL,
            maturity REAL NOT NULL,
            yield REAL NOT NULL,
            PRIMARY KEY (date, country, maturity)
        )",
        [],
    )?;
    Ok(())
}

/// Handle to an on-disk database; cheap to share, holds no connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        init_schema(&conn)?;
        debug!(path = %path.display(), "opened observation store");

        Ok(Self { path })
    }
}

impl ObservationStore for SqliteStore {
    type Session<'a> = SqliteSession;

    fn session(&self) -> Result<SqliteSession, StoreError> {
        Ok(SqliteSession {
            conn: Connection::open(&self.path)?,
        })
    }
}

/// A live connection; closed when dropped.
pub struct SqliteSession {
    conn: Connection,
}

impl ObservationReader for SqliteSession {
    fn latest_date(&self, country: Country) -> Result<Option<NaiveDate>, StoreError> {
        let date = self
            .conn
            .query_row(
                "SELECT date FROM yields WHERE country = ?1 ORDER BY date DESC LIMIT 1",
                params![country.code()],
                |row| row.get::<_, NaiveDate>(0),
            )
            .optional()?;
        Ok(date)
    }

    fn dates_between(
        &self,
        country: Country,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT date FROM yields
             WHERE country = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date",
        )?;
        let dates = stmt
            .query_map(params![country.code(), start, end], |row| row.get(0))?
            .collect::<Result<Vec<NaiveDate>, _>>()?;
        Ok(dates)
    }

    fn observations(
        &self,
        country: Country,
        date: NaiveDate,
    ) -> Result<Vec<Observation>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT instrument, maturity, yield FROM yields
             WHERE date = ?1 AND country = ?2
             ORDER BY maturity",
        )?;
        let rows = stmt
            .query_map(params![date, country.code()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(instrument, maturity, yield_)| {
                let instrument = Instrument::parse(&instrument).ok_or_else(|| {
                    StoreError::Corrupt(format!(
                        "unknown instrument '{instrument}' for {country} on {date}"
                    ))
                })?;
                Ok(Observation {
                    date,
                    country,
                    instrument,
                    maturity,
                    yield_,
                })
            })
            .collect()
    }
}

impl ObservationWriter for SqliteSession {
    fn upsert(&self, observations: &[Observation]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO yields (date, country, instrument, maturity, yield)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for o in observations {
                stmt.execute(params![
                    o.date,
                    o.country.code(),
                    o.instrument.as_str(),
                    o.maturity,
                    o.yield_,
                ])?;
            }
        }
        tx.commit()?;
        debug!(rows = observations.len(), "upserted observations");
        Ok(observations.len())
    }
}
