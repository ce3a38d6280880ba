//! Query orchestration: resolve dates against the store, fit, evaluate.
//!
//! Every operation acquires one store session up front and lets it drop on
//! return, whichever way the query ends. Curves are fitted fresh for each
//! date and discarded afterwards; nothing is cached between dates or queries.
//!
//! `fit_for_date` is the pure per-date step (read + calibrate), so a
//! `(date, country)` memoisation layer can be slotted in there without
//! touching the three public queries.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{
    Country, CurveSnapshot, FitConfig, FitResult, MaturityYield, PointYield, SeriesPoint,
    TimeSeries,
};
use crate::error::CurveError;
use crate::fit::calibrate;
use crate::store::{ObservationReader, ObservationStore};

/// Number of maturities in a snapshot's dense curve.
pub const SNAPSHOT_GRID_POINTS: usize = 300;
/// Shortest snapshot maturity: one day.
pub const SNAPSHOT_MIN_MATURITY: f64 = 1.0 / 365.0;
/// Longest snapshot maturity (years).
pub const SNAPSHOT_MAX_MATURITY: f64 = 50.0;

/// Read one date's observations and calibrate a curve to them.
pub fn fit_for_date<R: ObservationReader + ?Sized>(
    reader: &R,
    country: Country,
    date: NaiveDate,
    config: &FitConfig,
) -> Result<(Vec<MaturityYield>, FitResult), CurveError> {
    let points = reader.observations_on(country, date)?;
    if points.is_empty() {
        return Err(CurveError::not_found(format!(
            "No data found for {country} on {date}"
        )));
    }

    let maturities: Vec<f64> = points.iter().map(|p| p.maturity).collect();
    let yields: Vec<f64> = points.iter().map(|p| p.yield_).collect();
    let fit = calibrate(&maturities, &yields, config).map_err(|err| match err {
        CurveError::Calibration(msg) => {
            CurveError::Calibration(format!("{country} on {date}: {msg}"))
        }
        other => other,
    })?;

    Ok((points, fit))
}

/// `n` evenly spaced maturities on `[min, max]`.
pub fn maturity_grid(min: f64, max: f64, n: usize) -> Vec<f64> {
    let n = n.max(2);
    (0..n)
        .map(|i| min + (max - min) * i as f64 / (n as f64 - 1.0))
        .collect()
}

/// The engine's entry points, over any observation store.
pub struct QueryEngine<S> {
    store: S,
    fit: FitConfig,
}

impl<S: ObservationStore> QueryEngine<S> {
    pub fn new(store: S, fit: FitConfig) -> Self {
        Self { store, fit }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Yield at `maturity` on the most recent date stored for `country`.
    pub fn latest_point(&self, country: Country, maturity: f64) -> Result<PointYield, CurveError> {
        let session = self.store.session()?;
        let date = latest_date(&session, country)?;
        let (_, fit) = fit_for_date(&session, country, date, &self.fit)?;

        let yield_ = fit.model.evaluate(maturity);
        info!(%country, %date, maturity, yield_, "latest point");
        Ok(PointYield {
            date,
            country,
            maturity,
            yield_,
        })
    }

    /// Yield at `maturity` for every stored date in `[start, end]`.
    ///
    /// Fails fast: the first date that cannot be calibrated aborts the query.
    pub fn time_series(
        &self,
        country: Country,
        maturity: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimeSeries, CurveError> {
        let session = self.store.session()?;
        let dates = session.dates_between(country, start, end)?;
        if dates.is_empty() {
            return Err(CurveError::not_found(format!(
                "No data found for {country} between {start} and {end}"
            )));
        }

        let mut data = Vec::with_capacity(dates.len());
        for date in dates {
            let (_, fit) = fit_for_date(&session, country, date, &self.fit)?;
            data.push(SeriesPoint {
                date,
                yield_: fit.model.evaluate(maturity),
            });
        }

        info!(%country, maturity, %start, %end, points = data.len(), "time series");
        Ok(TimeSeries {
            country,
            maturity,
            data,
        })
    }

    /// The latest curve for `country`: observed points plus a dense grid
    /// from one day to fifty years.
    pub fn latest_curve_snapshot(&self, country: Country) -> Result<CurveSnapshot, CurveError> {
        let session = self.store.session()?;
        let date = latest_date(&session, country)?;
        let (points, fit) = fit_for_date(&session, country, date, &self.fit)?;

        let maturities = maturity_grid(
            SNAPSHOT_MIN_MATURITY,
            SNAPSHOT_MAX_MATURITY,
            SNAPSHOT_GRID_POINTS,
        );
        let curve = maturities
            .iter()
            .zip(fit.model.evaluate_many(&maturities))
            .map(|(&maturity, yield_)| MaturityYield { maturity, yield_ })
            .collect();

        info!(%country, %date, observed = points.len(), "curve snapshot");
        Ok(CurveSnapshot {
            date,
            country,
            model: fit.model,
            quality: fit.quality,
            points,
            curve,
        })
    }
}

fn latest_date<R: ObservationReader + ?Sized>(
    reader: &R,
    country: Country,
) -> Result<NaiveDate, CurveError> {
    let date = reader
        .latest_date(country)?
        .ok_or_else(|| CurveError::not_found(format!("No data found for {country}")))?;
    debug!(%country, %date, "resolved latest date");
    Ok(date)
}
