//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - observation records (`Country`, `Instrument`, `Observation`, `MaturityYield`)
//! - calibration settings and outputs (`FitConfig`, `CurveModel`, `FitResult`)
//! - query results (`PointYield`, `TimeSeries`, `CurveSnapshot`)

pub mod types;

pub use types::*;
