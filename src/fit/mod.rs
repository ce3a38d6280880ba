//! Curve calibration.
//!
//! Responsibilities:
//!
//! - generate tau grids for NS / NSS
//! - evaluate each candidate tau tuple (parallel) and polish the winner
//! - validate inputs and pick a model (`calibrate`)

pub mod calibrate;
pub mod fitter;
pub mod tau_grid;

pub use calibrate::*;
pub use fitter::*;
pub use tau_grid::*;
