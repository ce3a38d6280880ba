//! `yield-curves` library crate.
//!
//! Fits Nelson-Siegel curves to stored sovereign yield observations and
//! answers point, time-series and snapshot queries against them.
//!
//! The binary (`yc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the query engine can be embedded behind another front end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod query;
pub mod report;
pub mod store;
