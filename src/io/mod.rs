//! File input/output.
//!
//! - curve snapshot JSON read/write (`curve`)
//! - time-series CSV export (`export`)

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;
