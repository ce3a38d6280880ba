//! Nelson–Siegel family model implementations.
//!
//! Models are implemented as small, pure functions so that fitting/search code can
//! stay generic; `CurveModel::evaluate` wraps them for callers.

pub mod model;

pub use model::*;
