//! Plain-text formatting of query results.
//!
//! Formatting lives here so the query and fitting code never build strings
//! for humans. JSON output is produced directly from the domain types.

pub mod format;

pub use format::*;
