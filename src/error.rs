//! Error types shared across the crate.
//!
//! `CurveError` is what every public operation returns. Its variants are the
//! failure kinds a caller (the CLI, or any other boundary layer) is expected to
//! map onto its own status codes; `exit_code` is the mapping used by `yc`.

use thiserror::Error;

/// Failures raised by the observation store itself.
///
/// "No rows" is never a `StoreError`: readers return `None` / empty vectors for
/// that, so callers can tell absence apart from a broken store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt observation row: {0}")]
    Corrupt(String),

    #[error("store I/O: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CurveError {
    /// Malformed or out-of-contract caller input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Missing or unusable configuration (e.g. no FRED API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// The store has no data satisfying the request.
    #[error("{0}")]
    NotFound(String),

    /// The curve fit failed for a date's observation set.
    #[error("calibration failed: {0}")]
    Calibration(String),

    /// An external data provider failed or returned unusable data.
    #[error("provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing an export or reading a saved curve failed.
    #[error("output error: {0}")]
    Output(String),
}

impl CurveError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn calibration(message: impl Into<String>) -> Self {
        Self::Calibration(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output(message.into())
    }

    /// Process exit code for the `yc` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CurveError::Validation(_) | CurveError::Config(_) | CurveError::Output(_) => 2,
            CurveError::NotFound(_) => 3,
            CurveError::Calibration(_) | CurveError::Provider(_) => 4,
            CurveError::Store(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_separate_failure_kinds() {
        assert_eq!(CurveError::validation("bad").exit_code(), 2);
        assert_eq!(CurveError::not_found("none").exit_code(), 3);
        assert_eq!(CurveError::calibration("diverged").exit_code(), 4);
        let store = CurveError::from(StoreError::Corrupt("x".into()));
        assert_eq!(store.exit_code(), 5);
    }

    #[test]
    fn not_found_message_is_passed_through() {
        let err = CurveError::not_found("No data found for US");
        assert_eq!(err.to_string(), "No data found for US");
    }
}
