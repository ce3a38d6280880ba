//! Read/write curve JSON files.
//!
//! Curve JSON is the portable form of a `CurveSnapshot`: model kind and
//! parameters, fit quality, the observed points and the dense fitted grid.
//! `yc plot --curve` re-renders one without touching the store.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::CurveSnapshot;
use crate::error::CurveError;

const TOOL_NAME: &str = "yc";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    #[serde(flatten)]
    pub snapshot: CurveSnapshot,
}

/// Write a snapshot as pretty-printed curve JSON.
pub fn write_curve_json(path: &Path, snapshot: &CurveSnapshot) -> Result<(), CurveError> {
    let file = File::create(path).map_err(|e| {
        CurveError::output(format!("failed to create curve JSON '{}': {e}", path.display()))
    })?;

    let curve = CurveFile {
        tool: TOOL_NAME.to_string(),
        snapshot: snapshot.clone(),
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &curve)
        .map_err(|e| CurveError::output(format!("failed to write curve JSON: {e}")))
}

/// Read a curve JSON file back into a snapshot.
pub fn read_curve_json(path: &Path) -> Result<CurveSnapshot, CurveError> {
    let file = File::open(path).map_err(|e| {
        CurveError::output(format!("failed to open curve JSON '{}': {e}", path.display()))
    })?;
    let curve: CurveFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CurveError::output(format!("invalid curve JSON: {e}")))?;

    let snapshot = curve.snapshot;
    let model = &snapshot.model;
    if model.betas.len() != model.kind.beta_len() || model.taus.len() != model.kind.tau_len() {
        return Err(CurveError::output(format!(
            "curve JSON has {} betas and {} taus, which does not match a {} model",
            model.betas.len(),
            model.taus.len(),
            model.kind.display_name()
        )));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, CurveModel, FitQuality, MaturityYield, ModelKind};
    use chrono::NaiveDate;

    fn snapshot() -> CurveSnapshot {
        let model = CurveModel {
            kind: ModelKind::Ns,
            betas: vec![0.04, -0.01, 0.005],
            taus: vec![2.0],
        };
        CurveSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            country: Country::Us,
            curve: [0.5, 10.0]
                .into_iter()
                .map(|m| MaturityYield {
                    maturity: m,
                    yield_: model.evaluate(m),
                })
                .collect(),
            model,
            quality: FitQuality {
                sse: 1e-8,
                rmse: 1e-4,
                bic: -120.0,
                n: 8,
            },
            points: vec![MaturityYield {
                maturity: 10.0,
                yield_: 0.041,
            }],
        }
    }

    #[test]
    fn written_curve_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.json");
        let original = snapshot();

        write_curve_json(&path, &original).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["tool"], "yc");
        assert_eq!(raw["country"], "US");
        assert_eq!(raw["model"]["kind"], "ns");

        let loaded = read_curve_json(&path).unwrap();
        assert_eq!(loaded.model, original.model);
        assert_eq!(loaded.curve, original.curve);
        assert_eq!(loaded.date, original.date);
    }

    #[test]
    fn parameter_count_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.json");
        let mut bad = snapshot();
        bad.model.kind = ModelKind::Nss;
        write_curve_json(&path, &bad).unwrap();

        assert!(matches!(read_curve_json(&path), Err(CurveError::Output(_))));
    }

    #[test]
    fn missing_file_is_an_output_error() {
        let err = read_curve_json(Path::new("/nonexistent/curve.json")).unwrap_err();
        assert!(matches!(err, CurveError::Output(_)));
    }
}
