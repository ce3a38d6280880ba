//! Model evaluation for NS / NSS.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given maturity and taus (for least squares)
//! - predict y(m) given betas and taus (for residuals and queries)
//!
//! `CurveModel::evaluate` is the public face of `predict`: closed form, no
//! iteration, and no check against the range of maturities that was observed.

use crate::domain::{CurveModel, ModelKind};
use crate::math::{curvature_loading, slope_loading};

/// Fill a design row for the given model kind.
///
/// The row includes the level term first.
///
/// # Panics
/// Panics if `out` is shorter than `model.beta_len()` or `taus` shorter than
/// `model.tau_len()`. Callers size these from the model kind.
pub fn fill_design_row(model: ModelKind, m: f64, taus: &[f64], out: &mut [f64]) {
    out[0] = 1.0;
    out[1] = slope_loading(m, taus[0]);
    out[2] = curvature_loading(m, taus[0]);
    if model == ModelKind::Nss {
        out[3] = curvature_loading(m, taus[1]);
    }
}

/// Predict `y(m)` for the given model kind.
pub fn predict(model: ModelKind, m: f64, betas: &[f64], taus: &[f64]) -> f64 {
    let ns = betas[0]
        + betas[1] * slope_loading(m, taus[0])
        + betas[2] * curvature_loading(m, taus[0]);
    match model {
        ModelKind::Ns => ns,
        ModelKind::Nss => ns + betas[3] * curvature_loading(m, taus[1]),
    }
}

impl CurveModel {
    /// Yield (decimal) at `maturity` years.
    pub fn evaluate(&self, maturity: f64) -> f64 {
        predict(self.kind, maturity, &self.betas, &self.taus)
    }

    pub fn evaluate_many(&self, maturities: &[f64]) -> Vec<f64> {
        maturities.iter().map(|&m| self.evaluate(m)).collect()
    }

    /// Instantaneous short rate implied by the curve, `β0 + β1`.
    pub fn short_rate(&self) -> f64 {
        self.betas[0] + self.betas[1]
    }

    /// Long-run level the curve converges to, `β0`.
    pub fn long_rate(&self) -> f64 {
        self.betas[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns_curve() -> CurveModel {
        CurveModel {
            kind: ModelKind::Ns,
            betas: vec![0.045, -0.015, 0.01],
            taus: vec![2.0],
        }
    }

    #[test]
    fn evaluate_at_zero_is_short_rate() {
        let curve = ns_curve();
        assert!((curve.evaluate(0.0) - curve.short_rate()).abs() < 1e-12);
    }

    #[test]
    fn evaluate_converges_to_level_when_extrapolating() {
        let curve = ns_curve();
        let far = curve.evaluate(10_000.0);
        assert!(far.is_finite());
        assert!((far - curve.long_rate()).abs() < 1e-4);
    }

    #[test]
    fn nss_with_zero_second_hump_matches_ns() {
        let ns = ns_curve();
        let nss = CurveModel {
            kind: ModelKind::Nss,
            betas: vec![0.045, -0.015, 0.01, 0.0],
            taus: vec![2.0, 8.0],
        };
        for m in [0.1, 1.0, 7.3, 30.0] {
            assert!((ns.evaluate(m) - nss.evaluate(m)).abs() < 1e-15);
        }
    }

    #[test]
    fn evaluate_many_matches_pointwise_evaluation() {
        let curve = ns_curve();
        let maturities = [0.0, 0.5, 10.0, 50.0];
        let many = curve.evaluate_many(&maturities);
        assert_eq!(many.len(), maturities.len());
        for (&m, y) in maturities.iter().zip(many) {
            assert_eq!(y, curve.evaluate(m));
        }
    }

    #[test]
    fn design_row_reproduces_prediction() {
        let curve = CurveModel {
            kind: ModelKind::Nss,
            betas: vec![0.04, -0.01, 0.02, -0.005],
            taus: vec![1.5, 9.0],
        };
        let mut row = [0.0; 4];
        fill_design_row(curve.kind, 5.0, &curve.taus, &mut row);
        let dot: f64 = row.iter().zip(&curve.betas).map(|(x, b)| x * b).sum();
        assert!((dot - curve.evaluate(5.0)).abs() < 1e-15);
    }
}
