//! Least squares solver for the linear (β) part of a curve fit.
//!
//! With the decay time-scales held fixed, every model in this crate is linear
//! in its β coefficients:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! The design matrix is tiny (3–4 columns, a handful of rows), so SVD is cheap
//! and lets us detect rank deficiency explicitly instead of returning a
//! minimum-norm solution that merely looks like a fit.

use nalgebra::{DMatrix, DVector};

/// Singular values below `RANK_TOL * σ_max` are treated as zero.
const RANK_TOL: f64 = 1e-10;

/// Solve a least squares problem using SVD.
///
/// Returns `None` when the design matrix does not have full column rank (for
/// example fewer distinct maturities than coefficients) or when the solution is
/// not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() < x.ncols() || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    if !(sigma_max.is_finite() && sigma_max > 0.0) {
        return None;
    }

    let eps = RANK_TOL * sigma_max;
    if svd.rank(eps) < x.ncols() {
        return None;
    }

    let beta = svd.solve(y, eps).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}
