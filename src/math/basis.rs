//! Factor loadings of the Nelson–Siegel family.
//!
//! For a maturity `m` (years) and decay time-scale `τ`, with `x = m/τ`:
//!
//! - slope loading:     `(1 - e^{-x}) / x`
//! - curvature loading: `(1 - e^{-x}) / x - e^{-x}`
//!
//! The level loading is the constant `1`.
//!
//! Numerical notes:
//! - `1 - e^{-x}` is computed with `expm1` to avoid cancellation for small `x`,
//!   with a short series below `SMALL_X`.
//! - At `m = 0` the analytic limits apply: slope → 1, curvature → 0. Maturity
//!   zero is a legal query, so it must not produce `NaN`.

/// Floor applied to the maturity before dividing by it.
const M_EPS: f64 = 1e-12;

/// Below this `x` the series expansions are more accurate than `expm1 / x`.
const SMALL_X: f64 = 1e-6;

/// Slope factor loading at maturity `m` for decay `tau`.
pub fn slope_loading(m: f64, tau: f64) -> f64 {
    let x = m.max(M_EPS) / tau;

    if x.abs() < SMALL_X {
        // (1 - e^{-x}) / x ≈ 1 - x/2 + x^2/6
        return 1.0 - x / 2.0 + (x * x) / 6.0;
    }

    -(-x).exp_m1() / x
}

/// Curvature (hump) factor loading at maturity `m` for decay `tau`.
pub fn curvature_loading(m: f64, tau: f64) -> f64 {
    let x = m.max(M_EPS) / tau;

    if x.abs() < SMALL_X {
        // slope ≈ 1 - x/2 + x^2/6, e^{-x} ≈ 1 - x + x^2/2
        return x / 2.0 - (x * x) / 3.0;
    }

    slope_loading(m, tau) - (-x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loadings_have_analytic_limits_at_zero_maturity() {
        for &tau in &[0.05, 2.0, 30.0] {
            assert!((slope_loading(0.0, tau) - 1.0).abs() < 1e-9);
            assert!(curvature_loading(0.0, tau).abs() < 1e-9);
        }
    }

    #[test]
    fn loadings_decay_at_long_maturities() {
        // Both loadings vanish as m/τ grows, leaving the level factor.
        let tau = 1.5;
        assert!(slope_loading(500.0, tau) < 0.01);
        assert!(curvature_loading(500.0, tau) < 0.01);
    }

    #[test]
    fn curvature_loading_is_humped() {
        let tau = 2.0;
        let short = curvature_loading(0.25, tau);
        let mid = curvature_loading(3.5, tau);
        let long = curvature_loading(40.0, tau);
        assert!(mid > short && mid > long);
    }

    #[test]
    fn both_branches_track_the_expansion_near_threshold() {
        let tau = 1.0;
        for &x in &[0.5e-6, 2.0e-6] {
            let expected = 1.0 - x / 2.0;
            assert!((slope_loading(x, tau) - expected).abs() < 1e-11);
        }
    }
}
