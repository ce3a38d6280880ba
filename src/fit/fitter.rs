//! Low-level fitting routines for a single model kind.
//!
//! Given:
//! - maturities `m_i`
//! - observed yields `y_i`
//! - a list of candidate `τ` tuples
//!
//! we solve, for each `τ` tuple:
//! - an OLS problem to find the best β coefficients
//! - the resulting SSE
//!
//! keep the best (lowest SSE) candidate, and optionally polish each of its τs
//! with a golden-section search between the neighbouring grid nodes.
//!
//! Candidates whose βs dwarf the observed yields are discarded: they come from
//! near-collinear loadings (clustered maturities, extreme τ) and fit noise.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::trace;

use crate::domain::ModelKind;
use crate::error::CurveError;
use crate::math::solve_least_squares;
use crate::models::{fill_design_row, predict};

/// Golden-section iterations per τ dimension.
const REFINE_ITERS: usize = 60;

/// 1/φ
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Largest admissible `|β|` as a multiple of the largest observed `|y|`.
const MAX_BETA_RATIO: f64 = 100.0;

/// Yield scale floor so an all-zero curve still admits small βs.
const MIN_YIELD_SCALE: f64 = 1e-3;

/// Bounds for the golden-section polish of the best grid candidate.
#[derive(Debug, Clone)]
pub struct RefineOptions {
    pub tau_min: f64,
    pub tau_max: f64,
    /// Ratio between neighbouring grid nodes; each τ is searched within
    /// `[τ / ratio, τ * ratio]`.
    pub step_ratio: f64,
    /// Minimum `τ2 / τ1` for NSS.
    pub min_ratio: f64,
}

/// Best fit for a single model kind.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub model: ModelKind,
    pub betas: Vec<f64>,
    pub taus: Vec<f64>,
    pub sse: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    taus: Vec<f64>,
    betas: Vec<f64>,
    sse: f64,
}

/// Fit a single model kind over a tau grid.
///
/// Inputs are assumed validated (equal lengths, finite, maturities >= 0).
pub fn fit_model(
    model: ModelKind,
    maturities: &[f64],
    yields: &[f64],
    tau_grid: &[Vec<f64>],
    refine: Option<&RefineOptions>,
) -> Result<ModelFit, CurveError> {
    if maturities.is_empty() {
        return Err(CurveError::calibration("no observations to fit"));
    }
    if tau_grid.is_empty() {
        return Err(CurveError::Config("tau grid is empty".to_string()));
    }

    let beta_limit = admissible_beta_bound(yields);

    // Evaluate each tau tuple independently (parallel).
    let candidates: Vec<Candidate> = tau_grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, taus)| {
            evaluate_candidate(model, taus, maturities, yields, beta_limit).map(|(betas, sse)| {
                Candidate {
                    idx,
                    taus: taus.clone(),
                    betas,
                    sse,
                }
            })
        })
        .collect();

    if candidates.is_empty() {
        return Err(CurveError::calibration(format!(
            "no decay time-scale gave a well-conditioned {} system",
            model.display_name()
        )));
    }

    // Deterministic selection: pick the minimum SSE; break ties by original grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }
    let mut best = best.clone();

    if let Some(opts) = refine {
        refine_candidate(model, &mut best, maturities, yields, beta_limit, opts);
    }

    if !best.sse.is_finite() {
        return Err(CurveError::calibration(format!(
            "{} fit produced a non-finite residual",
            model.display_name()
        )));
    }

    let rmse = (best.sse / maturities.len() as f64).sqrt();
    Ok(ModelFit {
        model,
        betas: best.betas,
        taus: best.taus,
        sse: best.sse,
        rmse,
    })
}

fn admissible_beta_bound(yields: &[f64]) -> f64 {
    let scale = yields.iter().fold(0.0_f64, |acc, y| acc.max(y.abs()));
    MAX_BETA_RATIO * scale.max(MIN_YIELD_SCALE)
}

fn evaluate_candidate(
    model: ModelKind,
    taus: &[f64],
    maturities: &[f64],
    yields: &[f64],
    beta_limit: f64,
) -> Option<(Vec<f64>, f64)> {
    if taus.iter().any(|t| !t.is_finite() || *t <= 0.0) {
        return None;
    }

    let n = maturities.len();
    let p = model.beta_len();

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for (i, &m) in maturities.iter().enumerate() {
        fill_design_row(model, m, taus, &mut row);
        for (j, &v) in row.iter().enumerate() {
            x[(i, j)] = v;
        }
    }
    let y = DVector::from_column_slice(yields);

    let betas: Vec<f64> = solve_least_squares(&x, &y)?.iter().copied().collect();
    if betas.iter().any(|b| b.abs() > beta_limit) {
        return None;
    }

    let sse: f64 = maturities
        .iter()
        .zip(yields)
        .map(|(&m, &yi)| {
            let r = yi - predict(model, m, &betas, taus);
            r * r
        })
        .sum();

    if sse.is_finite() {
        Some((betas, sse))
    } else {
        None
    }
}

/// Coordinate-wise golden-section polish of each τ in log space.
///
/// Only strict SSE improvements are accepted, so the result is never worse
/// than the grid winner.
fn refine_candidate(
    model: ModelKind,
    best: &mut Candidate,
    maturities: &[f64],
    yields: &[f64],
    beta_limit: f64,
    opts: &RefineOptions,
) {
    if opts.step_ratio <= 1.0 {
        return;
    }

    for dim in 0..best.taus.len() {
        let center = best.taus[dim];
        let lo = (center / opts.step_ratio).max(opts.tau_min);
        let hi = (center * opts.step_ratio).min(opts.tau_max);
        if !(lo > 0.0 && hi > lo) {
            continue;
        }

        let base = best.taus.clone();
        let objective = |ln_tau: f64| -> Option<(Vec<f64>, Vec<f64>, f64)> {
            let mut taus = base.clone();
            taus[dim] = ln_tau.exp();
            if model == ModelKind::Nss && taus[1] < taus[0] * opts.min_ratio.max(1.0) {
                return None;
            }
            evaluate_candidate(model, &taus, maturities, yields, beta_limit)
                .map(|(b, s)| (taus, b, s))
        };

        let sse_at = |ln_tau: f64| objective(ln_tau).map_or(f64::INFINITY, |(_, _, s)| s);
        let ln_best = golden_section_min(sse_at, lo.ln(), hi.ln(), REFINE_ITERS);

        if let Some((taus, betas, sse)) = objective(ln_best) {
            if sse < best.sse {
                trace!(dim, from = center, to = taus[dim], sse, "refined tau");
                best.taus = taus;
                best.betas = betas;
                best.sse = sse;
            }
        }
    }
}

/// Minimize a unimodal `f` on `[a, b]`; returns the argmin estimate.
fn golden_section_min<F: Fn(f64) -> f64>(f: F, mut a: f64, mut b: f64, iters: usize) -> f64 {
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);

    for _ in 0..iters {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
        }
    }

    if fc < fd { c } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns_data(betas: &[f64], taus: &[f64], maturities: &[f64]) -> Vec<f64> {
        maturities
            .iter()
            .map(|&m| predict(ModelKind::Ns, m, betas, taus))
            .collect()
    }

    #[test]
    fn fit_model_runs_on_tiny_synthetic_ns() {
        let maturities = [0.5, 1.0, 2.0, 5.0, 10.0, 20.0];
        let yields = ns_data(&[0.045, -0.02, 0.01], &[2.0], &maturities);

        let grid = vec![vec![2.0]];
        let fit = fit_model(ModelKind::Ns, &maturities, &yields, &grid, None).unwrap();
        assert!(fit.sse.is_finite());
        assert!(fit.rmse < 1e-12);
    }

    #[test]
    fn fit_model_selects_correct_tau_from_grid() {
        let true_betas = [0.05, -0.03, 0.02];
        let maturities: Vec<f64> = (0..20).map(|i| 0.5 + i as f64 * 0.5).collect();
        let yields = ns_data(&true_betas, &[2.0], &maturities);

        let grid = vec![vec![1.0], vec![2.0], vec![4.0]];
        let fit = fit_model(ModelKind::Ns, &maturities, &yields, &grid, None).unwrap();

        assert!((fit.taus[0] - 2.0).abs() < 1e-12);
        for (a, b) in fit.betas.iter().zip(true_betas.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn refinement_recovers_off_grid_tau() {
        let maturities = [0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 20.0, 30.0];
        let yields = ns_data(&[0.04, -0.015, 0.02], &[2.0], &maturities);
        let grid = vec![vec![1.0], vec![4.0]];

        let coarse = fit_model(ModelKind::Ns, &maturities, &yields, &grid, None).unwrap();
        let opts = RefineOptions {
            tau_min: 0.05,
            tau_max: 30.0,
            step_ratio: 2.0,
            min_ratio: 1.5,
        };
        let refined = fit_model(ModelKind::Ns, &maturities, &yields, &grid, Some(&opts)).unwrap();

        assert!(refined.sse < coarse.sse);
        assert!((refined.taus[0] - 2.0).abs() < 1e-3, "tau={}", refined.taus[0]);
    }

    #[test]
    fn single_maturity_has_no_solvable_candidate() {
        let grid = vec![vec![1.0], vec![2.0]];
        let err = fit_model(ModelKind::Ns, &[5.0, 5.0, 5.0], &[0.03, 0.031, 0.029], &grid, None)
            .unwrap_err();
        assert!(matches!(err, CurveError::Calibration(_)));
    }

    #[test]
    fn clustered_maturities_have_no_admissible_candidate() {
        // Three days of maturity span: every τ gives near-collinear loadings.
        let grid = vec![vec![0.05], vec![1.0], vec![30.0]];
        let err = fit_model(
            ModelKind::Ns,
            &[0.0, 0.001, 0.002, 0.003],
            &[0.03, 0.031, 0.029, 0.032],
            &grid,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CurveError::Calibration(_)));
    }

    #[test]
    fn beta_bound_scales_with_yields() {
        assert!((admissible_beta_bound(&[0.03, -0.05, 0.04]) - 5.0).abs() < 1e-12);
        assert!((admissible_beta_bound(&[0.0, 0.0]) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn golden_section_finds_parabola_minimum() {
        let x = golden_section_min(|x| (x - 1.3) * (x - 1.3), -2.0, 4.0, 80);
        assert!((x - 1.3).abs() < 1e-8);
    }
}
