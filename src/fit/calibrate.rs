//! Curve calibration: `(maturities, yields) -> FitResult`.
//!
//! This is the single entry point the rest of the crate uses to turn one date's
//! observations into a curve. It validates the inputs, fits the requested
//! model(s) and, for `ModelSpec::Auto`, selects between NS and NSS using BIC:
//!
//! - BIC = n * ln(SSE/n) + k * ln(n)
//! - NSS is only attempted when `n >= k + MIN_N_BUFFER` (10 points, so the
//!   full US Treasury strip qualifies)
//! - if ΔBIC < 2 between the best and a simpler model, the simpler model wins
//!
//! A failed fit is always an error; there is no fallback curve.

use tracing::debug;

use crate::domain::{CurveModel, FitConfig, FitQuality, FitResult, ModelKind, ModelSpec};
use crate::error::CurveError;
use crate::fit::fitter::{fit_model, ModelFit, RefineOptions};
use crate::fit::tau_grid::{log_step_ratio, tau_grid_ns, tau_grid_nss};

/// Extra observations beyond the parameter count before `auto` tries NSS.
const MIN_N_BUFFER: usize = 4;

/// Calibrate a curve to one date's observations.
pub fn calibrate(
    maturities: &[f64],
    yields: &[f64],
    config: &FitConfig,
) -> Result<FitResult, CurveError> {
    validate_inputs(maturities, yields)?;
    let n = maturities.len();
    let distinct = distinct_maturities(maturities);

    let fits: Vec<FitResult> = match config.model {
        ModelSpec::Ns => vec![fit_kind(ModelKind::Ns, maturities, yields, distinct, config)?],
        ModelSpec::Nss => vec![fit_kind(ModelKind::Nss, maturities, yields, distinct, config)?],
        ModelSpec::Auto => {
            let mut fits = vec![fit_kind(ModelKind::Ns, maturities, yields, distinct, config)?];
            let k = ModelKind::Nss.param_count();
            if n >= k + MIN_N_BUFFER {
                match fit_kind(ModelKind::Nss, maturities, yields, distinct, config) {
                    Ok(fit) => fits.push(fit),
                    Err(err) => debug!(%err, "NSS candidate dropped from model selection"),
                }
            } else {
                debug!(n, needed = k + MIN_N_BUFFER, "too few observations to consider NSS");
            }
            fits
        }
    };

    let best = select_by_bic(&fits);
    debug!(
        model = best.model.kind.display_name(),
        taus = ?best.model.taus,
        rmse = best.quality.rmse,
        n,
        "calibrated curve"
    );
    Ok(best)
}

fn validate_inputs(maturities: &[f64], yields: &[f64]) -> Result<(), CurveError> {
    if maturities.is_empty() {
        return Err(CurveError::calibration("no observations to fit"));
    }
    if maturities.len() != yields.len() {
        return Err(CurveError::calibration(format!(
            "got {} maturities but {} yields",
            maturities.len(),
            yields.len()
        )));
    }
    if let Some(m) = maturities.iter().find(|m| !m.is_finite() || **m < 0.0) {
        return Err(CurveError::calibration(format!("invalid maturity {m}")));
    }
    if let Some(y) = yields.iter().find(|y| !y.is_finite()) {
        return Err(CurveError::calibration(format!("invalid yield {y}")));
    }
    Ok(())
}

fn distinct_maturities(maturities: &[f64]) -> usize {
    let mut sorted = maturities.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

fn fit_kind(
    kind: ModelKind,
    maturities: &[f64],
    yields: &[f64],
    distinct: usize,
    config: &FitConfig,
) -> Result<FitResult, CurveError> {
    if distinct < kind.beta_len() {
        return Err(CurveError::calibration(format!(
            "{} needs at least {} distinct maturities, got {distinct}",
            kind.display_name(),
            kind.beta_len()
        )));
    }

    let (grid, steps) = match kind {
        ModelKind::Ns => (tau_grid_ns(config)?, config.tau_steps_ns),
        ModelKind::Nss => (tau_grid_nss(config)?, config.tau_steps_nss),
    };
    let refine = config.refine.then(|| RefineOptions {
        tau_min: config.tau_min,
        tau_max: config.tau_max,
        step_ratio: log_step_ratio(config.tau_min, config.tau_max, steps),
        min_ratio: config.tau_min_ratio,
    });

    let fit = fit_model(kind, maturities, yields, &grid, refine.as_ref())?;
    Ok(to_fit_result(fit, maturities.len()))
}

fn to_fit_result(fit: ModelFit, n: usize) -> FitResult {
    let bic = bic(n, fit.sse, fit.model.param_count());

    FitResult {
        model: CurveModel {
            kind: fit.model,
            betas: fit.betas,
            taus: fit.taus,
        },
        quality: FitQuality {
            sse: fit.sse,
            rmse: fit.rmse,
            bic,
            n,
        },
    }
}

fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-12);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}

fn select_by_bic(fits: &[FitResult]) -> FitResult {
    let mut best = &fits[0];
    for f in &fits[1..] {
        if f.quality.bic < best.quality.bic {
            best = f;
        }
    }

    let best_bic = best.quality.bic;

    // Prefer simplicity if within 2 BIC points.
    for kind in [ModelKind::Ns, ModelKind::Nss] {
        if let Some(f) = fits.iter().find(|f| f.model.kind == kind) {
            if f.quality.bic <= best_bic + 2.0 {
                return f.clone();
            }
        }
    }

    best.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::predict;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    const TREASURY_MATURITIES: [f64; 10] = [
        1.0 / 12.0,
        0.25,
        0.5,
        1.0,
        2.0,
        5.0,
        7.0,
        10.0,
        20.0,
        30.0,
    ];

    #[test]
    fn four_point_curve_fits_ten_year_closely() {
        let maturities = [1.0, 5.0, 10.0, 20.0];
        let yields = [0.03, 0.035, 0.04, 0.038];
        let fit = calibrate(&maturities, &yields, &FitConfig::default()).unwrap();

        let at_ten = fit.model.evaluate(10.0);
        assert!((at_ten - 0.04).abs() < 0.001, "y(10)={at_ten}");

        let far = fit.model.evaluate(50.0);
        assert!(far.is_finite());
        assert_eq!(far, fit.model.evaluate(50.0));
    }

    #[test]
    fn observed_maturities_are_reproduced_within_a_few_bp() {
        // A realistic Treasury curve with ~1bp of observation noise.
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 0.0001).unwrap();
        let truth = [0.042, -0.006, -0.012];
        let yields: Vec<f64> = TREASURY_MATURITIES
            .iter()
            .map(|&m| predict(ModelKind::Ns, m, &truth, &[1.8]) + noise.sample(&mut rng))
            .collect();

        let fit = calibrate(&TREASURY_MATURITIES, &yields, &FitConfig::default()).unwrap();
        for (&m, &y) in TREASURY_MATURITIES.iter().zip(&yields) {
            let diff = (fit.model.evaluate(m) - y).abs();
            assert!(diff < 0.0005, "m={m} observed={y} fitted={}", fit.model.evaluate(m));
        }
    }

    #[test]
    fn clustered_maturities_are_a_calibration_error() {
        let err = calibrate(
            &[0.0, 0.001, 0.002, 0.003],
            &[0.03, 0.031, 0.029, 0.032],
            &FitConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CurveError::Calibration(_)));
    }

    #[test]
    fn fitted_betas_stay_on_the_yield_scale() {
        // Three points fit exactly for many τ; only well-conditioned ones qualify.
        let yields = [0.041, 0.043, 0.046];
        let fit = calibrate(&[5.0, 10.0, 20.0], &yields, &FitConfig::default()).unwrap();
        let betas = &fit.model.betas;
        assert!(betas.iter().all(|b| b.abs() <= 100.0 * 0.046), "{betas:?}");
    }

    #[test]
    fn single_point_is_a_calibration_error() {
        let err = calibrate(&[10.0], &[0.04], &FitConfig::default()).unwrap_err();
        assert!(matches!(err, CurveError::Calibration(_)));
    }

    #[test]
    fn identical_maturities_are_a_calibration_error() {
        let yields = [0.03, 0.031, 0.032, 0.03, 0.029, 0.03];
        let err = calibrate(&[5.0; 6], &yields, &FitConfig::default()).unwrap_err();
        assert!(matches!(err, CurveError::Calibration(_)));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = calibrate(&[1.0, 2.0, 3.0], &[0.01, 0.02], &FitConfig::default()).unwrap_err();
        assert!(matches!(err, CurveError::Calibration(_)));
    }

    #[test]
    fn three_gilt_maturities_fit_ns() {
        // The UK feed only carries 5y/10y/20y; three points determine the βs.
        let fit = calibrate(&[5.0, 10.0, 20.0], &[0.041, 0.043, 0.046], &FitConfig::default())
            .unwrap();
        assert_eq!(fit.model.kind, ModelKind::Ns);
        assert!((fit.model.evaluate(10.0) - 0.043).abs() < 1e-6);
    }

    #[test]
    fn nss_needs_four_distinct_maturities() {
        let config = FitConfig {
            model: ModelSpec::Nss,
            ..FitConfig::default()
        };
        let err = calibrate(&[5.0, 10.0, 20.0], &[0.041, 0.043, 0.046], &config).unwrap_err();
        assert!(matches!(err, CurveError::Calibration(_)));
    }

    #[test]
    fn auto_skips_nss_on_sparse_data() {
        let config = FitConfig {
            model: ModelSpec::Auto,
            ..FitConfig::default()
        };
        let fit = calibrate(&[1.0, 5.0, 10.0, 20.0], &[0.03, 0.035, 0.04, 0.038], &config)
            .unwrap();
        assert_eq!(fit.model.kind, ModelKind::Ns);
    }

    #[test]
    fn auto_considers_nss_on_the_treasury_strip() {
        let truth = [0.045, -0.02, 0.03, -0.025];
        let yields: Vec<f64> = TREASURY_MATURITIES
            .iter()
            .map(|&m| predict(ModelKind::Nss, m, &truth, &[0.8, 8.0]))
            .collect();

        let config = FitConfig {
            model: ModelSpec::Auto,
            ..FitConfig::default()
        };
        let fit = calibrate(&TREASURY_MATURITIES, &yields, &config).unwrap();
        assert_eq!(fit.model.kind, ModelKind::Nss);
        assert_eq!(fit.quality.n, 10);
    }

    #[test]
    fn auto_selects_nss_on_true_nss_data() {
        let truth = [0.045, -0.02, 0.03, -0.025];
        let taus = [0.8, 8.0];
        let maturities: Vec<f64> = (0..40).map(|i| 0.25 + i as f64 * 0.75).collect();
        let yields: Vec<f64> = maturities
            .iter()
            .map(|&m| predict(ModelKind::Nss, m, &truth, &taus))
            .collect();

        let config = FitConfig {
            model: ModelSpec::Auto,
            ..FitConfig::default()
        };
        let fit = calibrate(&maturities, &yields, &config).unwrap();
        assert_eq!(fit.model.kind, ModelKind::Nss);
    }

    #[test]
    fn bic_prefers_simpler_when_close() {
        let quality = |bic| FitQuality {
            sse: 1e-6,
            rmse: 0.0,
            bic,
            n: 20,
        };
        let fits = vec![
            FitResult {
                model: CurveModel {
                    kind: ModelKind::Ns,
                    betas: vec![],
                    taus: vec![],
                },
                quality: quality(-10.0),
            },
            FitResult {
                model: CurveModel {
                    kind: ModelKind::Nss,
                    betas: vec![],
                    taus: vec![],
                },
                quality: quality(-11.5),
            },
        ];

        let chosen = select_by_bic(&fits);
        assert_eq!(chosen.model.kind, ModelKind::Ns);
    }
}
