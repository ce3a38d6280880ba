//! Tau grid generation.
//!
//! The decay time-scales are the only nonlinear parameters, so we search them
//! on a deterministic log-spaced grid and solve the βs exactly for each node.
//! The grid search avoids the local minima a free nonlinear optimizer can get
//! stuck in, and gives the same curve for the same inputs every time.

use crate::domain::FitConfig;
use crate::error::CurveError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, CurveError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(CurveError::Config(format!(
            "invalid tau range: min={min}, max={max} (must be finite, >0, and max>min)"
        )));
    }
    if steps < 2 {
        return Err(CurveError::Config("tau steps must be >= 2".to_string()));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    Ok((0..steps).map(|i| (ln_min + step * i as f64).exp()).collect())
}

/// NS tau grid: `[τ1]`.
pub fn tau_grid_ns(config: &FitConfig) -> Result<Vec<Vec<f64>>, CurveError> {
    let values = log_space(config.tau_min, config.tau_max, config.tau_steps_ns)?;
    Ok(values.into_iter().map(|t| vec![t]).collect())
}

/// NSS tau grid: `[τ1, τ2]` with `τ2 >= τ1 * tau_min_ratio`.
pub fn tau_grid_nss(config: &FitConfig) -> Result<Vec<Vec<f64>>, CurveError> {
    if !(config.tau_min_ratio.is_finite() && config.tau_min_ratio > 0.0) {
        return Err(CurveError::Config("invalid tau_min_ratio".to_string()));
    }
    let values = log_space(config.tau_min, config.tau_max, config.tau_steps_nss)?;
    let min_ratio = config.tau_min_ratio.max(1.0);

    let mut out = Vec::new();
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            if values[j] >= values[i] * min_ratio {
                out.push(vec![values[i], values[j]]);
            }
        }
    }
    Ok(out)
}

/// Ratio between neighbouring nodes of a log-spaced grid.
pub fn log_step_ratio(min: f64, max: f64, steps: usize) -> f64 {
    if steps < 2 || !(min > 0.0 && max > min) {
        return 1.0;
    }
    ((max.ln() - min.ln()) / (steps as f64 - 1.0)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn inverted_range_is_a_config_error() {
        let err = log_space(5.0, 1.0, 10).unwrap_err();
        assert!(matches!(err, CurveError::Config(_)));
    }

    #[test]
    fn nss_grid_keeps_humps_apart() {
        let config = FitConfig {
            tau_min: 0.1,
            tau_max: 10.0,
            tau_steps_nss: 8,
            tau_min_ratio: 2.0,
            ..FitConfig::default()
        };
        let grid = tau_grid_nss(&config).unwrap();
        assert!(!grid.is_empty());
        for taus in grid {
            assert!(taus[1] >= taus[0] * 2.0);
        }
    }

    #[test]
    fn step_ratio_matches_grid_spacing() {
        let v = log_space(0.05, 30.0, 60).unwrap();
        let ratio = log_step_ratio(0.05, 30.0, 60);
        assert!((v[1] / v[0] - ratio).abs() < 1e-12);
    }
}
