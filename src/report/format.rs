//! Terminal formatting for `yc latest`, `yc timeseries` and `yc snapshot`.
//!
//! Yields are shown in percent with three decimals; maturities in years.

use crate::domain::{CurveSnapshot, PointYield, TimeSeries};

/// Maturities shown in the snapshot's tabulated curve.
const SNAPSHOT_TABLE_MATURITIES: [f64; 9] = [0.25, 0.5, 1.0, 2.0, 5.0, 7.0, 10.0, 20.0, 30.0];

pub fn format_point(point: &PointYield) -> String {
    format!(
        "{} {} {}y: {}\n",
        point.country,
        point.date,
        fmt_maturity(point.maturity),
        fmt_pct(point.yield_)
    )
}

pub fn format_time_series(series: &TimeSeries) -> String {
    let mut out = format!(
        "{} {}y yield, {} dates\n",
        series.country,
        fmt_maturity(series.maturity),
        series.data.len()
    );
    out.push_str(&format!("{:<10} {:>9}\n", "date", "yield"));
    out.push_str(&format!("{:-<10} {:-<9}\n", "", ""));
    for p in &series.data {
        out.push_str(&format!("{:<10} {:>9}\n", p.date.to_string(), fmt_pct(p.yield_)));
    }
    out
}

/// Summary of a snapshot: model, parameters, fit quality, observed vs fitted.
pub fn format_snapshot(snapshot: &CurveSnapshot) -> String {
    let model = &snapshot.model;
    let q = &snapshot.quality;

    let mut out = String::new();
    out.push_str(&format!(
        "=== {} curve as of {} ===\n",
        snapshot.country, snapshot.date
    ));
    out.push_str(&format!(
        "Model: {} | n={} RMSE={:.2}bp BIC={:.3}\n",
        model.kind.display_name(),
        q.n,
        q.rmse * 1e4,
        q.bic
    ));
    out.push_str(&format!("- betas: {}\n", fmt_vec(&model.betas)));
    out.push_str(&format!("- taus : {}\n", fmt_vec(&model.taus)));
    out.push_str(&format!(
        "- short rate {} | long rate {}\n",
        fmt_pct(model.short_rate()),
        fmt_pct(model.long_rate())
    ));

    out.push_str("\nObserved vs fitted:\n");
    out.push_str(&format!(
        "{:>9} {:>9} {:>9} {:>9}\n",
        "maturity", "observed", "fitted", "resid bp"
    ));
    for p in &snapshot.points {
        let fitted = model.evaluate(p.maturity);
        out.push_str(&format!(
            "{:>9} {:>9} {:>9} {:>9.2}\n",
            fmt_maturity(p.maturity),
            fmt_pct(p.yield_),
            fmt_pct(fitted),
            (p.yield_ - fitted) * 1e4
        ));
    }

    out.push_str(&format!(
        "\nCurve ({} grid points, {}y to {}y):\n",
        snapshot.curve.len(),
        fmt_maturity(snapshot.curve.first().map_or(0.0, |p| p.maturity)),
        fmt_maturity(snapshot.curve.last().map_or(0.0, |p| p.maturity)),
    ));
    for m in SNAPSHOT_TABLE_MATURITIES {
        out.push_str(&format!(
            "{:>9} {:>9}\n",
            fmt_maturity(m),
            fmt_pct(model.evaluate(m))
        ));
    }
    out
}

fn fmt_pct(y: f64) -> String {
    format!("{:.3}%", y * 100.0)
}

fn fmt_maturity(m: f64) -> String {
    if (m - m.round()).abs() < 1e-9 {
        format!("{}", m.round() as i64)
    } else {
        format!("{m:.3}")
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
