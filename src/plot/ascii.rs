//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points (snapshot) or fitted values per date (series): `o`
//! - fitted curve, or the series joined up: `-` line

use crate::domain::{CurveSnapshot, TimeSeries};

/// Render a snapshot: the fitted grid as a line with observations on top.
///
/// The maturity axis covers both the grid and the observations.
pub fn render_snapshot_plot(snapshot: &CurveSnapshot, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || snapshot.curve.iter().chain(snapshot.points.iter());
    let (m_min, m_max) = range(all().map(|p| p.maturity)).unwrap_or((0.25, 30.0));
    let (y_min, y_max) = range(all().map(|p| p.yield_)).unwrap_or((0.0, 0.1));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    let curve: Vec<(f64, f64)> = snapshot.curve.iter().map(|p| (p.maturity, p.yield_)).collect();
    draw_curve(&mut grid, &curve, m_min, m_max, y_min, y_max);

    for p in &snapshot.points {
        let x = map_x(p.maturity, m_min, m_max, width);
        let y = map_y(p.yield_, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = format!(
        "Plot: {} {} | maturity=[{m_min:.3}, {m_max:.3}] years | yield=[{:.2}%, {:.2}%]\n",
        snapshot.country,
        snapshot.date,
        y_min * 100.0,
        y_max * 100.0
    );
    push_rows(&mut out, grid);
    out
}

/// Render a time series: date on the x axis, fitted yield on the y axis.
pub fn render_time_series_plot(series: &TimeSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (series.data.first(), series.data.last()) else {
        return format!("Plot: {} {}y | no data\n", series.country, series.maturity);
    };

    // x is days since the first date.
    let points: Vec<(f64, f64)> = series
        .data
        .iter()
        .map(|p| ((p.date - first.date).num_days() as f64, p.yield_))
        .collect();
    let (x_min, x_max) = range(points.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(points.iter().map(|p| p.1)).unwrap_or((0.0, 0.1));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &points, x_min, x_max, y_min, y_max);
    for &(x, y) in &points {
        if y.is_finite() {
            grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = 'o';
        }
    }

    let mut out = format!(
        "Plot: {} {}y | {} to {} | yield=[{:.2}%, {:.2}%]\n",
        series.country,
        series.maturity,
        first.date,
        last.date,
        y_min * 100.0,
        y_max * 100.0
    );
    push_rows(&mut out, grid);
    out
}

fn push_rows(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(cx, cy) in curve.iter().filter(|p| p.1.is_finite()) {
        let x = map_x(cx, x_min, x_max, width);
        let yy = map_y(cy, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
