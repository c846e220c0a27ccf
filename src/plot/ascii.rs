//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed samples: `o`
//! - segment 1 of the fitted curve (`x <= x0`): `-`
//! - segment 2 of the fitted curve (`x > x0`): `=`
//! - breakpoint marker: a `:` column at the fitted `x0`

use crate::domain::{CurveFile, PiecewiseParams, SampleResidual};

/// Render a plot for an in-memory fit result.
pub fn render_ascii_plot(
    residuals: &[SampleResidual],
    params: &PiecewiseParams,
    width: usize,
    height: usize,
) -> String {
    let (x_min, x_max) = x_range_from_residuals(residuals).unwrap_or((0.0, 1.0));
    render(residuals, params, x_min, x_max, width, height)
}

/// Render a plot from a saved curve JSON file (curve only, no sample overlay).
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let (x_min, x_max) = x_range_from_grid(&curve.grid.x).unwrap_or((0.0, 1.0));
    render(&[], &curve.params, x_min, x_max, width, height)
}

fn render(
    residuals: &[SampleResidual],
    params: &PiecewiseParams,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let seg1_curve = sample_segment_curve(params, x_min, x_max, width, true);
    let seg2_curve = sample_segment_curve(params, x_min, x_max, width, false);

    let (y_min, y_max) = y_range(residuals, &seg1_curve, &seg2_curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first, then the breakpoint marker into blank cells, then
    // samples on top of everything.
    draw_curve(&mut grid, &seg1_curve, x_min, x_max, y_min, y_max, '-');
    draw_curve(&mut grid, &seg2_curve, x_min, x_max, y_min, y_max, '=');

    if params.x0 >= x_min && params.x0 <= x_max {
        let col = map_x(params.x0, x_min, x_max, width);
        for row in grid.iter_mut() {
            if row[col] == ' ' {
                row[col] = ':';
            }
        }
    }

    for r in residuals {
        let x = map_x(r.sample.x, x_min, x_max, width);
        let y = map_y(r.sample.y, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Piecewise fit: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&format!(
        "legend: o samples | - segment 1 (x <= x0) | = segment 2 (x > x0) | : x0={:.3}\n",
        params.x0
    ));

    out
}

/// Sample one segment of the curve over its share of the x range.
///
/// Segment 1 covers `[x_min, min(x0, x_max)]`, segment 2 covers
/// `[max(x0, x_min), x_max]`; a segment whose share is empty yields no
/// points.
fn sample_segment_curve(
    params: &PiecewiseParams,
    x_min: f64,
    x_max: f64,
    width: usize,
    first: bool,
) -> Vec<(f64, f64)> {
    let (lo, hi) = if first {
        (x_min, params.x0.min(x_max))
    } else {
        (params.x0.max(x_min), x_max)
    };
    if hi < lo {
        return Vec::new();
    }

    let total = (x_max - x_min).max(1e-12);
    let n = ((width as f64) * ((hi - lo) / total)).ceil() as usize;
    let n = n.max(2);

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = lo + u * (hi - lo);
        let seg = if first { &params.seg1 } else { &params.seg2 };
        out.push((x, seg.eval(x)));
    }
    out
}

fn x_range_from_residuals(residuals: &[SampleResidual]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for r in residuals {
        min_x = min_x.min(r.sample.x);
        max_x = max_x.max(r.sample.x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn x_range_from_grid(xs: &[f64]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &x in xs {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(
    residuals: &[SampleResidual],
    seg1: &[(f64, f64)],
    seg2: &[(f64, f64)],
) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for r in residuals {
        min_y = min_y.min(r.sample.y);
        max_y = max_y.max(r.sample.y);
    }
    for &(_, y) in seg1.iter().chain(seg2.iter()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
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
    ch: char,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, ch);
        } else if grid[row][col] == ' ' {
            grid[row][col] = ch;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish); only writes into blank cells.
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
