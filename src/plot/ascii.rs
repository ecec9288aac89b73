//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observations: `o` at (actual, predicted)
//! - identity line `predicted == actual`: `.`
//!
//! Both axes share one range so a perfect fit lies on the diagonal.

use crate::domain::FittedModel;

/// Render actual (x) vs predicted (y) for an in-sample fit.
pub fn render_fit_plot(model: &FittedModel, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = model
        .actual
        .iter()
        .zip(&model.predictions)
        .map(|(&a, &p)| (a, p))
        .collect();
    render_plot(&points, width, height)
}

fn render_plot(points: &[(f64, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (lo, hi) = value_range(points).unwrap_or((0.0, 1.0));
    let (lo, hi) = pad_range(lo, hi, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Identity line first so points overlay it.
    draw_line(
        &mut grid,
        map_x(lo, lo, hi, width),
        map_y(lo, lo, hi, height),
        map_x(hi, lo, hi, width),
        map_y(hi, lo, hi, height),
        '.',
    );

    for &(actual, predicted) in points {
        if !(actual.is_finite() && predicted.is_finite()) {
            continue;
        }
        let x = map_x(actual, lo, hi, width);
        let y = map_y(predicted, lo, hi, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: actual (x) vs predicted (y) | range=[{lo:.2}, {hi:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str("o = observation, . = perfect prediction\n");

    out
}

fn value_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for &(a, p) in points {
        for v in [a, p] {
            if v.is_finite() {
                min_v = min_v.min(v);
                max_v = max_v.max(v);
            }
        }
    }
    if min_v.is_finite() && max_v.is_finite() && max_v > min_v {
        Some((min_v, max_v))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(v: f64, lo: f64, hi: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(v: f64, lo: f64, hi: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    // Largest value on row 0.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::INTERCEPT;

    fn model(actual: Vec<f64>, predictions: Vec<f64>) -> FittedModel {
        FittedModel {
            coefficients: vec![0.0, 1.0],
            features: vec![INTERCEPT.to_string(), "x".to_string()],
            r2: 1.0,
            rmse: 0.0,
            mae: 0.0,
            predictions,
            actual,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_fit_plot(&model(vec![0.0, 10.0], vec![0.0, 10.0]), 10, 5);
        let expected = concat!(
            "Plot: actual (x) vs predicted (y) | range=[-0.50, 10.50]\n",
            "        .o\n",
            "      ..  \n",
            "    ..    \n",
            "  ..      \n",
            "o.        \n",
            "o = observation, . = perfect prediction\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn over_prediction_plots_above_diagonal() {
        // actual 5 predicted 10: middle column, top row.
        let txt = render_fit_plot(&model(vec![0.0, 5.0], vec![0.0, 10.0]), 11, 5);
        let rows: Vec<&str> = txt.lines().skip(1).take(5).collect();
        let col = rows[0].find('o').unwrap();
        assert!((4..=6).contains(&col), "column {col} in {:?}", rows[0]);
    }

    #[test]
    fn degenerate_input_still_renders() {
        let txt = render_fit_plot(&model(vec![], vec![]), 3, 2);
        // Minimum grid is 10x5 plus header and legend.
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.lines().skip(1).take(5).all(|l| l.chars().count() == 10));
    }
}
