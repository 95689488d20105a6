//! ASCII plotting for terminal output.
//!
//! Fixed-size character grids with deterministic output, so the rendering
//! can be covered by golden tests.
//!
//! Loss plot:
//! - accepted iteration: `*`
//! - iteration that backtracked: `b`
//! - path between iterations: `-`
//!
//! Weights plot:
//! - true coefficient: `o`
//! - estimated coefficient: `x`
//! - both in the same cell: `#`
//! - zero line: `.`

use nalgebra::DVector;

use crate::fit::IterationRecord;

/// Loss per iteration on a log10 scale.
pub fn render_loss_plot(history: &[IterationRecord], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<(f64, f64, bool)> = history
        .iter()
        .map(|r| (r.iter as f64, r.loss.max(f64::MIN_POSITIVE).log10(), r.backtracks > 0))
        .collect();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return "Plot: no iterations recorded\n".to_string();
    };

    let (i_min, i_max) = axis_range(first.0, last.0);
    let (y_min, y_max) = value_range(points.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let mut prev = None;
    for &(i, y, _) in &points {
        let cell = (map_x(i, i_min, i_max, width), map_y(y, y_min, y_max, height));
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, cell.0, cell.1, '-');
        }
        prev = Some(cell);
    }
    for &(i, y, backtracked) in &points {
        let x = map_x(i, i_min, i_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = if backtracked { 'b' } else { '*' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: iter=[{}, {}] | log10(loss)=[{y_min:.2}, {y_max:.2}]\n",
        first.0, last.0
    ));
    push_grid(&mut out, grid);
    out
}

/// True and estimated coefficients by feature index.
///
/// Only non-zero entries are marked; zeros sit on the zero line.
pub fn render_weights_plot(w_true: &DVector<f64>, w_hat: &DVector<f64>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let m = w_true.len().max(w_hat.len());
    if m == 0 {
        return "Plot: no features\n".to_string();
    }

    let (j_min, j_max) = axis_range(0.0, (m - 1) as f64);
    let values = w_true.iter().chain(w_hat.iter()).copied().chain(std::iter::once(0.0));
    let (y_min, y_max) = value_range(values).unwrap_or((-1.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let zero_row = map_y(0.0, y_min, y_max, height);
    draw_line(&mut grid, 0, zero_row, width - 1, zero_row, '.');

    for (j, &w) in w_true.iter().enumerate() {
        if w != 0.0 {
            let x = map_x(j as f64, j_min, j_max, width);
            grid[map_y(w, y_min, y_max, height)][x] = 'o';
        }
    }
    for (j, &w) in w_hat.iter().enumerate() {
        if w != 0.0 {
            let x = map_x(j as f64, j_min, j_max, width);
            let cell = &mut grid[map_y(w, y_min, y_max, height)][x];
            *cell = if *cell == 'o' { '#' } else { 'x' };
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: feature=[0, {}] | w=[{y_min:.2}, {y_max:.2}] | o=true x=estimate #=both\n",
        m - 1
    ));
    push_grid(&mut out, grid);
    out
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

fn axis_range(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min, min + 1.0) }
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v.is_finite() && max_v.is_finite() && max_v > min_v {
        Some((min_v, max_v))
    } else if min_v.is_finite() && max_v.is_finite() {
        Some((min_v - 0.5, max_v + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
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

    fn record(iter: usize, loss: f64, backtracks: usize) -> IterationRecord {
        IterationRecord {
            iter,
            loss,
            step_norm: 0.0,
            scaled_step_norm: 0.0,
            mu: 1.0,
            backtracks,
            backtrack_exhausted: false,
        }
    }

    #[test]
    fn weights_plot_golden_snapshot_small() {
        let w_true = DVector::from_vec(vec![0.0, 2.0, 0.0]);
        let w_hat = DVector::from_vec(vec![0.0, 0.0, -2.0]);

        let txt = render_weights_plot(&w_true, &w_hat, 10, 5);
        let expected = concat!(
            "Plot: feature=[0, 2] | w=[-2.20, 2.20] | o=true x=estimate #=both\n",
            "     o    \n",
            "          \n",
            "..........\n",
            "          \n",
            "         x\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn matching_weights_share_a_cell() {
        let w = DVector::from_vec(vec![1.0, 0.0, 3.0]);
        let txt = render_weights_plot(&w, &w, 12, 6);
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(body.matches('#').count(), 2);
        assert!(!body.contains('x'));
    }

    #[test]
    fn loss_plot_marks_backtracking() {
        let history = vec![record(0, 100.0, 0), record(1, 10.0, 3), record(2, 1.0, 0)];
        let txt = render_loss_plot(&history, 20, 6);
        let mut lines = txt.lines();
        assert_eq!(lines.next().unwrap(), "Plot: iter=[0, 2] | log10(loss)=[-0.10, 2.10]");
        let body: String = lines.collect();
        assert_eq!(body.matches('b').count(), 1);
        assert_eq!(body.matches('*').count(), 2);
        // Decreasing loss: first point top-left, last bottom-right.
        assert_eq!(txt.lines().nth(1).unwrap().chars().next(), Some('*'));
        assert_eq!(txt.lines().last().unwrap().chars().last(), Some('*'));
    }

    #[test]
    fn empty_history_has_placeholder() {
        assert_eq!(render_loss_plot(&[], 20, 6), "Plot: no iterations recorded\n");
    }
}
