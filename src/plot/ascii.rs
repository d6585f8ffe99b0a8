//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The y-axis is always the probability range `[0, 1]`, so curves at different
//! buffer volumes are directly comparable.

use crate::domain::CurveFrame;

/// Render a predicted curve as text.
pub fn render_ascii_plot(frame: &CurveFrame, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let curve = frame.curve.xy();

    let (x_min, x_max) = x_range(&curve).unwrap_or((0.0, 1.0));
    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &curve, x_min, x_max);

    let mut out = String::new();
    out.push_str(&format!("{} (buffer={:.2})\n", frame.title, frame.curve.buffer));
    out.push_str(&format!(
        "x: {} [{x_min:.3}, {x_max:.3}] | y: {} [0, 1]\n",
        frame.x_label, frame.y_label
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let first = curve.first()?.0;
    let last = curve.last()?.0;
    if first.is_finite() && last.is_finite() {
        Some((first, last))
    } else {
        None
    }
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let span = x_max - x_min;
    let u = if span > 0.0 {
        ((x - x_min) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(p: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    // p=1 -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64) {
    if curve.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, p) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(p, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
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
