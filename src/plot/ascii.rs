//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - measured samples: `x`
//! - fitted curve: `-` line
//! - nominal line: `.` line
//! - offset-compensated fit: `~` line

use crate::plot::{PlotData, sample_nominal, sample_polynomial};

/// Render the plot on a `width` x `height` character grid.
pub fn render_ascii_plot(data: &PlotData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (c_min, c_max) = data.count_range();
    let fit = sample_polynomial(&data.fit, c_min, c_max, width);
    let nominal = sample_nominal(&data.nominal(), c_min, c_max, width);
    let offset = data
        .offset
        .as_ref()
        .map(|coeffs| sample_polynomial(coeffs, c_min, c_max, width));

    let mut series = vec![data.measured.as_slice(), fit.as_slice(), nominal.as_slice()];
    if let Some(o) = &offset {
        series.push(o.as_slice());
    }
    let (y_min, y_max) = y_range(data, &series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines only claim empty cells, so draw order sets precedence.
    draw_curve(&mut grid, &fit, c_min, c_max, y_min, y_max, '-');
    draw_curve(&mut grid, &nominal, c_min, c_max, y_min, y_max, '.');
    if let Some(o) = &offset {
        draw_curve(&mut grid, o, c_min, c_max, y_min, y_max, '~');
    }

    for &(c, eu) in &data.measured {
        let x = map_x(c, c_min, c_max, width);
        let y = map_y(eu, y_min, y_max, height);
        grid[y][x] = 'x';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: counts=[{c_min:.0}, {c_max:.0}] | EU=[{y_min:.2}, {y_max:.2}] {}\n",
        data.eu_units
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str("Legend: x=meas. -=crv. fit .=nominal");
    if offset.is_some() {
        out.push_str(" ~=offset");
    }
    out.push('\n');

    out
}

fn y_range(data: &PlotData, series: &[&[(f64, f64)]]) -> Option<(f64, f64)> {
    let mut min_y = data.eu_bounds.min.min(data.eu_bounds.max);
    let mut max_y = data.eu_bounds.max.max(data.eu_bounds.min);

    for s in series {
        for &(_, y) in s.iter() {
            if y.is_finite() {
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
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

fn map_x(c: f64, c_min: f64, c_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((c - c_min) / (c_max - c_min)).clamp(0.0, 1.0);
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
    c_min: f64,
    c_max: f64,
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
    for &(c, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(c, c_min, c_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::domain::{CountBounds, EuBounds};

    fn data() -> PlotData {
        PlotData {
            instrument: "PT-100".to_string(),
            date_label: "10/05/2017 12:10".to_string(),
            eu_units: "psi".to_string(),
            count_bounds: CountBounds { min: 0, max: 100 },
            eu_bounds: EuBounds { min: 0.0, max: 10.0 },
            measured: vec![(0.0, 0.0), (50.0, 5.0), (100.0, 10.0)],
            fit: vec![0.0, 0.1],
            offset: None,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_ascii_plot(&data(), 11, 5);
        let expected = concat!(
            "Plot: counts=[0, 100] | EU=[-0.50, 10.50] psi\n",
            "          x\n",
            "       --- \n",
            "    -x-    \n",
            " ---       \n",
            "x          \n",
            "Legend: x=meas. -=crv. fit .=nominal\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn nominal_shows_where_fit_departs() {
        let mut d = data();
        d.fit = vec![5.0, 0.0];
        d.measured.clear();
        let txt = render_ascii_plot(&d, 11, 5);
        let rows: Vec<&str> = txt.lines().collect();
        assert_eq!(rows[3], "-----------");
        assert!(rows[1].contains('.'));
        assert!(rows[5].contains('.'));
    }

    #[test]
    fn offset_curve_adds_legend_entry() {
        let mut d = data();
        d.offset = Some(vec![1.0, 0.1]);
        let txt = render_ascii_plot(&d, 20, 8);
        assert!(txt.contains('~'));
        assert!(txt.ends_with("~=offset\n"));
    }
}
