//! SVG calibration plot rendered with Plotters.
//!
//! Axes follow the traveler convention: both spans are the configured bounds
//! widened by 5% on each side (and by any out-of-bounds sample), x ticks show
//! counts with their percent of span.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::FontStyle;
use tracing::debug;

use crate::error::AppError;
use crate::plot::{PlotData, sample_nominal, sample_polynomial};

const CURVE_POINTS: usize = 201;

/// Render `data` to an SVG file at `path`.
pub fn write_svg_plot(path: &Path, data: &PlotData, size: (u32, u32)) -> Result<(), AppError> {
    draw(path, data, size)
        .map_err(|e| AppError::new(2, format!("Failed to render plot '{}': {e}", path.display())))?;
    debug!(path = %path.display(), "wrote SVG plot");
    Ok(())
}

fn draw(path: &Path, data: &PlotData, size: (u32, u32)) -> Result<(), Box<dyn std::error::Error>> {
    let (c_lo, c_hi) = data.count_range();
    let fit = sample_polynomial(&data.fit, c_lo, c_hi, CURVE_POINTS);
    let nominal = sample_nominal(&data.nominal(), c_lo, c_hi, CURVE_POINTS);
    let offset = data
        .offset
        .as_ref()
        .map(|coeffs| sample_polynomial(coeffs, c_lo, c_hi, CURVE_POINTS));

    let (x0, x1) = widen(c_lo, c_hi);
    let (mut y_lo, mut y_hi) = (data.eu_bounds.min, data.eu_bounds.max);
    for &(_, eu) in &data.measured {
        y_lo = y_lo.min(eu);
        y_hi = y_hi.max(eu);
    }
    let (y0, y1) = widen(y_lo, y_hi);

    let span = data.count_bounds.span();
    let count_min = data.count_bounds.min as f64;

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        "Nominal and Actual Calibration Curves",
        ("sans-serif", 22).into_font().style(FontStyle::Bold),
    )?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{}    {}", data.instrument, data.date_label),
            ("sans-serif", 16).into_font(),
        )
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("counts")
        .y_desc(format!("Engineering Units (EU) {}", data.eu_units))
        .x_labels(5)
        .y_labels(9)
        .x_label_formatter(&|v| {
            if span > 0.0 {
                format!("{v:.0} ({:.0}%)", (v - count_min) / span * 100.0)
            } else {
                format!("{v:.0}")
            }
        })
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;

    let orange = RGBColor(255, 165, 0);

    chart
        .draw_series(data.measured.iter().map(|&p| Cross::new(p, 4, BLUE)))?
        .label("meas.")
        .legend(|(x, y)| Cross::new((x, y), 4, BLUE));
    chart
        .draw_series(LineSeries::new(nominal, &GREEN))?
        .label("nominal")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));
    chart
        .draw_series(LineSeries::new(fit, &RED))?
        .label("crv. fit")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    if let Some(offset) = offset {
        chart
            .draw_series(LineSeries::new(offset, &orange))?
            .label("offset")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], orange));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn widen(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span > 0.0 && span.is_finite() {
        (lo - span * 0.05, hi + span * 0.05)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}
