//! Zero-EU count offset compensation.
//!
//! A linear fit that does not pass through zero EU at zero counts has an
//! x-intercept `x0 = -c0 / c1`. Shifting every measured count by `x0` and
//! refitting yields the line the PLC would see once that offset is trimmed.
//! Only defined for degree-1 fits; higher degrees have no single offset.

use tracing::debug;

use crate::domain::{CountBounds, FitResult, OffsetCompensation};
use crate::error::CalError;
use crate::fit::{evaluate, fit};

/// Compute the offset-compensated refit, or `None` when it is not defined.
pub fn offset_compensation(
    original: &FitResult,
    counts: &[i64],
    eus: &[f64],
    bounds: CountBounds,
) -> Result<Option<OffsetCompensation>, CalError> {
    if original.degree != 1 {
        return Ok(None);
    }
    let (c0, c1) = (original.coefficients[0], original.coefficients[1]);
    if c1 == 0.0 {
        return Ok(None);
    }

    let count_offset = -c0 / c1;
    if !count_offset.is_finite() {
        return Ok(None);
    }

    let adjusted_counts: Vec<i64> = counts
        .iter()
        .map(|&c| (c as f64 - count_offset).round() as i64)
        .collect();
    let refit = fit(&adjusted_counts, eus, 1)?;
    debug!(count_offset, "offset compensation refit");

    Ok(Some(OffsetCompensation {
        count_offset,
        eu_at_min: evaluate(&refit, bounds.min as f64),
        eu_at_max: evaluate(&refit, bounds.max as f64),
        adjusted_counts,
        fit: refit,
    }))
}
