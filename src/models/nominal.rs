//! The nominal line implied by the configured count and EU bounds.

use crate::domain::{CountBounds, EuBounds};
use crate::error::CalError;

/// Straight line through `(count_min, eu_min)` and `(count_max, eu_max)`.
///
/// Values outside the bounds are extrapolated along the same line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NominalLine {
    pub counts: CountBounds,
    pub eu: EuBounds,
}

impl NominalLine {
    pub fn new(counts: CountBounds, eu: EuBounds) -> Self {
        Self { counts, eu }
    }

    /// EU the nominal line assigns to a count.
    pub fn eu_at(&self, count: f64) -> f64 {
        let span = self.counts.span();
        if span == 0.0 {
            return self.eu.min;
        }
        self.eu.min + (count - self.counts.min as f64) * self.eu.range() / span
    }

    /// Count the nominal line assigns to an EU value.
    pub fn count_at(&self, eu: f64) -> Result<f64, CalError> {
        let range = self.eu.range();
        if range == 0.0 {
            return Err(CalError::DegenerateRange { eu_range: range });
        }
        Ok(self.counts.min as f64 + (eu - self.eu.min) * self.counts.span() / range)
    }

    /// `n` evenly spaced `(count, eu)` points across the configured counts.
    pub fn sample(&self, n: usize) -> Vec<(f64, f64)> {
        let n = n.max(2);
        let c0 = self.counts.min as f64;
        let span = self.counts.span();
        (0..n)
            .map(|i| {
                let c = c0 + span * i as f64 / (n as f64 - 1.0);
                (c, self.eu_at(c))
            })
            .collect()
    }
}
