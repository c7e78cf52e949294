//! Per-record calibration pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! (simulate) -> fit -> derive stats -> offset compensation -> assemble report
//!
//! Records are independent, so a batch runs them on the rayon pool and hands
//! the outcomes back in input order for rendering.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{CalibrationRecord, DerivedStats, FitResult, OffsetCompensation, RunConfig};
use crate::error::{AppError, CalError};
use crate::fit::{fit, offset_compensation, record_seed, simulate};
use crate::report::{CalibrationReport, assemble};
use crate::stats::derive_stats;

/// Simulation noise as a fraction of the count span when none is given.
pub const DEFAULT_NOISE_FRACTION: f64 = 0.01;

/// All computed outputs for one record.
#[derive(Debug, Clone)]
pub struct RecordRun {
    /// The record as fitted (simulated counts substituted when simulating).
    pub record: CalibrationRecord,
    pub fit: FitResult,
    pub stats: DerivedStats,
    pub offset: Option<OffsetCompensation>,
    pub report: CalibrationReport,
}

/// Run one record through the pipeline.
///
/// `index` is the record's position in the batch and only feeds the
/// per-record simulation seed.
pub fn process_record(record: &CalibrationRecord, index: usize, config: &RunConfig) -> Result<RecordRun, CalError> {
    let record = if config.simulate {
        let noise = config
            .noise_std_dev
            .unwrap_or_else(|| DEFAULT_NOISE_FRACTION * record.count_bounds.span().abs());
        let seed = record_seed(config.seed, index);
        let counts = simulate(&record.eus, record.count_bounds, record.eu_bounds, noise, seed)?;
        debug!(instrument = %record.instrument, seed, noise, ?counts, "simulated counts");
        record.with_counts(counts)
    } else {
        record.clone()
    };

    let fit = fit(&record.counts, &record.eus, config.degree)?;
    let stats = derive_stats(&fit, &record, config.range_policy)?;

    let offset = match offset_compensation(&fit, &record.counts, &record.eus, record.count_bounds) {
        Ok(offset) => offset,
        Err(e) => {
            warn!(instrument = %record.instrument, "offset compensation skipped: {e}");
            None
        }
    };

    let report = assemble(&record, &fit, &stats, offset.as_ref());
    info!(
        instrument = %record.instrument,
        degree = fit.degree,
        rmse = fit.quality.rmse,
        polynomial = %report.polynomial,
        "calibrated"
    );

    Ok(RecordRun {
        record,
        fit,
        stats,
        offset,
        report,
    })
}

/// Run every record. Outcomes are returned in input order; failures carry the
/// instrument name.
///
/// With `fail_fast` the records run one at a time and the batch stops after
/// the first failure, which is the last outcome returned.
pub fn run_batch(records: &[CalibrationRecord], config: &RunConfig) -> Vec<Result<RecordRun, AppError>> {
    let run_one = |index: usize, record: &CalibrationRecord| {
        process_record(record, index, config).map_err(|e| AppError::from(e).for_instrument(&record.instrument))
    };

    if !config.fail_fast {
        return records
            .par_iter()
            .enumerate()
            .map(|(index, record)| run_one(index, record))
            .collect();
    }

    let mut outcomes = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let outcome = run_one(index, record);
        let failed = outcome.is_err();
        outcomes.push(outcome);
        if failed {
            break;
        }
    }
    outcomes
}
