//! Adherence computation algorithms
//!
//! The pipeline from raw dispensings to reported results: end date
//! imputation into coverage intervals, merging into treatment periods,
//! PDC computation and classification, fill gap detection and summary
//! aggregation.

pub mod coverage;
pub mod gap_report;
pub mod merge;
pub mod pdc;
pub mod summary;

/// Round to two decimals, half away from zero
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to four decimals, half away from zero
#[must_use]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
