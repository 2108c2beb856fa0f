//! Merged treatment periods and the gaps between them.

use chrono::NaiveDate;

/// A maximal run of overlapping or adjacent coverage intervals for one
/// person and drug.
///
/// Adjacency tolerates a one day gap: a fill starting the day after the
/// previous coverage ends still extends the same period. `days_covered`
/// is the calendar span of the period, not the sum of its fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedPeriod {
    /// Person covered
    pub person_id: i64,
    /// Drug concept covered
    pub drug_concept_id: i64,
    /// First day of the period
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive)
    pub period_end: NaiveDate,
    /// Number of fills merged into the period
    pub num_fills: u64,
    /// Calendar days spanned by the period
    pub days_covered: i64,
}

/// The uncovered days between two consecutive merged periods.
///
/// `gap_days` is always at least one: a zero day separation would have
/// merged the periods instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodGap {
    /// Person with the gap
    pub person_id: i64,
    /// Drug concept the gap interrupts
    pub drug_concept_id: i64,
    /// First uncovered day
    pub gap_start: NaiveDate,
    /// Last uncovered day (inclusive)
    pub gap_end: NaiveDate,
    /// Length of the gap in days
    pub gap_days: i64,
}
