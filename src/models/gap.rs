//! Fill-to-fill gaps for the detailed gap report.

use chrono::NaiveDate;
use serde::Serialize;

/// Severity bands for gaps between consecutive fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GapSeverity {
    /// Under 7 days
    Minimal,
    /// 7 to 13 days
    Minor,
    /// 14 to 29 days
    Moderate,
    /// 30 to 89 days
    Major,
    /// 90 days or more
    Critical,
}

impl GapSeverity {
    /// Band a gap length into a severity level
    #[must_use]
    pub const fn from_gap_days(gap_days: i64) -> Self {
        if gap_days >= 90 {
            Self::Critical
        } else if gap_days >= 30 {
            Self::Major
        } else if gap_days >= 14 {
            Self::Moderate
        } else if gap_days >= 7 {
            Self::Minor
        } else {
            Self::Minimal
        }
    }

    /// Label used in the gap report
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Critical => "Critical Gap (90+ days)",
            Self::Major => "Major Gap (30-89 days)",
            Self::Moderate => "Moderate Gap (14-29 days)",
            Self::Minor => "Minor Gap (7-13 days)",
            Self::Minimal => "Minimal Gap (<7 days)",
        }
    }
}

impl std::fmt::Display for GapSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for GapSeverity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One reportable gap between two consecutive fills of the same drug.
///
/// Gaps are measured between raw fills in start date order, before any
/// period merging. Overlapping fills produce no gap. Only gaps of at
/// least the configured minimum length are reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillGap {
    /// Person with the gap
    pub person_id: i64,
    /// Drug concept the gap interrupts
    pub drug_concept_id: i64,
    /// Resolved drug name, or "Unknown Drug"
    pub drug_name: String,
    /// Position of the fill before the gap in the pair's fill sequence, 1-based
    pub fill_sequence: u32,
    /// Start date of the fill before the gap
    pub fill_before_gap_date: NaiveDate,
    /// Coverage end date of the fill before the gap
    pub fill_before_gap_end_date: NaiveDate,
    /// First uncovered day
    pub gap_start_date: NaiveDate,
    /// Last uncovered day (inclusive)
    pub gap_end_date: NaiveDate,
    /// Length of the gap in days
    pub gap_days: i64,
    /// Severity band of the gap
    pub gap_severity: GapSeverity,
    /// Start date of the fill after the gap
    pub fill_after_gap_date: NaiveDate,
    /// Days of supply on the fill before the gap, if recorded
    pub days_supply_before_gap: Option<i32>,
}
