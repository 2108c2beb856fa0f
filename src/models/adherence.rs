//! Per patient-drug adherence results.

use chrono::NaiveDate;
use serde::Serialize;

/// Adherence classification relative to the configured PDC threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdherenceStatus {
    /// PDC at or above the threshold
    Adherent,
    /// PDC within 0.1 below the threshold
    ModeratelyAdherent,
    /// PDC more than 0.1 below the threshold
    NonAdherent,
}

impl AdherenceStatus {
    /// Classify a PDC value against a threshold.
    ///
    /// The moderate band covers the 0.1 interval directly below the
    /// threshold, so with the default threshold of 0.8 a PDC of 0.7
    /// is still moderately adherent while 0.699 is not.
    #[must_use]
    pub fn classify(pdc: f64, threshold: f64) -> Self {
        if pdc >= threshold {
            Self::Adherent
        } else if pdc >= threshold - 0.1 {
            Self::ModeratelyAdherent
        } else {
            Self::NonAdherent
        }
    }

    /// Label used in exports and summaries
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Adherent => "Adherent",
            Self::ModeratelyAdherent => "Moderately Adherent",
            Self::NonAdherent => "Non-Adherent",
        }
    }
}

impl std::fmt::Display for AdherenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AdherenceStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Adherence metrics for one person and one drug over the analysis window.
///
/// One row per (person, drug) pair that survived the minimum treatment
/// duration filter. `pdc` is `total_days_covered / treatment_duration`
/// rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientDrugAdherence {
    /// Person analyzed
    pub person_id: i64,
    /// Drug concept analyzed
    pub drug_concept_id: i64,
    /// Resolved drug name, or "Unknown Drug"
    pub drug_name: String,
    /// Drug class from the concept vocabulary, if known
    pub drug_class: Option<String>,
    /// Age at the end of the analysis window, if birth year is known
    pub age: Option<i32>,
    /// Proportion of days covered, in [0, 1] when capping is enabled
    pub pdc: f64,
    /// Classification of `pdc` against the configured threshold
    pub adherence_status: AdherenceStatus,
    /// Sum of days covered across merged periods
    pub total_days_covered: i64,
    /// Days from first fill to last covered day (inclusive)
    pub treatment_duration: i64,
    /// Number of dispensings for the pair
    pub total_fills: u64,
    /// Number of merged treatment periods
    pub num_periods: u64,
    /// Number of gaps between merged periods
    pub num_gaps: u64,
    /// Total days across all gaps
    pub total_gap_days: i64,
    /// Mean gap length, 0 when there are no gaps
    pub avg_gap_days: f64,
    /// Longest single gap, 0 when there are no gaps
    pub max_gap_days: i64,
    /// Start of the first fill
    pub first_exposure_date: NaiveDate,
    /// End of the last coverage interval
    pub last_exposure_date: NaiveDate,
}
