//! Coverage intervals derived from dispensing records.
//!
//! Every dispensing is normalized into a closed date interval during which
//! the patient is assumed to have medication on hand. When the source data
//! does not declare an end date the interval is imputed, and the method
//! used is recorded alongside the interval.

use chrono::NaiveDate;

/// How the end date of a coverage interval was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImputationMethod {
    /// The source row declared an explicit end date
    ActualEndDate,
    /// Derived from the days of supply
    DaysSupply,
    /// Derived from the refill count at 30 days per refill
    Refills,
    /// Imputed from the drug-level median days of supply
    DrugMedian,
    /// Fallback of 30 days when nothing else is available
    Default30,
}

impl ImputationMethod {
    /// Short tag used in diagnostics and exports
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ActualEndDate => "actual_end_date",
            Self::DaysSupply => "days_supply",
            Self::Refills => "refills",
            Self::DrugMedian => "drug_median",
            Self::Default30 => "default_30",
        }
    }
}

impl std::fmt::Display for ImputationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for ImputationMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single fill normalized to a closed coverage interval.
///
/// Invariant: `end_date >= start_date`, and `days_covered` always equals
/// the length of the closed interval in days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageInterval {
    /// Person covered
    pub person_id: i64,
    /// Drug concept covered
    pub drug_concept_id: i64,
    /// Exposure row this interval came from
    pub drug_exposure_id: i64,
    /// First day of coverage
    pub start_date: NaiveDate,
    /// Last day of coverage (inclusive)
    pub end_date: NaiveDate,
    /// Length of the interval in days
    pub days_covered: i64,
    /// How the end date was determined
    pub imputation: ImputationMethod,
    /// Days of supply on the source row, carried for gap reporting
    pub days_supply: Option<i32>,
}
