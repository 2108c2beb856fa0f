//! Aggregate summary statistics over the adherence results.

use serde::Serialize;

/// Grouping dimension of a summary row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SummaryCategory {
    /// Single row covering the whole result set
    Overall,
    /// One row per drug with enough patients
    ByDrug,
    /// One row per PDC bucket
    Distribution,
}

impl SummaryCategory {
    /// Sort rank, fixing the category order of the summary table
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Overall => 0,
            Self::ByDrug => 1,
            Self::Distribution => 2,
        }
    }

    /// Label used in the summary export
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overall => "Overall",
            Self::ByDrug => "By Drug",
            Self::Distribution => "PDC Distribution",
        }
    }
}

impl std::fmt::Display for SummaryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SummaryCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One row of the summary statistics table.
///
/// Percentages are rounded to two decimals, PDC moments to four.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Grouping dimension
    pub category: SummaryCategory,
    /// Group label within the category
    pub subcategory: String,
    /// Distinct patients in the group
    pub patient_count: u64,
    /// Patient-drug rows in the group
    pub record_count: u64,
    /// Percentage of rows classified adherent
    pub adherent_pct: f64,
    /// Mean PDC of the group
    pub mean_pdc: f64,
    /// Minimum PDC of the group
    pub min_pdc: f64,
    /// Maximum PDC of the group
    pub max_pdc: f64,
    /// Sample standard deviation of PDC, 0 for groups under two rows
    pub stddev_pdc: f64,
    /// Mean of the per-row average gap lengths
    pub mean_gap_days: f64,
}
