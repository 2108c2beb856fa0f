//! Configuration for the adherence analysis.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AdherenceError, Result};

/// Drug exposure type concepts that represent pharmacy dispensings.
///
/// Used when `drug_type_filter` is enabled to drop administrations and
/// other exposure rows that do not correspond to a filled prescription.
pub const PRESCRIPTION_DRUG_TYPES: [i64; 3] = [38_000_175, 38_000_176, 581_373];

/// Tunable parameters of the adherence analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Start of the analysis window; derived from the data when absent
    pub analysis_start: Option<NaiveDate>,
    /// End of the analysis window; derived from the data when absent
    pub analysis_end: Option<NaiveDate>,
    /// PDC at or above this value counts as adherent
    pub pdc_threshold: f64,
    /// Pairs treated for fewer days than this are excluded
    pub min_treatment_days: i64,
    /// Gaps shorter than this are left out of the detailed gap report
    pub min_gap_days: i64,
    /// Drugs with fewer distinct patients are suppressed from the summary
    pub min_patients_per_drug: usize,
    /// Keep only these drug exposure types; `None` keeps everything
    pub drug_type_filter: Option<Vec<i64>>,
    /// Impute missing end dates from the drug-level median days supply
    pub use_median_fallback: bool,
    /// Clamp PDC into [0, 1] instead of reporting raw ratios above 1
    pub cap_pdc: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_start: None,
            analysis_end: None,
            pdc_threshold: 0.80,
            min_treatment_days: 30,
            min_gap_days: 7,
            min_patients_per_drug: 10,
            drug_type_filter: None,
            use_median_fallback: false,
            cap_pdc: false,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults, so a partial file
    /// overriding only the threshold is valid.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for contradictory or out-of-range values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.pdc_threshold) {
            return Err(AdherenceError::InvalidConfig(format!(
                "pdc_threshold must be within [0, 1], got {}",
                self.pdc_threshold
            )));
        }
        if self.min_treatment_days < 1 {
            return Err(AdherenceError::InvalidConfig(format!(
                "min_treatment_days must be at least 1, got {}",
                self.min_treatment_days
            )));
        }
        if self.min_gap_days < 0 {
            return Err(AdherenceError::InvalidConfig(format!(
                "min_gap_days must not be negative, got {}",
                self.min_gap_days
            )));
        }
        if let (Some(start), Some(end)) = (self.analysis_start, self.analysis_end) {
            if start > end {
                return Err(AdherenceError::InvalidConfig(format!(
                    "analysis window is inverted: {start} is after {end}"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Analysis configuration:")?;
        match self.analysis_start {
            Some(date) => writeln!(f, "  Analysis start: {date}")?,
            None => writeln!(f, "  Analysis start: from data")?,
        }
        match self.analysis_end {
            Some(date) => writeln!(f, "  Analysis end: {date}")?,
            None => writeln!(f, "  Analysis end: from data")?,
        }
        writeln!(f, "  PDC threshold: {}", self.pdc_threshold)?;
        writeln!(f, "  Minimum treatment days: {}", self.min_treatment_days)?;
        writeln!(f, "  Minimum reportable gap: {} days", self.min_gap_days)?;
        writeln!(f, "  Minimum patients per drug: {}", self.min_patients_per_drug)?;
        match &self.drug_type_filter {
            Some(types) => writeln!(f, "  Drug type filter: {types:?}")?,
            None => writeln!(f, "  Drug type filter: disabled")?,
        }
        writeln!(f, "  Median days-supply fallback: {}", self.use_median_fallback)?;
        writeln!(f, "  Cap PDC at 1.0: {}", self.cap_pdc)
    }
}
