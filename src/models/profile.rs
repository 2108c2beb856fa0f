//! Descriptive profile of a loaded dispensing dataset.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use crate::models::DispensingRecord;

/// Headline statistics about the dispensing records before analysis.
///
/// Logged after loading so a run's input is documented next to its
/// results. The null days-supply share matters because those records
/// fall through to the weaker end date imputation rules.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatasetProfile {
    /// Total dispensing records loaded
    pub total_records: usize,
    /// Distinct persons across the records
    pub unique_patients: usize,
    /// Distinct drug concepts across the records
    pub unique_drugs: usize,
    /// Earliest dispensing start date
    pub first_start_date: Option<NaiveDate>,
    /// Latest dispensing start date
    pub last_start_date: Option<NaiveDate>,
    /// Records without a days-supply value
    pub null_days_supply: usize,
    /// Share of records without a days-supply value, in percent
    pub pct_null_days_supply: f64,
}

impl DatasetProfile {
    /// Profile a slice of dispensing records
    #[must_use]
    pub fn from_records(records: &[DispensingRecord]) -> Self {
        let mut patients = FxHashSet::default();
        let mut drugs = FxHashSet::default();
        let mut first_start: Option<NaiveDate> = None;
        let mut last_start: Option<NaiveDate> = None;
        let mut null_days_supply = 0;

        for record in records {
            patients.insert(record.person_id);
            drugs.insert(record.drug_concept_id);
            if record.days_supply.is_none() {
                null_days_supply += 1;
            }
            first_start = Some(first_start.map_or(record.start_date, |d| d.min(record.start_date)));
            last_start = Some(last_start.map_or(record.start_date, |d| d.max(record.start_date)));
        }

        let pct_null_days_supply = if records.is_empty() {
            0.0
        } else {
            crate::algorithm::round2(null_days_supply as f64 / records.len() as f64 * 100.0)
        };

        Self {
            total_records: records.len(),
            unique_patients: patients.len(),
            unique_drugs: drugs.len(),
            first_start_date: first_start,
            last_start_date: last_start,
            null_days_supply,
            pct_null_days_supply,
        }
    }
}

impl std::fmt::Display for DatasetProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dataset profile:")?;
        writeln!(f, "  Total records: {}", self.total_records)?;
        writeln!(f, "  Unique patients: {}", self.unique_patients)?;
        writeln!(f, "  Unique drugs: {}", self.unique_drugs)?;
        match (self.first_start_date, self.last_start_date) {
            (Some(first), Some(last)) => writeln!(f, "  Dispensing dates: {first} to {last}")?,
            _ => writeln!(f, "  Dispensing dates: none")?,
        }
        writeln!(
            f,
            "  Missing days supply: {} ({}%)",
            self.null_days_supply, self.pct_null_days_supply
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_profile_counts_distinct_ids_and_nulls() {
        let mut records = vec![
            DispensingRecord::new(1, 100, 1, date(2024, 3, 1)),
            DispensingRecord::new(1, 200, 2, date(2024, 1, 15)),
            DispensingRecord::new(2, 100, 3, date(2024, 6, 30)),
        ];
        records[0].days_supply = Some(30);

        let profile = DatasetProfile::from_records(&records);
        assert_eq!(profile.total_records, 3);
        assert_eq!(profile.unique_patients, 2);
        assert_eq!(profile.unique_drugs, 2);
        assert_eq!(profile.first_start_date, Some(date(2024, 1, 15)));
        assert_eq!(profile.last_start_date, Some(date(2024, 6, 30)));
        assert_eq!(profile.null_days_supply, 2);
        assert_eq!(profile.pct_null_days_supply, 66.67);
    }

    #[test]
    fn test_empty_profile_has_no_dates() {
        let profile = DatasetProfile::from_records(&[]);
        assert_eq!(profile.total_records, 0);
        assert_eq!(profile.first_start_date, None);
        assert_eq!(profile.pct_null_days_supply, 0.0);
    }
}
