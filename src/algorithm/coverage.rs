//! End date imputation and coverage interval extraction.
//!
//! Every dispensing is turned into a closed coverage interval. The end
//! date comes from the first applicable rule: a declared end date, the
//! days of supply, the refill count at 30 days per refill, optionally the
//! drug-level median days of supply, and finally a flat 30 day default.
//! `days_covered` always equals the closed interval length regardless of
//! which rule fired.

use chrono::Days;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::models::{CoverageInterval, DispensingRecord, ImputationMethod};

/// Days assumed per fill when nothing better is known
pub const DEFAULT_SUPPLY_DAYS: u64 = 30;

/// Lower median of the positive days-supply values per drug.
///
/// Drugs with no positive days-supply value anywhere have no entry.
#[must_use]
pub fn drug_median_supply(records: &[DispensingRecord]) -> FxHashMap<i64, i64> {
    let mut by_drug: FxHashMap<i64, Vec<i64>> = FxHashMap::default();
    for record in records {
        if let Some(days) = record.days_supply {
            if days > 0 {
                by_drug
                    .entry(record.drug_concept_id)
                    .or_default()
                    .push(i64::from(days));
            }
        }
    }

    by_drug
        .into_iter()
        .map(|(drug, mut values)| {
            values.sort_unstable();
            (drug, values[(values.len() - 1) / 2])
        })
        .collect()
}

/// End date and the rule that produced it, or `None` when the computed
/// date falls outside the representable range
fn imputed_end(
    record: &DispensingRecord,
    medians: Option<&FxHashMap<i64, i64>>,
) -> Option<(NaiveDate, ImputationMethod)> {
    if let Some(end) = record.end_date {
        return Some((end, ImputationMethod::ActualEndDate));
    }

    if let Some(days) = record.days_supply {
        if days > 0 {
            let end = record
                .start_date
                .checked_add_days(Days::new(days as u64 - 1))?;
            return Some((end, ImputationMethod::DaysSupply));
        }
    }

    if let Some(refills) = record.refills {
        if refills > 0 {
            let offset = i64::from(refills) * 30 - 1;
            let end = record
                .start_date
                .checked_add_days(Days::new(offset as u64))?;
            return Some((end, ImputationMethod::Refills));
        }
    }

    if let Some(medians) = medians {
        if let Some(&median) = medians.get(&record.drug_concept_id) {
            let end = record
                .start_date
                .checked_add_days(Days::new(median as u64 - 1))?;
            return Some((end, ImputationMethod::DrugMedian));
        }
    }

    let end = record
        .start_date
        .checked_add_days(Days::new(DEFAULT_SUPPLY_DAYS - 1))?;
    Some((end, ImputationMethod::Default30))
}

/// Normalize dispensing records into coverage intervals.
///
/// The median fallback only participates when enabled; it sits between
/// the refill rule and the 30 day default. Records whose computed end
/// date overflows the calendar are dropped.
#[must_use]
pub fn extract_coverage(
    records: &[DispensingRecord],
    use_median_fallback: bool,
) -> Vec<CoverageInterval> {
    let medians = if use_median_fallback {
        Some(drug_median_supply(records))
    } else {
        None
    };

    records
        .iter()
        .filter_map(|record| {
            let Some((end_date, imputation)) = imputed_end(record, medians.as_ref()) else {
                log::debug!(
                    "Dropping dispensing {} with an out-of-range end date",
                    record.drug_exposure_id
                );
                return None;
            };
            let days_covered = (end_date - record.start_date).num_days() + 1;
            Some(CoverageInterval {
                person_id: record.person_id,
                drug_concept_id: record.drug_concept_id,
                drug_exposure_id: record.drug_exposure_id,
                start_date: record.start_date,
                end_date,
                days_covered,
                imputation,
                days_supply: record.days_supply,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_median_is_lower_median_of_positive_values() {
        let mut records = vec![
            DispensingRecord::new(1, 100, 1, date(2024, 1, 1)),
            DispensingRecord::new(1, 100, 2, date(2024, 2, 1)),
            DispensingRecord::new(1, 100, 3, date(2024, 3, 1)),
            DispensingRecord::new(1, 100, 4, date(2024, 4, 1)),
        ];
        records[0].days_supply = Some(10);
        records[1].days_supply = Some(90);
        records[2].days_supply = Some(30);
        records[3].days_supply = Some(0);

        let medians = drug_median_supply(&records);
        assert_eq!(medians.get(&100), Some(&30));

        // Even count takes the lower middle value
        records[3].days_supply = Some(60);
        let medians = drug_median_supply(&records);
        assert_eq!(medians.get(&100), Some(&30));
    }

    #[test]
    fn test_drugs_without_positive_supply_have_no_median() {
        let mut records = vec![DispensingRecord::new(1, 100, 1, date(2024, 1, 1))];
        records[0].days_supply = Some(-5);
        let medians = drug_median_supply(&records);
        assert!(medians.is_empty());
    }
}
