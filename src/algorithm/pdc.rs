//! Proportion of days covered per patient and drug.
//!
//! Each person-drug pair is summarized independently: its intervals are
//! merged into periods, the treatment duration is measured from first
//! fill to last covered day, and PDC is the covered share of that span.
//! Pairs are processed in parallel and returned in (person, drug) order.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::algorithm::merge::{merge_intervals, period_gaps};
use crate::algorithm::{round2, round4};
use crate::cdm::{ConceptLookup, PersonLookup};
use crate::config::AnalysisConfig;
use crate::models::{AdherenceStatus, CoverageInterval, PatientDrugAdherence};
use crate::utils::progress::{create_main_progress_bar, finish_progress_bar};

/// Lookup context shared by all pairs during adherence computation
pub struct AdherenceContext<'a> {
    /// Drug vocabulary for names and classes
    pub concepts: &'a ConceptLookup,
    /// Birth years for age reporting
    pub persons: &'a PersonLookup,
    /// Year ages are computed against, normally the analysis window end
    pub reference_year: i32,
}

/// Summarize one person-drug pair, or `None` when the pair is under the
/// minimum treatment duration
fn summarize_pair(
    person_id: i64,
    drug_concept_id: i64,
    intervals: &mut [CoverageInterval],
    config: &AnalysisConfig,
    context: &AdherenceContext<'_>,
) -> Option<PatientDrugAdherence> {
    let periods = merge_intervals(intervals);
    let first = periods.first()?;
    let last = periods.last()?;

    let first_exposure_date = first.period_start;
    let last_exposure_date = last.period_end;
    let treatment_duration = (last_exposure_date - first_exposure_date).num_days() + 1;
    if treatment_duration < config.min_treatment_days {
        return None;
    }

    let total_days_covered: i64 = periods.iter().map(|p| p.days_covered).sum();
    let total_fills: u64 = periods.iter().map(|p| p.num_fills).sum();

    let gaps = period_gaps(&periods);
    let num_gaps = gaps.len() as u64;
    let total_gap_days: i64 = gaps.iter().map(|g| g.gap_days).sum();
    let max_gap_days = gaps.iter().map(|g| g.gap_days).max().unwrap_or(0);
    let avg_gap_days = if num_gaps > 0 {
        round2(total_gap_days as f64 / num_gaps as f64)
    } else {
        0.0
    };

    let mut pdc = total_days_covered as f64 / treatment_duration as f64;
    if config.cap_pdc {
        pdc = pdc.clamp(0.0, 1.0);
    }
    let pdc = round4(pdc);
    let adherence_status = AdherenceStatus::classify(pdc, config.pdc_threshold);

    Some(PatientDrugAdherence {
        person_id,
        drug_concept_id,
        drug_name: context.concepts.display_name(drug_concept_id).to_string(),
        drug_class: context
            .concepts
            .concept_class(drug_concept_id)
            .map(ToString::to_string),
        age: context.persons.age_at(person_id, context.reference_year),
        pdc,
        adherence_status,
        total_days_covered,
        treatment_duration,
        total_fills,
        num_periods: periods.len() as u64,
        num_gaps,
        total_gap_days,
        avg_gap_days,
        max_gap_days,
        first_exposure_date,
        last_exposure_date,
    })
}

/// Compute adherence rows for every person-drug pair in the intervals.
///
/// Pairs under the minimum treatment duration are dropped. The output is
/// sorted by (person, drug) regardless of thread scheduling.
#[must_use]
pub fn compute_adherence(
    intervals: &[CoverageInterval],
    config: &AnalysisConfig,
    context: &AdherenceContext<'_>,
) -> Vec<PatientDrugAdherence> {
    let mut partition: FxHashMap<(i64, i64), SmallVec<[CoverageInterval; 8]>> =
        FxHashMap::default();
    for interval in intervals {
        partition
            .entry((interval.person_id, interval.drug_concept_id))
            .or_default()
            .push(*interval);
    }

    let mut pairs: Vec<((i64, i64), SmallVec<[CoverageInterval; 8]>)> =
        partition.into_iter().collect();
    pairs.sort_unstable_by_key(|(key, _)| *key);

    let progress =
        create_main_progress_bar(pairs.len() as u64, Some("Computing adherence"));

    let results: Vec<PatientDrugAdherence> = pairs
        .into_par_iter()
        .filter_map(|((person_id, drug_concept_id), mut pair_intervals)| {
            let row = summarize_pair(
                person_id,
                drug_concept_id,
                pair_intervals.as_mut_slice(),
                config,
                context,
            );
            progress.inc(1);
            row
        })
        .collect();

    finish_progress_bar(&progress, None);

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImputationMethod;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn interval(
        person_id: i64,
        drug_concept_id: i64,
        exposure_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoverageInterval {
        CoverageInterval {
            person_id,
            drug_concept_id,
            drug_exposure_id: exposure_id,
            start_date: start,
            end_date: end,
            days_covered: (end - start).num_days() + 1,
            imputation: ImputationMethod::DaysSupply,
            days_supply: Some(30),
        }
    }

    #[test]
    fn test_covered_and_gap_days_tile_the_duration() {
        let intervals = vec![
            interval(1, 100, 1, date(2024, 1, 1), date(2024, 1, 30)),
            interval(1, 100, 2, date(2024, 2, 15), date(2024, 3, 15)),
            interval(1, 100, 3, date(2024, 5, 1), date(2024, 5, 30)),
        ];
        let config = AnalysisConfig::default();
        let concepts = ConceptLookup::default();
        let persons = PersonLookup::default();
        let context = AdherenceContext {
            concepts: &concepts,
            persons: &persons,
            reference_year: 2024,
        };

        let rows = compute_adherence(&intervals, &config, &context);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(
            row.total_days_covered + row.total_gap_days,
            row.treatment_duration
        );
        assert_eq!(row.num_periods, 3);
        assert_eq!(row.num_gaps, 2);
    }

    #[test]
    fn test_short_treatment_is_excluded() {
        let intervals = vec![interval(1, 100, 1, date(2024, 1, 1), date(2024, 1, 29))];
        let config = AnalysisConfig::default();
        let concepts = ConceptLookup::default();
        let persons = PersonLookup::default();
        let context = AdherenceContext {
            concepts: &concepts,
            persons: &persons,
            reference_year: 2024,
        };

        // 29 days is under the 30 day minimum
        assert!(compute_adherence(&intervals, &config, &context).is_empty());
    }
}
