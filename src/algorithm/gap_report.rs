//! Detailed gap report between consecutive fills.
//!
//! Unlike the period gaps feeding the adherence aggregates, this report
//! looks at raw fills in dispensing order. A refill picked up while the
//! previous supply still runs produces no gap, and a short lapse under
//! the configured minimum is not reported. Every reported gap names the
//! fill before it, so the report reads as a refill history.

use itertools::Itertools;

use crate::cdm::ConceptLookup;
use crate::models::{CoverageInterval, FillGap, GapSeverity};

/// Find reportable gaps between consecutive fills of each person-drug pair.
///
/// `min_gap_days` is the report floor; values under one behave as one,
/// since a zero day gap does not exist between distinct fills.
#[must_use]
pub fn detailed_gaps(
    intervals: &[CoverageInterval],
    concepts: &ConceptLookup,
    min_gap_days: i64,
) -> Vec<FillGap> {
    let effective_min = min_gap_days.max(1);

    let mut refs: Vec<&CoverageInterval> = intervals.iter().collect();
    refs.sort_unstable_by_key(|iv| {
        (
            iv.person_id,
            iv.drug_concept_id,
            iv.start_date,
            iv.end_date,
            iv.drug_exposure_id,
        )
    });

    let mut gaps = Vec::new();

    for ((person_id, drug_concept_id), group) in
        &refs.into_iter().chunk_by(|iv| (iv.person_id, iv.drug_concept_id))
    {
        let fills: Vec<&CoverageInterval> = group.collect();

        for (idx, (current, next)) in fills.iter().tuple_windows().enumerate() {
            let gap_days = ((next.start_date - current.end_date).num_days() - 1).max(0);
            if gap_days < effective_min {
                continue;
            }
            let Some(gap_start_date) = current.end_date.succ_opt() else {
                continue;
            };
            let Some(gap_end_date) = next.start_date.pred_opt() else {
                continue;
            };

            gaps.push(FillGap {
                person_id,
                drug_concept_id,
                drug_name: concepts.display_name(drug_concept_id).to_string(),
                fill_sequence: u32::try_from(idx + 1).unwrap_or(u32::MAX),
                fill_before_gap_date: current.start_date,
                fill_before_gap_end_date: current.end_date,
                gap_start_date,
                gap_end_date,
                gap_days,
                gap_severity: GapSeverity::from_gap_days(gap_days),
                fill_after_gap_date: next.start_date,
                days_supply_before_gap: current.days_supply,
            });
        }
    }

    gaps
}
