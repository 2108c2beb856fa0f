//! Merging coverage intervals into treatment periods.
//!
//! Intervals for one person and drug merge into a single period whenever
//! they overlap or are separated by at most one day. The scan tracks the
//! running maximum end date, so an early long fill correctly absorbs
//! later short fills nested inside it.

use itertools::Itertools;

use crate::models::{CoverageInterval, MergedPeriod, PeriodGap};

/// Merge the coverage intervals of a single person-drug pair.
///
/// The slice is sorted in place by start date before scanning. All
/// intervals must belong to the same person and drug; the output periods
/// are ordered and pairwise separated by at least two days.
#[must_use]
pub fn merge_intervals(intervals: &mut [CoverageInterval]) -> Vec<MergedPeriod> {
    let Some(&first) = intervals.first() else {
        return Vec::new();
    };

    intervals.sort_unstable_by_key(|iv| (iv.start_date, iv.end_date, iv.drug_exposure_id));

    let mut periods = Vec::new();
    let mut period_start = first.start_date;
    let mut max_end = first.end_date;
    let mut num_fills: u64 = 1;

    for interval in &intervals[1..] {
        // A fill starting the day after the running end still extends
        // the period
        let extends = match max_end.succ_opt() {
            Some(next_day) => interval.start_date <= next_day,
            None => true,
        };

        if extends {
            num_fills += 1;
            max_end = max_end.max(interval.end_date);
        } else {
            periods.push(MergedPeriod {
                person_id: first.person_id,
                drug_concept_id: first.drug_concept_id,
                period_start,
                period_end: max_end,
                num_fills,
                days_covered: (max_end - period_start).num_days() + 1,
            });
            period_start = interval.start_date;
            max_end = interval.end_date;
            num_fills = 1;
        }
    }

    periods.push(MergedPeriod {
        person_id: first.person_id,
        drug_concept_id: first.drug_concept_id,
        period_start,
        period_end: max_end,
        num_fills,
        days_covered: (max_end - period_start).num_days() + 1,
    });

    periods
}

/// Gaps between consecutive merged periods.
///
/// For ordered periods of one pair every gap is at least one day, since
/// closer periods would have merged.
#[must_use]
pub fn period_gaps(periods: &[MergedPeriod]) -> Vec<PeriodGap> {
    periods
        .iter()
        .tuple_windows()
        .filter_map(|(previous, next)| {
            let gap_days = (next.period_start - previous.period_end).num_days() - 1;
            if gap_days <= 0 {
                return None;
            }
            let gap_start = previous.period_end.succ_opt()?;
            let gap_end = next.period_start.pred_opt()?;
            Some(PeriodGap {
                person_id: previous.person_id,
                drug_concept_id: previous.drug_concept_id,
                gap_start,
                gap_end,
                gap_days,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImputationMethod;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn interval(exposure_id: i64, start: NaiveDate, end: NaiveDate) -> CoverageInterval {
        CoverageInterval {
            person_id: 1,
            drug_concept_id: 100,
            drug_exposure_id: exposure_id,
            start_date: start,
            end_date: end,
            days_covered: (end - start).num_days() + 1,
            imputation: ImputationMethod::DaysSupply,
            days_supply: None,
        }
    }

    #[test]
    fn test_nested_fill_does_not_split_the_period() {
        // Long first fill, short second fill entirely inside it, third
        // fill adjacent to the long fill's end
        let mut intervals = vec![
            interval(1, date(2024, 1, 1), date(2024, 3, 31)),
            interval(2, date(2024, 1, 10), date(2024, 1, 20)),
            interval(3, date(2024, 4, 1), date(2024, 4, 30)),
        ];

        let periods = merge_intervals(&mut intervals);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].period_start, date(2024, 1, 1));
        assert_eq!(periods[0].period_end, date(2024, 4, 30));
        assert_eq!(periods[0].num_fills, 3);
        assert_eq!(periods[0].days_covered, 121);
    }

    #[test]
    fn test_two_day_separation_starts_a_new_period() {
        let mut intervals = vec![
            interval(1, date(2024, 1, 1), date(2024, 1, 10)),
            interval(2, date(2024, 1, 12), date(2024, 1, 20)),
        ];

        let periods = merge_intervals(&mut intervals);
        assert_eq!(periods.len(), 2);

        let gaps = period_gaps(&periods);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].gap_start, date(2024, 1, 11));
        assert_eq!(gaps[0].gap_end, date(2024, 1, 11));
        assert_eq!(gaps[0].gap_days, 1);
    }

    #[test]
    fn test_one_day_separation_merges() {
        let mut intervals = vec![
            interval(1, date(2024, 1, 1), date(2024, 1, 10)),
            interval(2, date(2024, 1, 11), date(2024, 1, 20)),
        ];

        let periods = merge_intervals(&mut intervals);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].days_covered, 20);
    }

    #[test]
    fn test_empty_input_gives_no_periods() {
        let mut intervals: Vec<CoverageInterval> = Vec::new();
        assert!(merge_intervals(&mut intervals).is_empty());
        assert!(period_gaps(&[]).is_empty());
    }
}
