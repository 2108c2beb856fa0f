//! Summary statistics over the adherence results.
//!
//! Three blocks in a fixed order: one overall row, one row per drug with
//! enough patients, and one row per PDC bucket. Within a block rows sort
//! by their subcategory label. The PDC buckets partition the full range
//! and are always all present, so downstream consumers can rely on the
//! table shape even for sparse runs.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::algorithm::{round2, round4};
use crate::models::{AdherenceStatus, PatientDrugAdherence, SummaryCategory, SummaryRow};

/// PDC bucket labels, in ascending PDC order
pub const PDC_BUCKETS: [&str; 6] = [
    "<50%",
    "50-59%",
    "60-69%",
    "70-79%",
    "80-89%",
    "90-100%",
];

/// Bucket label for a PDC value
#[must_use]
pub fn pdc_bucket(pdc: f64) -> &'static str {
    if pdc < 0.5 {
        PDC_BUCKETS[0]
    } else if pdc < 0.6 {
        PDC_BUCKETS[1]
    } else if pdc < 0.7 {
        PDC_BUCKETS[2]
    } else if pdc < 0.8 {
        PDC_BUCKETS[3]
    } else if pdc < 0.9 {
        PDC_BUCKETS[4]
    } else {
        PDC_BUCKETS[5]
    }
}

/// Build one summary row over a group of adherence rows
fn summary_row(
    category: SummaryCategory,
    subcategory: String,
    rows: &[&PatientDrugAdherence],
) -> SummaryRow {
    if rows.is_empty() {
        return SummaryRow {
            category,
            subcategory,
            patient_count: 0,
            record_count: 0,
            adherent_pct: 0.0,
            mean_pdc: 0.0,
            min_pdc: 0.0,
            max_pdc: 0.0,
            stddev_pdc: 0.0,
            mean_gap_days: 0.0,
        };
    }

    let n = rows.len() as f64;
    let patient_count = rows
        .iter()
        .map(|r| r.person_id)
        .collect::<FxHashSet<_>>()
        .len() as u64;
    let adherent = rows
        .iter()
        .filter(|r| r.adherence_status == AdherenceStatus::Adherent)
        .count() as f64;

    let mean_pdc = rows.iter().map(|r| r.pdc).sum::<f64>() / n;
    let min_pdc = rows.iter().map(|r| r.pdc).fold(f64::INFINITY, f64::min);
    let max_pdc = rows.iter().map(|r| r.pdc).fold(f64::NEG_INFINITY, f64::max);
    // Sample standard deviation; a single row has none
    let stddev_pdc = if rows.len() < 2 {
        0.0
    } else {
        (rows.iter().map(|r| (r.pdc - mean_pdc).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    };
    let mean_gap_days = rows.iter().map(|r| r.avg_gap_days).sum::<f64>() / n;

    SummaryRow {
        category,
        subcategory,
        patient_count,
        record_count: rows.len() as u64,
        adherent_pct: round2(adherent / n * 100.0),
        mean_pdc: round4(mean_pdc),
        min_pdc: round4(min_pdc),
        max_pdc: round4(max_pdc),
        stddev_pdc: round4(stddev_pdc),
        mean_gap_days: round2(mean_gap_days),
    }
}

/// Aggregate adherence rows into the summary table.
///
/// Drugs seen in fewer than `min_patients_per_drug` distinct patients
/// are left out of the per-drug block.
#[must_use]
pub fn summarize(
    rows: &[PatientDrugAdherence],
    min_patients_per_drug: usize,
) -> Vec<SummaryRow> {
    let mut summary = Vec::new();

    let all: Vec<&PatientDrugAdherence> = rows.iter().collect();
    summary.push(summary_row(
        SummaryCategory::Overall,
        "All Patients".to_string(),
        &all,
    ));

    let mut by_drug: FxHashMap<&str, Vec<&PatientDrugAdherence>> = FxHashMap::default();
    for row in rows {
        by_drug.entry(row.drug_name.as_str()).or_default().push(row);
    }
    for (drug_name, group) in by_drug {
        let patients = group
            .iter()
            .map(|r| r.person_id)
            .collect::<FxHashSet<_>>();
        if patients.len() < min_patients_per_drug {
            continue;
        }
        summary.push(summary_row(
            SummaryCategory::ByDrug,
            drug_name.to_string(),
            &group,
        ));
    }

    for bucket in PDC_BUCKETS {
        let group: Vec<&PatientDrugAdherence> = rows
            .iter()
            .filter(|r| pdc_bucket(r.pdc) == bucket)
            .collect();
        summary.push(summary_row(
            SummaryCategory::Distribution,
            bucket.to_string(),
            &group,
        ));
    }

    summary.sort_by(|a, b| {
        (a.category.rank(), a.subcategory.as_str()).cmp(&(b.category.rank(), b.subcategory.as_str()))
    });
    summary
}
