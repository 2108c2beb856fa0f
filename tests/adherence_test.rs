//! Tests for per patient-drug adherence computation

use chrono::NaiveDate;
use pdc_analyzer::algorithm::coverage::extract_coverage;
use pdc_analyzer::algorithm::pdc::{AdherenceContext, compute_adherence};
use pdc_analyzer::models::{AdherenceStatus, DispensingRecord};
use pdc_analyzer::{AnalysisConfig, ConceptLookup, PersonLookup};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fill(person_id: i64, drug: i64, exposure_id: i64, start: NaiveDate, supply: i32) -> DispensingRecord {
    let mut r = DispensingRecord::new(person_id, drug, exposure_id, start);
    r.days_supply = Some(supply);
    r
}

fn fill_until(person_id: i64, drug: i64, exposure_id: i64, start: NaiveDate, end: NaiveDate) -> DispensingRecord {
    let mut r = DispensingRecord::new(person_id, drug, exposure_id, start);
    r.end_date = Some(end);
    r
}

fn run(records: &[DispensingRecord], config: &AnalysisConfig) -> Vec<pdc_analyzer::PatientDrugAdherence> {
    let intervals = extract_coverage(records, config.use_median_fallback);
    let concepts = ConceptLookup::default();
    let persons = PersonLookup::default();
    let context = AdherenceContext {
        concepts: &concepts,
        persons: &persons,
        reference_year: 2024,
    };
    compute_adherence(&intervals, config, &context)
}

#[test]
fn test_pdc_is_the_covered_share_of_the_treatment_span() {
    // Two 30 day fills with a 15 day lapse between supplies
    let records = vec![
        fill(1, 100, 1, date(2024, 1, 1), 30),
        fill(1, 100, 2, date(2024, 2, 15), 30),
    ];

    let rows = run(&records, &AnalysisConfig::default());
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.treatment_duration, 75);
    assert_eq!(row.total_days_covered, 60);
    assert_eq!(row.pdc, 0.8);
    assert_eq!(row.adherence_status, AdherenceStatus::Adherent);
    assert_eq!(row.total_fills, 2);
    assert_eq!(row.num_periods, 2);
    assert_eq!(row.num_gaps, 1);
    assert_eq!(row.total_gap_days, 15);
    assert_eq!(row.max_gap_days, 15);
    assert_eq!(row.avg_gap_days, 15.0);
    assert_eq!(row.first_exposure_date, date(2024, 1, 1));
    assert_eq!(row.last_exposure_date, date(2024, 3, 15));
}

#[test]
fn test_uninterrupted_coverage_gives_a_pdc_of_one() {
    let records = vec![
        fill(1, 100, 1, date(2024, 1, 1), 30),
        fill(1, 100, 2, date(2024, 1, 31), 30),
        fill(1, 100, 3, date(2024, 3, 1), 30),
    ];

    let rows = run(&records, &AnalysisConfig::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].pdc, 1.0);
    assert_eq!(rows[0].num_periods, 1);
    assert_eq!(rows[0].num_gaps, 0);
    assert_eq!(rows[0].total_gap_days, 0);
    assert_eq!(rows[0].avg_gap_days, 0.0);
    assert_eq!(rows[0].max_gap_days, 0);
}

#[test]
fn test_every_status_band_is_reachable() {
    let records = vec![
        // Person 1: covered 90 of 90
        fill_until(1, 100, 1, date(2024, 1, 1), date(2024, 3, 30)),
        // Person 2: covered 75 of 100
        fill_until(2, 100, 2, date(2024, 1, 1), date(2024, 3, 10)),
        fill_until(2, 100, 3, date(2024, 4, 5), date(2024, 4, 9)),
        // Person 3: covered 60 of 100
        fill_until(3, 100, 4, date(2024, 1, 1), date(2024, 2, 19)),
        fill_until(3, 100, 5, date(2024, 3, 31), date(2024, 4, 9)),
    ];

    let rows = run(&records, &AnalysisConfig::default());
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].pdc, 1.0);
    assert_eq!(rows[0].adherence_status, AdherenceStatus::Adherent);
    assert_eq!(rows[1].pdc, 0.75);
    assert_eq!(rows[1].adherence_status, AdherenceStatus::ModeratelyAdherent);
    assert_eq!(rows[2].pdc, 0.6);
    assert_eq!(rows[2].adherence_status, AdherenceStatus::NonAdherent);
}

#[test]
fn test_pdc_is_rounded_to_four_decimals() {
    // 41 covered days out of 51
    let records = vec![
        fill(1, 100, 1, date(2024, 1, 1), 30),
        fill_until(1, 100, 2, date(2024, 2, 10), date(2024, 2, 20)),
    ];

    let rows = run(&records, &AnalysisConfig::default());
    assert_eq!(rows[0].treatment_duration, 51);
    assert_eq!(rows[0].total_days_covered, 41);
    assert_eq!(rows[0].pdc, 0.8039);
}

#[test]
fn test_rows_are_ordered_by_person_then_drug() {
    let records = vec![
        fill(2, 200, 1, date(2024, 1, 1), 60),
        fill(1, 200, 2, date(2024, 1, 1), 60),
        fill(2, 100, 3, date(2024, 1, 1), 60),
        fill(1, 100, 4, date(2024, 1, 1), 60),
    ];

    let rows = run(&records, &AnalysisConfig::default());
    let keys: Vec<(i64, i64)> = rows.iter().map(|r| (r.person_id, r.drug_concept_id)).collect();
    assert_eq!(keys, vec![(1, 100), (1, 200), (2, 100), (2, 200)]);
}

#[test]
fn test_treatment_duration_boundary_is_inclusive() {
    // Exactly 30 days stays in, the default minimum
    let records = vec![fill(1, 100, 1, date(2024, 1, 1), 30)];
    let rows = run(&records, &AnalysisConfig::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].treatment_duration, 30);

    // A stricter minimum drops the same pair
    let config = AnalysisConfig {
        min_treatment_days: 31,
        ..AnalysisConfig::default()
    };
    assert!(run(&records, &config).is_empty());
}

#[test]
fn test_threshold_shifts_the_status_bands() {
    let records = vec![
        fill(1, 100, 1, date(2024, 1, 1), 30),
        fill(1, 100, 2, date(2024, 2, 15), 30),
    ];

    // PDC 0.8 against a 0.9 threshold lands in the moderate band
    let config = AnalysisConfig {
        pdc_threshold: 0.9,
        ..AnalysisConfig::default()
    };
    let rows = run(&records, &config);
    assert_eq!(rows[0].pdc, 0.8);
    assert_eq!(rows[0].adherence_status, AdherenceStatus::ModeratelyAdherent);
}

#[test]
fn test_lookups_enrich_the_rows() {
    let mut concepts = ConceptLookup::default();
    concepts.insert(100, "Metformin 500mg", Some("Clinical Drug"));
    let mut persons = PersonLookup::default();
    persons.insert(1, 1970);

    let records = vec![
        fill(1, 100, 1, date(2024, 1, 1), 60),
        fill(2, 999, 2, date(2024, 1, 1), 60),
    ];
    let intervals = extract_coverage(&records, false);
    let config = AnalysisConfig::default();
    let context = AdherenceContext {
        concepts: &concepts,
        persons: &persons,
        reference_year: 2024,
    };

    let rows = compute_adherence(&intervals, &config, &context);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].drug_name, "Metformin 500mg");
    assert_eq!(rows[0].drug_class.as_deref(), Some("Clinical Drug"));
    assert_eq!(rows[0].age, Some(54));

    // Unresolved concept and person degrade without failing
    assert_eq!(rows[1].drug_name, "Unknown Drug");
    assert_eq!(rows[1].drug_class, None);
    assert_eq!(rows[1].age, None);
}

#[test]
fn test_same_person_is_scored_per_drug() {
    let records = vec![
        fill(1, 100, 1, date(2024, 1, 1), 30),
        fill(1, 100, 2, date(2024, 1, 31), 30),
        fill(1, 200, 3, date(2024, 1, 1), 30),
        fill(1, 200, 4, date(2024, 3, 1), 30),
    ];

    let rows = run(&records, &AnalysisConfig::default());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].drug_concept_id, 100);
    assert_eq!(rows[0].pdc, 1.0);
    assert_eq!(rows[1].drug_concept_id, 200);
    assert!(rows[1].pdc < 1.0);
}
