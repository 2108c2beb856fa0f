//! Tests for CDM table conversion from Arrow record batches

use std::error::Error;
use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, Int32Array, Int64Array, record_batch};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use pdc_analyzer::cdm::schemas::drug_exposure_schema;
use pdc_analyzer::cdm::{ConceptLookup, PersonLookup, UNKNOWN_DRUG, records_from_batches};
use pdc_analyzer::AdherenceError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn epoch_days(y: i32, m: u32, d: u32) -> i32 {
    (date(y, m, d) - date(1970, 1, 1)).num_days() as i32
}

#[test]
fn test_date32_dispensings_convert_in_row_order() -> Result<(), Box<dyn Error>> {
    // Full batch in the shape a real drug_exposure export has
    let batch = RecordBatch::try_new(
        drug_exposure_schema(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])),
            Arc::new(Int64Array::from(vec![10, 20, 30])),
            Arc::new(Int64Array::from(vec![100, 100, 200])),
            Arc::new(Date32Array::from(vec![
                epoch_days(2024, 1, 1),
                epoch_days(2024, 2, 1),
                epoch_days(2024, 3, 1),
            ])),
            Arc::new(Date32Array::from(vec![
                Some(epoch_days(2024, 1, 30)),
                None,
                Some(epoch_days(2024, 2, 1)),
            ])),
            Arc::new(Int64Array::from(vec![Some(38_000_175), None, None])),
            Arc::new(Int32Array::from(vec![None, Some(2), None])),
            Arc::new(Float64Array::from(vec![Some(30.0), None, None])),
            Arc::new(Int32Array::from(vec![Some(30), None, None])),
        ],
    )?;

    let outcome = records_from_batches(&[batch])?;

    // The third row has an end date before its start and is dropped
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.rejected, 1);

    let first = &outcome.records[0];
    assert_eq!(first.drug_exposure_id, 1);
    assert_eq!(first.person_id, 10);
    assert_eq!(first.drug_concept_id, 100);
    assert_eq!(first.start_date, date(2024, 1, 1));
    assert_eq!(first.end_date, Some(date(2024, 1, 30)));
    assert_eq!(first.drug_type_concept_id, Some(38_000_175));
    assert_eq!(first.refills, None);
    assert_eq!(first.quantity, Some(30.0));
    assert_eq!(first.days_supply, Some(30));

    let second = &outcome.records[1];
    assert_eq!(second.person_id, 20);
    assert_eq!(second.end_date, None);
    assert_eq!(second.refills, Some(2));
    assert_eq!(second.days_supply, None);

    Ok(())
}

#[test]
fn test_rows_with_missing_keys_are_rejected_and_counted() -> Result<(), Box<dyn Error>> {
    let batch = record_batch!(
        ("drug_exposure_id", Int64, [Some(1), Some(2), Some(3)]),
        ("person_id", Int64, [Some(10), None, Some(30)]),
        ("drug_concept_id", Int64, [Some(100), Some(100), Some(100)]),
        (
            "drug_exposure_start_date",
            Utf8,
            [Some("2024-01-01"), Some("2024-01-02"), None]
        )
    )?;

    let outcome = records_from_batches(&[batch])?;
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.rejected, 2);
    assert_eq!(outcome.records[0].person_id, 10);
    assert_eq!(outcome.records[0].start_date, date(2024, 1, 1));

    Ok(())
}

#[test]
fn test_missing_optional_columns_become_none() -> Result<(), Box<dyn Error>> {
    // An export carrying only the required columns still converts
    let batch = record_batch!(
        ("drug_exposure_id", Int64, [1]),
        ("person_id", Int64, [7]),
        ("drug_concept_id", Int64, [100]),
        ("drug_exposure_start_date", Utf8, ["2024-06-01"])
    )?;

    let outcome = records_from_batches(&[batch])?;
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.rejected, 0);

    let record = &outcome.records[0];
    assert_eq!(record.start_date, date(2024, 6, 1));
    assert_eq!(record.end_date, None);
    assert_eq!(record.days_supply, None);
    assert_eq!(record.refills, None);
    assert_eq!(record.quantity, None);
    assert_eq!(record.drug_type_concept_id, None);

    Ok(())
}

#[test]
fn test_required_columns_are_checked() -> Result<(), Box<dyn Error>> {
    let batch = record_batch!(
        ("drug_exposure_id", Int64, [1]),
        ("drug_concept_id", Int64, [100]),
        ("drug_exposure_start_date", Utf8, ["2024-06-01"])
    )?;

    let result = records_from_batches(&[batch]);
    assert!(matches!(result, Err(AdherenceError::ColumnNotFound(_))));

    Ok(())
}

#[test]
fn test_concept_lookup_keeps_only_named_drug_concepts() -> Result<(), Box<dyn Error>> {
    let batch = record_batch!(
        ("concept_id", Int64, [100, 200, 300]),
        (
            "concept_name",
            Utf8,
            [Some("Metformin 500mg"), Some("Hypertension"), None]
        ),
        ("domain_id", Utf8, ["Drug", "Condition", "Drug"]),
        (
            "concept_class_id",
            Utf8,
            [Some("Clinical Drug"), Some("Condition"), None]
        )
    )?;

    let lookup = ConceptLookup::from_batches(&[batch])?;

    // 200 is outside the Drug domain, 300 has no name
    assert_eq!(lookup.len(), 1);
    assert_eq!(lookup.display_name(100), "Metformin 500mg");
    assert_eq!(lookup.concept_class(100), Some("Clinical Drug"));
    assert_eq!(lookup.display_name(200), UNKNOWN_DRUG);
    assert_eq!(lookup.resolve_name(300), None);

    Ok(())
}

#[test]
fn test_concept_lookup_without_domain_column_keeps_all_named() -> Result<(), Box<dyn Error>> {
    // A pre-filtered vocabulary export may not carry domain_id at all
    let batch = record_batch!(
        ("concept_id", Int64, [100, 200]),
        ("concept_name", Utf8, ["Metformin 500mg", "Lisinopril 10mg"])
    )?;

    let lookup = ConceptLookup::from_batches(&[batch])?;
    assert_eq!(lookup.len(), 2);
    assert_eq!(lookup.display_name(200), "Lisinopril 10mg");
    assert_eq!(lookup.concept_class(200), None);

    Ok(())
}

#[test]
fn test_person_lookup_reads_birth_years() -> Result<(), Box<dyn Error>> {
    let batch = record_batch!(
        ("person_id", Int64, [1, 2]),
        ("year_of_birth", Int32, [Some(1970), None])
    )?;

    let lookup = PersonLookup::from_batches(&[batch])?;
    assert_eq!(lookup.len(), 1);
    assert_eq!(lookup.year_of_birth(1), Some(1970));
    assert_eq!(lookup.year_of_birth(2), None);
    assert_eq!(lookup.age_at(1, 2024), Some(54));

    Ok(())
}

#[test]
fn test_int32_key_columns_are_accepted() -> Result<(), Box<dyn Error>> {
    // Some exports store identifiers as 32 bit integers
    let batch = record_batch!(
        ("drug_exposure_id", Int32, [1]),
        ("person_id", Int32, [7]),
        ("drug_concept_id", Int32, [100]),
        ("drug_exposure_start_date", Utf8, ["2024-06-01"])
    )?;

    let outcome = records_from_batches(&[batch])?;
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].person_id, 7);

    Ok(())
}
