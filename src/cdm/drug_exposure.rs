//! Loading and conversion of the `drug_exposure` table.
//!
//! Rows are converted one at a time into [`DispensingRecord`]s. A row
//! missing any identifier or its start date is dropped and counted, as is
//! a row whose declared end date precedes its start date. Conversion
//! therefore guarantees that every surviving record with a declared end
//! date has `end_date >= start_date`.

use std::path::Path;

use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;

use crate::cdm::schemas::drug_exposure_schema;
use crate::error::Result;
use crate::models::DispensingRecord;
use crate::utils::arrow_utils::{
    arrow_array_to_date, arrow_array_to_f64, arrow_array_to_i32, arrow_array_to_i64,
    get_date_column, get_integer_column, optional_column,
};
use crate::utils::io::load_parquet_directory;

/// Converted dispensing records plus the number of rows dropped on the way
#[derive(Debug, Default)]
pub struct ConversionOutcome {
    /// Usable dispensing records
    pub records: Vec<DispensingRecord>,
    /// Rows dropped for missing identifiers, missing start dates or
    /// inverted date ranges
    pub rejected: usize,
}

/// Column handles resolved once per batch
struct DrugExposureColumns {
    person_id: ArrayRef,
    drug_concept_id: ArrayRef,
    drug_exposure_id: ArrayRef,
    start_date: ArrayRef,
    end_date: Option<ArrayRef>,
    days_supply: Option<ArrayRef>,
    refills: Option<ArrayRef>,
    quantity: Option<ArrayRef>,
    drug_type_concept_id: Option<ArrayRef>,
}

impl DrugExposureColumns {
    fn resolve(batch: &RecordBatch) -> Result<Self> {
        Ok(Self {
            person_id: get_integer_column(batch, "person_id")?,
            drug_concept_id: get_integer_column(batch, "drug_concept_id")?,
            drug_exposure_id: get_integer_column(batch, "drug_exposure_id")?,
            start_date: get_date_column(batch, "drug_exposure_start_date")?,
            end_date: optional_column(batch, "drug_exposure_end_date"),
            days_supply: optional_column(batch, "days_supply"),
            refills: optional_column(batch, "refills"),
            quantity: optional_column(batch, "quantity"),
            drug_type_concept_id: optional_column(batch, "drug_type_concept_id"),
        })
    }
}

/// Convert a single row, or `None` when the row is unusable
fn record_from_row(columns: &DrugExposureColumns, row: usize) -> Option<DispensingRecord> {
    let person_id = arrow_array_to_i64(&columns.person_id, row)?;
    let drug_concept_id = arrow_array_to_i64(&columns.drug_concept_id, row)?;
    let drug_exposure_id = arrow_array_to_i64(&columns.drug_exposure_id, row)?;
    let start_date = arrow_array_to_date(&columns.start_date, row)?;

    let end_date = columns
        .end_date
        .as_ref()
        .and_then(|c| arrow_array_to_date(c, row));
    if let Some(end) = end_date {
        if end < start_date {
            return None;
        }
    }

    let mut record =
        DispensingRecord::new(person_id, drug_concept_id, drug_exposure_id, start_date);
    record.end_date = end_date;
    record.days_supply = columns
        .days_supply
        .as_ref()
        .and_then(|c| arrow_array_to_i32(c, row));
    record.refills = columns
        .refills
        .as_ref()
        .and_then(|c| arrow_array_to_i32(c, row));
    record.quantity = columns
        .quantity
        .as_ref()
        .and_then(|c| arrow_array_to_f64(c, row));
    record.drug_type_concept_id = columns
        .drug_type_concept_id
        .as_ref()
        .and_then(|c| arrow_array_to_i64(c, row));

    Some(record)
}

/// Convert drug exposure record batches into dispensing records
///
/// # Errors
/// Returns an error if a required column is missing or has an unusable type
pub fn records_from_batches(batches: &[RecordBatch]) -> Result<ConversionOutcome> {
    let mut outcome = ConversionOutcome::default();

    for batch in batches {
        let columns = DrugExposureColumns::resolve(batch)?;
        for row in 0..batch.num_rows() {
            match record_from_row(&columns, row) {
                Some(record) => outcome.records.push(record),
                None => outcome.rejected += 1,
            }
        }
    }

    if outcome.rejected > 0 {
        log::warn!(
            "Rejected {} drug exposure rows with missing identifiers, missing start dates or inverted date ranges",
            outcome.rejected
        );
    }

    Ok(outcome)
}

/// Load all drug exposure Parquet files from a directory
///
/// # Errors
/// Returns an error if the directory cannot be read or conversion fails
pub fn load_drug_exposures(dir: &Path) -> Result<ConversionOutcome> {
    let batches = load_parquet_directory(dir, Some(&drug_exposure_schema()))?;
    records_from_batches(&batches)
}
