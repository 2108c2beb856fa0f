//! Arrow schemas for the consumed CDM tables
//!
//! Only the columns the analysis reads are listed. The schemas drive the
//! Parquet column projection, so everything else in the source tables is
//! skipped at read time.

use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;

/// Get the Arrow schema for the `drug_exposure` table
///
/// One row per dispensing, administration or other drug exposure event.
#[must_use]
pub fn drug_exposure_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("drug_exposure_id", DataType::Int64, false),
        Field::new("person_id", DataType::Int64, false),
        Field::new("drug_concept_id", DataType::Int64, false),
        Field::new("drug_exposure_start_date", DataType::Date32, false),
        Field::new("drug_exposure_end_date", DataType::Date32, true),
        Field::new("drug_type_concept_id", DataType::Int64, true),
        Field::new("refills", DataType::Int32, true),
        Field::new("quantity", DataType::Float64, true),
        Field::new("days_supply", DataType::Int32, true),
    ]))
}

/// Get the Arrow schema for the `concept` vocabulary table
///
/// Used to resolve drug concept identifiers to names and classes.
#[must_use]
pub fn concept_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("concept_id", DataType::Int64, false),
        Field::new("concept_name", DataType::Utf8, true),
        Field::new("domain_id", DataType::Utf8, true),
        Field::new("concept_class_id", DataType::Utf8, true),
    ]))
}

/// Get the Arrow schema for the `person` table
///
/// Only the birth year is read, for age reporting.
#[must_use]
pub fn person_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("person_id", DataType::Int64, false),
        Field::new("year_of_birth", DataType::Int32, true),
    ]))
}
