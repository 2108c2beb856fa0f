//! Raw pharmacy dispensing records as read from the CDM drug exposure table.

use chrono::NaiveDate;

/// A single dispensing event for one person and one drug concept.
///
/// Mirrors the columns of the OMOP `drug_exposure` table that the
/// adherence analysis consumes. Apart from the identifiers and the start
/// date, every field may be absent in source data and is modeled as an
/// `Option`.
#[derive(Debug, Clone, PartialEq)]
pub struct DispensingRecord {
    /// Person receiving the dispensing
    pub person_id: i64,
    /// Drug concept dispensed
    pub drug_concept_id: i64,
    /// Unique identifier of the exposure row
    pub drug_exposure_id: i64,
    /// Date the dispensing started
    pub start_date: NaiveDate,
    /// Declared end date, if recorded
    pub end_date: Option<NaiveDate>,
    /// Days of supply dispensed, if recorded
    pub days_supply: Option<i32>,
    /// Number of refills authorized, if recorded
    pub refills: Option<i32>,
    /// Quantity dispensed, if recorded
    pub quantity: Option<f64>,
    /// Type of the exposure record (prescription, administration, ...)
    pub drug_type_concept_id: Option<i64>,
}

impl DispensingRecord {
    /// Create a record with only the required fields populated
    #[must_use]
    pub fn new(
        person_id: i64,
        drug_concept_id: i64,
        drug_exposure_id: i64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            person_id,
            drug_concept_id,
            drug_exposure_id,
            start_date,
            end_date: None,
            days_supply: None,
            refills: None,
            quantity: None,
            drug_type_concept_id: None,
        }
    }
}
