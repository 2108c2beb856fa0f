//! OMOP CDM table access
//!
//! Loaders for the three tables the analysis consumes: `drug_exposure`
//! for the dispensing events, `concept` for drug names and classes, and
//! `person` for ages. Each table lives in its own directory of Parquet
//! files.

pub mod concept;
pub mod drug_exposure;
pub mod person;
pub mod schemas;

pub use concept::{ConceptLookup, DrugConcept, UNKNOWN_DRUG};
pub use drug_exposure::{ConversionOutcome, load_drug_exposures, records_from_batches};
pub use person::PersonLookup;
