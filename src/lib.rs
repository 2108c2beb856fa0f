//! Medication adherence analysis over OMOP CDM pharmacy dispensing data.
//!
//! Computes the proportion of days covered (PDC) per patient and drug,
//! classifies adherence against a configurable threshold, reports gaps
//! between fills, and aggregates summary statistics, all from Parquet
//! exports of the `drug_exposure`, `concept` and `person` tables.

pub mod algorithm;
pub mod analysis;
pub mod cdm;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use analysis::{AdherenceAnalyzer, AnalysisResults, AnalysisWindow};
pub use config::{AnalysisConfig, PRESCRIPTION_DRUG_TYPES};
pub use error::{AdherenceError, Result};

// Domain models
pub use models::{
    AdherenceStatus, CoverageInterval, DispensingRecord, FillGap, GapSeverity, ImputationMethod,
    MergedPeriod, PatientDrugAdherence, PeriodGap, SummaryCategory, SummaryRow,
};

// CDM lookups
pub use cdm::{ConceptLookup, PersonLookup};

// Arrow types
pub use arrow::record_batch::RecordBatch;
