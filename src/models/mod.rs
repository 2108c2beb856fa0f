//! Domain models for the medication adherence pipeline
//!
//! These types follow the data through its transformations: raw dispensing
//! records from the CDM, per-fill coverage intervals, merged treatment
//! periods, and the per-patient adherence results reported at the end.

pub mod adherence;
pub mod coverage;
pub mod dispensing;
pub mod gap;
pub mod period;
pub mod profile;
pub mod summary;

// Re-export commonly used types
pub use adherence::{AdherenceStatus, PatientDrugAdherence};
pub use coverage::{CoverageInterval, ImputationMethod};
pub use dispensing::DispensingRecord;
pub use gap::{FillGap, GapSeverity};
pub use period::{MergedPeriod, PeriodGap};
pub use profile::DatasetProfile;
pub use summary::{SummaryCategory, SummaryRow};
