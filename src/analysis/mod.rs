//! End to end adherence analysis.
//!
//! [`AdherenceAnalyzer`] wires the pipeline together: load the CDM
//! tables, profile and filter the dispensings, extract coverage, compute
//! per-pair adherence, detect fill gaps and aggregate the summary.

use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::algorithm::coverage::extract_coverage;
use crate::algorithm::gap_report::detailed_gaps;
use crate::algorithm::pdc::{AdherenceContext, compute_adherence};
use crate::algorithm::summary::summarize;
use crate::cdm::{self, ConceptLookup, PersonLookup};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::{DatasetProfile, DispensingRecord, FillGap, PatientDrugAdherence, SummaryRow};
use crate::utils::io::validate_directory;

/// Resolved analysis window, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    /// First dispensing start date considered
    pub start: NaiveDate,
    /// Last dispensing start date considered
    pub end: NaiveDate,
}

impl std::fmt::Display for AnalysisWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Everything one analysis run produces
#[derive(Debug)]
pub struct AnalysisResults {
    /// Profile of the loaded dispensing data, before filtering
    pub profile: DatasetProfile,
    /// Window the analysis ran over, when one could be resolved
    pub window: Option<AnalysisWindow>,
    /// Per patient-drug adherence rows, in (person, drug) order
    pub adherence: Vec<PatientDrugAdherence>,
    /// Detailed fill gap report
    pub fill_gaps: Vec<FillGap>,
    /// Aggregate summary table
    pub summary: Vec<SummaryRow>,
    /// Source rows rejected during conversion
    pub rejected_records: usize,
}

/// Orchestrates a full adherence analysis run
pub struct AdherenceAnalyzer {
    config: AnalysisConfig,
}

impl AdherenceAnalyzer {
    /// Create an analyzer with a validated configuration
    ///
    /// # Errors
    /// Returns an error if the configuration fails validation
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this analyzer runs with
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Window from configured bounds, falling back to the observed
    /// dispensing date range
    fn resolve_window(&self, profile: &DatasetProfile) -> Option<AnalysisWindow> {
        let start = self.config.analysis_start.or(profile.first_start_date)?;
        let end = self.config.analysis_end.or(profile.last_start_date)?;
        Some(AnalysisWindow { start, end })
    }

    /// Run the analysis on already-loaded inputs.
    ///
    /// # Errors
    /// Currently infallible for loaded data, kept fallible for parity
    /// with the loading entry point
    pub fn run(
        &self,
        records: Vec<DispensingRecord>,
        concepts: &ConceptLookup,
        persons: &PersonLookup,
    ) -> Result<AnalysisResults> {
        let profile = DatasetProfile::from_records(&records);
        log::info!("{profile}");

        let window = self.resolve_window(&profile);
        let mut records = records;

        if let Some(window) = window {
            log::info!("Analysis window: {window}");
            let before = records.len();
            records.retain(|r| r.start_date >= window.start && r.start_date <= window.end);
            if records.len() < before {
                log::info!(
                    "Window keeps {} of {before} dispensing records",
                    records.len()
                );
            }
        } else {
            log::warn!("No analysis window could be resolved, keeping all records");
        }

        if let Some(types) = &self.config.drug_type_filter {
            let before = records.len();
            records.retain(|r| r.drug_type_concept_id.is_some_and(|t| types.contains(&t)));
            log::info!(
                "Drug type filter keeps {} of {before} dispensing records",
                records.len()
            );
        }

        let intervals = extract_coverage(&records, self.config.use_median_fallback);
        if intervals.len() < records.len() {
            log::warn!(
                "Dropped {} dispensing records with out-of-range dates",
                records.len() - intervals.len()
            );
        }
        log::info!("Extracted {} coverage intervals", intervals.len());

        let reference_year = window.map_or_else(|| chrono::Utc::now().year(), |w| w.end.year());
        let context = AdherenceContext {
            concepts,
            persons,
            reference_year,
        };

        let adherence = compute_adherence(&intervals, &self.config, &context);
        log::info!(
            "Computed adherence for {} patient-drug pairs",
            adherence.len()
        );

        let fill_gaps = detailed_gaps(&intervals, concepts, self.config.min_gap_days);
        log::info!("Found {} reportable fill gaps", fill_gaps.len());

        let summary = summarize(&adherence, self.config.min_patients_per_drug);

        Ok(AnalysisResults {
            profile,
            window,
            adherence,
            fill_gaps,
            summary,
            rejected_records: 0,
        })
    }

    /// Load the CDM tables from a directory and run the analysis.
    ///
    /// Expects `drug_exposure/`, and optionally `concept/` and `person/`,
    /// as subdirectories of Parquet files. Missing optional tables
    /// degrade the output (unresolved names, no ages) without failing.
    ///
    /// # Errors
    /// Returns an error if loading or conversion fails
    pub fn run_from_dir(&self, cdm_dir: &Path) -> Result<AnalysisResults> {
        validate_directory(cdm_dir)?;
        let total_steps = 4;

        // Step 1: dispensing events
        log::info!("[Step 1/{total_steps}] Loading drug exposures");
        let outcome = cdm::load_drug_exposures(&cdm_dir.join("drug_exposure"))?;
        log::info!("Loaded {} dispensing records", outcome.records.len());

        // Step 2: drug vocabulary
        let concept_dir = cdm_dir.join("concept");
        let concepts = if concept_dir.is_dir() {
            log::info!("[Step 2/{total_steps}] Loading drug concepts");
            let lookup = ConceptLookup::load_from_dir(&concept_dir)?;
            log::info!("Loaded {} drug concepts", lookup.len());
            lookup
        } else {
            log::warn!(
                "No concept directory at {}, drug names will be unresolved",
                concept_dir.display()
            );
            ConceptLookup::default()
        };

        // Step 3: birth years
        let person_dir = cdm_dir.join("person");
        let persons = if person_dir.is_dir() {
            log::info!("[Step 3/{total_steps}] Loading person birth years");
            let lookup = PersonLookup::load_from_dir(&person_dir)?;
            log::info!("Loaded {} persons", lookup.len());
            lookup
        } else {
            log::warn!(
                "No person directory at {}, ages will be missing",
                person_dir.display()
            );
            PersonLookup::default()
        };

        // Step 4: the analysis itself
        log::info!("[Step 4/{total_steps}] Computing adherence");
        let mut results = self.run(outcome.records, &concepts, &persons)?;
        results.rejected_records = outcome.rejected;

        log::info!("Adherence analysis complete");
        Ok(results)
    }
}
