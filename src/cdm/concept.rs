//! Drug concept vocabulary lookups.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;

use crate::cdm::schemas::concept_schema;
use crate::error::Result;
use crate::utils::arrow_utils::{
    arrow_array_to_i64, arrow_array_to_string, get_integer_column, optional_column,
};
use crate::utils::io::load_parquet_directory;

/// Name reported for drug concepts without a vocabulary entry
pub const UNKNOWN_DRUG: &str = "Unknown Drug";

/// Name and class of one drug concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugConcept {
    /// Human readable concept name
    pub name: String,
    /// Concept class, when the vocabulary provides one
    pub class: Option<String>,
}

/// Lookup from drug concept id to its vocabulary entry.
///
/// Only concepts in the Drug domain with a non-null name are kept. Ids
/// without an entry resolve to [`UNKNOWN_DRUG`] so results always carry a
/// printable name.
#[derive(Debug, Clone, Default)]
pub struct ConceptLookup {
    concepts: FxHashMap<i64, DrugConcept>,
}

impl ConceptLookup {
    /// Build a lookup from concept table record batches.
    ///
    /// When the batches carry a `domain_id` column, rows outside the
    /// Drug domain are skipped. Rows without a name are always skipped.
    ///
    /// # Errors
    /// Returns an error if the `concept_id` column is missing or mistyped
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        let mut lookup = Self::default();

        for batch in batches {
            let ids = get_integer_column(batch, "concept_id")?;
            let names = optional_column(batch, "concept_name");
            let domains = optional_column(batch, "domain_id");
            let classes = optional_column(batch, "concept_class_id");

            for row in 0..batch.num_rows() {
                let Some(concept_id) = arrow_array_to_i64(&ids, row) else {
                    continue;
                };
                if let Some(domains) = &domains {
                    match arrow_array_to_string(domains, row) {
                        Some(domain) if domain == "Drug" => {}
                        _ => continue,
                    }
                }
                let Some(name) = names.as_ref().and_then(|c| arrow_array_to_string(c, row))
                else {
                    continue;
                };
                let class = classes.as_ref().and_then(|c| arrow_array_to_string(c, row));
                lookup.concepts.insert(concept_id, DrugConcept { name, class });
            }
        }

        Ok(lookup)
    }

    /// Load all concept Parquet files from a directory
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read or conversion fails
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let batches = load_parquet_directory(dir, Some(&concept_schema()))?;
        Self::from_batches(&batches)
    }

    /// Register a concept directly, mainly for tests
    pub fn insert(&mut self, concept_id: i64, name: &str, class: Option<&str>) {
        self.concepts.insert(
            concept_id,
            DrugConcept {
                name: name.to_string(),
                class: class.map(ToString::to_string),
            },
        );
    }

    /// Resolved name of a concept, if known
    #[must_use]
    pub fn resolve_name(&self, concept_id: i64) -> Option<&str> {
        self.concepts.get(&concept_id).map(|c| c.name.as_str())
    }

    /// Name to display for a concept, falling back to [`UNKNOWN_DRUG`]
    #[must_use]
    pub fn display_name(&self, concept_id: i64) -> &str {
        self.resolve_name(concept_id).unwrap_or(UNKNOWN_DRUG)
    }

    /// Concept class of a concept, if known
    #[must_use]
    pub fn concept_class(&self, concept_id: i64) -> Option<&str> {
        self.concepts
            .get(&concept_id)
            .and_then(|c| c.class.as_deref())
    }

    /// Number of known concepts
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Whether the lookup is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}
