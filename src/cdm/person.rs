//! Birth year lookups from the `person` table.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;

use crate::cdm::schemas::person_schema;
use crate::error::Result;
use crate::utils::arrow_utils::{arrow_array_to_i32, arrow_array_to_i64, get_integer_column, optional_column};
use crate::utils::io::load_parquet_directory;

/// Lookup from person id to birth year, used for age reporting
#[derive(Debug, Clone, Default)]
pub struct PersonLookup {
    birth_years: FxHashMap<i64, i32>,
}

impl PersonLookup {
    /// Build a lookup from person table record batches
    ///
    /// # Errors
    /// Returns an error if the `person_id` column is missing or mistyped
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        let mut lookup = Self::default();

        for batch in batches {
            let ids = get_integer_column(batch, "person_id")?;
            let years = optional_column(batch, "year_of_birth");

            for row in 0..batch.num_rows() {
                let Some(person_id) = arrow_array_to_i64(&ids, row) else {
                    continue;
                };
                let Some(year) = years.as_ref().and_then(|c| arrow_array_to_i32(c, row)) else {
                    continue;
                };
                lookup.birth_years.insert(person_id, year);
            }
        }

        Ok(lookup)
    }

    /// Load all person Parquet files from a directory
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read or conversion fails
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let batches = load_parquet_directory(dir, Some(&person_schema()))?;
        Self::from_batches(&batches)
    }

    /// Register a birth year directly, mainly for tests
    pub fn insert(&mut self, person_id: i64, year_of_birth: i32) {
        self.birth_years.insert(person_id, year_of_birth);
    }

    /// Birth year of a person, if known
    #[must_use]
    pub fn year_of_birth(&self, person_id: i64) -> Option<i32> {
        self.birth_years.get(&person_id).copied()
    }

    /// Age of a person in a given reference year, if the birth year is known
    #[must_use]
    pub fn age_at(&self, person_id: i64, reference_year: i32) -> Option<i32> {
        self.year_of_birth(person_id).map(|y| reference_year - y)
    }

    /// Number of known persons
    #[must_use]
    pub fn len(&self) -> usize {
        self.birth_years.len()
    }

    /// Whether the lookup is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.birth_years.is_empty()
    }
}
