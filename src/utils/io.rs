//! Parquet IO for CDM table directories.
//!
//! Each CDM table is stored as a directory of Parquet files. Files are
//! discovered, read with a column projection matching the table schema,
//! and concatenated into a single batch list in deterministic path order.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use rayon::prelude::*;

use crate::error::{AdherenceError, Result};
use crate::utils::progress::{create_main_progress_bar, finish_progress_bar};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Batch size override from the environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Validates that a directory exists and is a directory
///
/// # Errors
/// Returns an error if the path does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.exists() || !dir.is_dir() {
        return Err(AdherenceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    Ok(())
}

/// Build a projection mask selecting the schema's columns from a Parquet file.
///
/// Fields missing from the file are skipped with a warning. When nothing
/// matches, no projection is applied and all columns are read.
#[must_use]
pub fn create_projection(
    schema: &Schema,
    file_schema: &Schema,
    parquet_schema: &parquet::schema::types::SchemaDescriptor,
) -> (bool, Option<ProjectionMask>) {
    let projection: Vec<usize> = schema
        .fields()
        .iter()
        .filter_map(|f| {
            let field_name = f.name();
            match file_schema.index_of(field_name) {
                Ok(idx) => Some(idx),
                Err(_) => {
                    log::warn!("Field {field_name} not found in parquet file, skipping");
                    None
                }
            }
        })
        .collect_vec();

    if projection.is_empty() {
        log::warn!("No matching fields found in schema projection, reading all columns");
        (false, None)
    } else {
        let projection_mask = ProjectionMask::leaves(parquet_schema, projection);
        (true, Some(projection_mask))
    }
}

/// Read a parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `schema` - Optional Arrow schema for projecting specific columns
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub fn read_parquet(path: &Path, schema: Option<&Schema>) -> Result<Vec<RecordBatch>> {
    let start = std::time::Instant::now();

    let file = File::open(path).map_err(|e| {
        AdherenceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Failed to open file {}: {}", path.display(), e),
        ))
    })?;

    let batch_size = get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE);
    let reader_builder =
        ParquetRecordBatchReaderBuilder::try_new(file)?.with_batch_size(batch_size);

    let reader = if let Some(schema) = schema {
        let file_schema = reader_builder.schema();
        let (has_projection, projection_mask) =
            create_projection(schema, file_schema, reader_builder.parquet_schema());

        match (has_projection, projection_mask) {
            (true, Some(mask)) => reader_builder.with_projection(mask).build()?,
            _ => reader_builder.build()?,
        }
    } else {
        reader_builder.build()?
    };

    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

    log::debug!(
        "Read {} batches from {} in {:?}",
        batches.len(),
        path.display(),
        start.elapsed()
    );
    Ok(batches)
}

/// Find all Parquet files in a directory
///
/// Results are sorted by path so repeated runs load files in the same
/// order.
///
/// # Errors
/// Returns an error if directory reading fails
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    validate_directory(dir)?;

    let parquet_files = std::fs::read_dir(dir)
        .map_err(|e| {
            AdherenceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("Failed to read directory {}: {}", dir.display(), e),
            ))
        })?
        .par_bridge()
        .filter_map(|entry_result| match entry_result {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "parquet") {
                    Some(Ok(path))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(AdherenceError::Io(std::io::Error::other(format!(
                "Failed to read directory entry: {e}"
            ))))),
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sorted()
        .collect_vec();

    if parquet_files.is_empty() {
        log::warn!("No Parquet files found in directory: {}", dir.display());
    }

    Ok(parquet_files)
}

/// Load all parquet files from a directory in parallel
///
/// # Arguments
/// * `dir` - Path to the directory containing Parquet files
/// * `schema` - Optional Arrow schema for projecting specific columns
///
/// # Errors
/// Returns an error if directory reading fails or any file cannot be read
pub fn load_parquet_directory(dir: &Path, schema: Option<&Schema>) -> Result<Vec<RecordBatch>> {
    let parquet_files = find_parquet_files(dir)?;
    if parquet_files.is_empty() {
        return Ok(Vec::new());
    }

    let progress = create_main_progress_bar(
        parquet_files.len() as u64,
        Some(&format!("Loading {}", dir.display())),
    );

    let all_batches: Vec<Result<Vec<RecordBatch>>> = parquet_files
        .par_iter()
        .map(|path| {
            let result = read_parquet(path, schema);
            progress.inc(1);
            result
        })
        .collect();

    finish_progress_bar(&progress, None);

    let mut combined_batches = Vec::new();
    for result in all_batches {
        combined_batches.extend(result?);
    }

    log::info!(
        "Loaded {} batches from {} Parquet files in {}",
        combined_batches.len(),
        parquet_files.len(),
        dir.display()
    );

    Ok(combined_batches)
}
