//! Result export.
//!
//! Results are written as three headed CSV files next to each other in
//! the output directory. The adherence rows can also be converted to an
//! Arrow record batch for in-process consumers.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::analysis::AnalysisResults;
use crate::error::Result;
use crate::models::PatientDrugAdherence;

/// File name of the per patient-drug adherence export
pub const PDC_RESULTS_FILE: &str = "pdc_results.csv";

/// File name of the detailed gap report export
pub const GAP_DETAILS_FILE: &str = "gap_details.csv";

/// File name of the summary statistics export
pub const SUMMARY_FILE: &str = "summary_statistics.csv";

/// Write rows of a serializable type as a headed CSV file.
///
/// With zero rows the file is created empty; the header row is derived
/// from the first record.
fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write all result tables to the output directory
///
/// # Errors
/// Returns an error if the directory cannot be created or a file fails
/// to write
pub fn write_results(results: &AnalysisResults, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create output directory {}: {e}", output_dir.display())
    })?;

    write_csv(&output_dir.join(PDC_RESULTS_FILE), &results.adherence)?;
    write_csv(&output_dir.join(GAP_DETAILS_FILE), &results.fill_gaps)?;
    write_csv(&output_dir.join(SUMMARY_FILE), &results.summary)?;

    log::info!(
        "Wrote {} adherence rows, {} gap rows and {} summary rows to {}",
        results.adherence.len(),
        results.fill_gaps.len(),
        results.summary.len(),
        output_dir.display()
    );

    Ok(())
}

/// Convert adherence rows to an Arrow record batch
///
/// # Errors
/// Returns an error for an empty slice, since no schema can be traced
/// from zero rows
pub fn adherence_record_batch(rows: &[PatientDrugAdherence]) -> Result<RecordBatch> {
    if rows.is_empty() {
        return Err(anyhow::anyhow!("Cannot build a record batch from zero rows").into());
    }

    let fields = Vec::<arrow::datatypes::FieldRef>::from_samples(
        rows,
        TracingOptions::default().allow_null_fields(true),
    )
    .map_err(|e| anyhow::anyhow!("Schema generation error: {e}"))?;

    serde_arrow::to_record_batch(&fields, &rows)
        .map_err(|e| anyhow::anyhow!("Serialization error: {e}").into())
}
