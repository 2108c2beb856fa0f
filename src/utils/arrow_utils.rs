//! Arrow utility functions for column access and value extraction
//!
//! The CDM tables arrive as Arrow record batches. These helpers pull
//! individual values out of the arrays while handling nulls and the type
//! variations that show up in real exports (dates as strings, counts as
//! floats).

use arrow::array::{
    Array, ArrayRef, Date32Array, Date64Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::{AdherenceError, Result};

/// Extract a string value from an Arrow array at the specified index, handling nulls
#[must_use]
pub fn arrow_array_to_string(array: &ArrayRef, index: usize) -> Option<String> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Utf8 => {
            let string_array = array.as_any().downcast_ref::<StringArray>()?;
            Some(string_array.value(index).to_string())
        }
        _ => None,
    }
}

/// Extract a date value from an Arrow array at the specified index, handling nulls
///
/// Accepts `Date32`, `Date64` and a handful of common string formats.
#[must_use]
pub fn arrow_array_to_date(array: &ArrayRef, index: usize) -> Option<NaiveDate> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Date32 => {
            let date_array = array.as_any().downcast_ref::<Date32Array>()?;
            date_array.value_as_date(index)
        }
        DataType::Date64 => {
            let date_array = array.as_any().downcast_ref::<Date64Array>()?;
            date_array.value_as_date(index)
        }
        DataType::Utf8 => {
            let string_array = array.as_any().downcast_ref::<StringArray>()?;
            let date_str = string_array.value(index);

            for format in &["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"] {
                if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
                    return Some(date);
                }
            }

            None
        }
        _ => None,
    }
}

/// Extract an i32 value from an Arrow array at the specified index, handling nulls
///
/// Values outside the i32 range are treated as absent rather than
/// wrapped, so an implausible days-supply cannot corrupt the analysis.
#[must_use]
pub fn arrow_array_to_i32(array: &ArrayRef, index: usize) -> Option<i32> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Int32 => {
            let int_array = array.as_any().downcast_ref::<Int32Array>()?;
            Some(int_array.value(index))
        }
        DataType::Int64 => {
            let int_array = array.as_any().downcast_ref::<Int64Array>()?;
            i32::try_from(int_array.value(index)).ok()
        }
        DataType::Float64 => {
            let float_array = array.as_any().downcast_ref::<Float64Array>()?;
            let value = float_array.value(index);
            if value.is_finite() && value.fract() == 0.0 {
                i32::try_from(value as i64).ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Extract an i64 value from an Arrow array at the specified index, handling nulls
#[must_use]
pub fn arrow_array_to_i64(array: &ArrayRef, index: usize) -> Option<i64> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Int32 => {
            let int_array = array.as_any().downcast_ref::<Int32Array>()?;
            Some(i64::from(int_array.value(index)))
        }
        DataType::Int64 => {
            let int_array = array.as_any().downcast_ref::<Int64Array>()?;
            Some(int_array.value(index))
        }
        _ => None,
    }
}

/// Extract a float64 value from an Arrow array at the specified index, handling nulls
#[must_use]
pub fn arrow_array_to_f64(array: &ArrayRef, index: usize) -> Option<f64> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Int32 => {
            let int_array = array.as_any().downcast_ref::<Int32Array>()?;
            Some(f64::from(int_array.value(index)))
        }
        DataType::Int64 => {
            let int_array = array.as_any().downcast_ref::<Int64Array>()?;
            Some(int_array.value(index) as f64)
        }
        DataType::Float32 => {
            let float_array = array.as_any().downcast_ref::<Float32Array>()?;
            Some(f64::from(float_array.value(index)))
        }
        DataType::Float64 => {
            let float_array = array.as_any().downcast_ref::<Float64Array>()?;
            Some(float_array.value(index))
        }
        _ => None,
    }
}

/// Get the column index by name from a record batch
///
/// # Errors
/// Returns an error if the column does not exist
pub fn get_column_index(batch: &RecordBatch, column_name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(column_name)
        .map_err(|_| AdherenceError::ColumnNotFound(column_name.to_string()))
}

/// Get a column from a record batch by name
///
/// # Errors
/// Returns an error if the column does not exist
pub fn get_column(batch: &RecordBatch, column_name: &str) -> Result<ArrayRef> {
    let idx = get_column_index(batch, column_name)?;
    Ok(batch.column(idx).clone())
}

/// Get a column by name if it exists in the batch
#[must_use]
pub fn optional_column(batch: &RecordBatch, column_name: &str) -> Option<ArrayRef> {
    batch
        .schema()
        .index_of(column_name)
        .ok()
        .map(|idx| batch.column(idx).clone())
}

/// Get a required integer column, accepting either 32 or 64 bit storage
///
/// # Errors
/// Returns an error if the column does not exist or holds a non-integer type
pub fn get_integer_column(batch: &RecordBatch, column_name: &str) -> Result<ArrayRef> {
    let column = get_column(batch, column_name)?;
    match column.data_type() {
        DataType::Int32 | DataType::Int64 => Ok(column),
        _ => Err(AdherenceError::InvalidDataType {
            column: column_name.to_string(),
            expected: "Int32 or Int64".to_string(),
        }),
    }
}

/// Get a required date column, accepting date or string storage
///
/// # Errors
/// Returns an error if the column does not exist or holds an unusable type
pub fn get_date_column(batch: &RecordBatch, column_name: &str) -> Result<ArrayRef> {
    let column = get_column(batch, column_name)?;
    match column.data_type() {
        DataType::Date32 | DataType::Date64 | DataType::Utf8 => Ok(column),
        _ => Err(AdherenceError::InvalidDataType {
            column: column_name.to_string(),
            expected: "Date32, Date64 or Utf8".to_string(),
        }),
    }
}
