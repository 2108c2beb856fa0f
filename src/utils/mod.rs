//! Shared utilities: Arrow column access, Parquet IO, progress reporting
//! and synthetic test data.

pub mod arrow_utils;
pub mod fixtures;
pub mod io;
pub mod progress;

pub use io::{find_parquet_files, load_parquet_directory, read_parquet, validate_directory};
