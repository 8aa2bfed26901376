//! FILENAME: core/table-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown row: {0}")]
    UnknownRow(String),

    #[error("Sorting is disabled for column {0}")]
    SortingDisabled(String),

    #[error("Filtering is disabled for column {0}")]
    FilteringDisabled(String),

    #[error("Hiding is disabled for column {0}")]
    HidingDisabled(String),

    #[error("Grouping is disabled for column {0}")]
    GroupingDisabled(String),

    #[error("Invalid page size {0} (allowed: 10, 20, 30, 40, 50)")]
    InvalidPageSize(usize),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid saved state: {0}")]
    State(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}
