//! FILENAME: core/lookup/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown lookup: {0}")]
    UnknownLookup(String),

    #[error("Failed to fetch lookup '{key}': {message}")]
    Fetch { key: String, message: String },
}
