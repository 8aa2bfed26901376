//! FILENAME: core/persistence/src/error.rs

use lookup::LookupError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Nothing to export: no visible data columns")]
    NoColumns,
}
