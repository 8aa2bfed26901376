//! FILENAME: core/persistence/src/lib.rs
//! Table export.
//!
//! Writes what the table currently shows (filtered rows across all pages,
//! visible data columns) to a right-to-left `.xlsx` workbook.

mod error;
mod export_cache;
mod xlsx_writer;

pub use error::ExportError;
pub use export_cache::ExportCache;
pub use xlsx_writer::export_to_xlsx;

use engine::log_debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// OPTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// File name without the `.xlsx` extension
    pub file_name: String,
    pub sheet_name: String,
    /// Characters added to each measured column width
    pub width_padding: usize,
    /// Leading rows measured for column widths
    pub sample_rows: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            file_name: "export".to_string(),
            sheet_name: "Sheet1".to_string(),
            width_padding: 2,
            sample_rows: 10,
        }
    }
}

impl ExportOptions {
    pub fn named(file_name: impl Into<String>) -> Self {
        ExportOptions { file_name: file_name.into(), ..Default::default() }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// A finished workbook held in memory.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Write the workbook into `dir`, creating it if needed. Returns the full path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        log_debug!("EXPORT", "saved {} bytes to {:?}", self.bytes.len(), path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ExportOptions = serde_json::from_str(r#"{ "fileName": "תרומות" }"#).unwrap();
        assert_eq!(options.file_name, "תרומות");
        assert_eq!(options.sheet_name, "Sheet1");
        assert_eq!(options.sample_rows, 10);
    }

    #[test]
    fn test_save_writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = ExportedFile { file_name: "donations.xlsx".into(), bytes: vec![1, 2, 3] };

        let path = file.save(&dir.path().join("out")).unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("donations.xlsx"));
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
