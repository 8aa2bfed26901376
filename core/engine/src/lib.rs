//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the shared table value engine.
//! CONTEXT: Re-exports public types and modules for use by the lookup,
//! table-engine and persistence crates.

pub mod cell;
pub mod date_format;
pub mod labels;
pub mod logging;
pub mod number_format;
pub mod path;
pub mod style;

// Re-export commonly used types at the crate root
pub use cell::CellValue;
pub use date_format::{
    format_date, format_datetime, parse_date_value, GregorianFallback, HebrewDateFormatter,
};
pub use labels::{Labels, Localization};
pub use number_format::{currency_format, format_number, spreadsheet_format};
pub use path::AccessorPath;
pub use style::{
    BorderLineStyle, CellStyle, Color, CurrencyPosition, FontStyle, NumberFormat,
    ReadingDirection, StyleRegistry, TextAlign, VerticalAlign,
};
