//! FILENAME: core/engine/src/number_format.rs
//! PURPOSE: Number formatting utilities for displaying cell values.
//! CONTEXT: Converts raw numeric values to display strings based on a column's
//! NumberFormat. Export keeps the raw number and attaches an equivalent
//! spreadsheet format string, so both sides agree on the underlying value.

use crate::style::{CurrencyPosition, NumberFormat};

/// Format a number according to the specified format.
pub fn format_number(value: f64, format: &NumberFormat) -> String {
    match format {
        NumberFormat::General => format_general(value),
        NumberFormat::Number {
            decimal_places,
            use_thousands_separator,
        } => format_decimal(value, *decimal_places, *use_thousands_separator),
        NumberFormat::Currency {
            decimal_places,
            symbol,
            symbol_position,
        } => format_currency(value, *decimal_places, symbol, *symbol_position),
        NumberFormat::Percentage { decimal_places } => format_percentage(value, *decimal_places),
        NumberFormat::Custom { format: custom_fmt } => format_custom(value, custom_fmt),
    }
}

/// Currency format for an ISO code. Unknown codes print the code itself after the amount.
pub fn currency_format(code: &str, decimal_places: u8) -> NumberFormat {
    let (symbol, symbol_position) = match code.to_ascii_uppercase().as_str() {
        "ILS" | "NIS" => ("₪".to_string(), CurrencyPosition::After),
        "USD" => ("$".to_string(), CurrencyPosition::Before),
        "EUR" => ("€".to_string(), CurrencyPosition::Before),
        "GBP" => ("£".to_string(), CurrencyPosition::Before),
        other => (other.to_string(), CurrencyPosition::After),
    };
    NumberFormat::Currency {
        decimal_places,
        symbol,
        symbol_position,
    }
}

/// Format a number in general format (auto-detect best representation).
fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    // For integers, don't show decimal point
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return add_thousands_separator(&format!("{:.0}", value));
    }

    let formatted = format!("{:.2}", value);
    add_thousands_separator(formatted.trim_end_matches('0').trim_end_matches('.'))
}

/// Format a number with specified decimal places and optional thousands separator.
fn format_decimal(value: f64, decimal_places: u8, use_thousands_separator: bool) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places as usize);

    if use_thousands_separator {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

/// Add thousands separators to a numeric string.
fn add_thousands_separator(s: &str) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (s, None),
    };

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if negative {
        result.insert(0, '-');
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

/// Format a number as currency. Negative amounts keep a leading minus sign.
fn format_currency(
    value: f64,
    decimal_places: u8,
    symbol: &str,
    position: CurrencyPosition,
) -> String {
    let formatted = add_thousands_separator(&format!(
        "{:.prec$}",
        value.abs(),
        prec = decimal_places as usize
    ));

    let with_symbol = match position {
        CurrencyPosition::Before => format!("{}{}", symbol, formatted),
        CurrencyPosition::After => format!("{} {}", formatted, symbol),
    };

    if value < 0.0 {
        format!("-{}", with_symbol)
    } else {
        with_symbol
    }
}

/// Format a percent-unit number (15 -> "15%").
fn format_percentage(value: f64, decimal_places: u8) -> String {
    format!("{:.prec$}%", value, prec = decimal_places as usize)
}

/// Format a number using a custom format string.
/// Supports basic patterns like "0.00", "#,##0", etc.
fn format_custom(value: f64, format: &str) -> String {
    let decimal_places = if let Some(dot_pos) = format.find('.') {
        format[dot_pos + 1..]
            .chars()
            .take_while(|c| *c == '0' || *c == '#')
            .count() as u8
    } else {
        0
    };

    let use_thousands = format.contains(',');

    format_decimal(value, decimal_places, use_thousands)
}

/// Spreadsheet number format string for a NumberFormat.
/// Percentages are expressed for fractional values, so callers divide by 100 first.
pub fn spreadsheet_format(format: &NumberFormat) -> String {
    let decimals = |places: u8| {
        if places > 0 {
            format!(".{}", "0".repeat(places as usize))
        } else {
            String::new()
        }
    };

    match format {
        NumberFormat::General => "General".to_string(),
        NumberFormat::Number {
            decimal_places,
            use_thousands_separator,
        } => {
            if *use_thousands_separator {
                format!("#,##0{}", decimals(*decimal_places))
            } else {
                format!("0{}", decimals(*decimal_places))
            }
        }
        NumberFormat::Currency {
            decimal_places,
            symbol,
            symbol_position,
        } => match symbol_position {
            CurrencyPosition::Before => format!("\"{}\"#,##0{}", symbol, decimals(*decimal_places)),
            CurrencyPosition::After => format!("#,##0{} \"{}\"", decimals(*decimal_places), symbol),
        },
        NumberFormat::Percentage { decimal_places } => format!("0{}%", decimals(*decimal_places)),
        NumberFormat::Custom { format } => format.clone(),
    }
}

/// Predefined number formats for common use cases.
pub mod presets {
    use super::*;

    pub fn number(decimal_places: u8) -> NumberFormat {
        NumberFormat::Number {
            decimal_places,
            use_thousands_separator: true,
        }
    }

    pub fn percentage(decimal_places: u8) -> NumberFormat {
        NumberFormat::Percentage { decimal_places }
    }

    pub fn shekel() -> NumberFormat {
        currency_format("ILS", 2)
    }
}
