//! FILENAME: core/persistence/src/xlsx_writer.rs
//! PURPOSE: Writes the current table view to an `.xlsx` workbook.
//! CONTEXT: Cells go through the same column-type registry as on-screen
//! rendering, so displayed and exported values agree. Styles are collected
//! in a `StyleRegistry` and converted to `rust_xlsxwriter` formats once.

use crate::export_cache::ExportCache;
use crate::{ExportError, ExportOptions, ExportedFile};
use engine::style::{
    BorderLineStyle, CellStyle, Color, NumberFormat, ReadingDirection, StyleRegistry, TextAlign, VerticalAlign,
};
use engine::{log_debug, log_enter, log_error, log_exit, log_info, spreadsheet_format};
use lookup::{LookupCache, LookupSource};
use rust_xlsxwriter::{Color as XlsxColor, Format, FormatAlign, FormatBorder, Workbook};
use serde_json::Value;
use std::sync::Arc;
use table_engine::{export_cell, ColumnDef, DataTable, ExportValue, KindContext};

const HEADER_BACKGROUND: Color = Color::new(0x1F, 0x29, 0x37);

/// Export the filtered rows (all pages) and visible data columns of `table`.
///
/// Every lookup dataset used by an exported column is resolved through
/// `cache` before any row is written. If one of them fails, no file is
/// produced.
pub async fn export_to_xlsx(
    table: &DataTable,
    cache: &LookupCache,
    options: &ExportOptions,
) -> Result<ExportedFile, ExportError> {
    log_enter!("EXPORT", "export_to_xlsx", "file={}", options.file_name);
    let columns = table.export_columns();
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let keys: Vec<&str> = columns
        .iter()
        .filter(|c| c.column_type().is_some_and(|t| t.is_lookup()))
        .filter_map(|c| c.data.as_ref()?.meta.lookup_key.as_deref())
        .collect();
    let translations = ExportCache::prefetch(cache, keys).await.map_err(|e| {
        log_error!("EXPORT", "lookup prefetch failed: {}", e);
        e
    })?;
    log_debug!("EXPORT", "resolved {} lookup datasets", translations.len());

    let rows = table.filtered_rows();
    let bytes = write_workbook(table, &columns, &rows, &translations, options)?;
    log_info!("EXPORT", "exported {} rows x {} columns", rows.len(), columns.len());
    log_exit!("EXPORT", "export_to_xlsx", "bytes={}", bytes.len());

    Ok(ExportedFile { file_name: format!("{}.xlsx", options.file_name), bytes })
}

// ============================================================================
// STYLES
// ============================================================================

fn header_style() -> CellStyle {
    CellStyle::new()
        .with_bold(true)
        .with_background(HEADER_BACKGROUND)
        .with_text_color(Color::white())
        .with_text_align(TextAlign::Center)
        .with_reading_direction(ReadingDirection::RightToLeft)
        .with_border(BorderLineStyle::Thin)
}

fn body_style(value: &ExportValue) -> CellStyle {
    let style = CellStyle::new()
        .with_wrap_text(true)
        .with_reading_direction(ReadingDirection::RightToLeft)
        .with_border(BorderLineStyle::Thin);

    match value {
        ExportValue::Number { num_format, .. } => style
            .with_text_align(TextAlign::Center)
            .with_number_format(NumberFormat::Custom { format: num_format.clone() }),
        _ => style.with_text_align(TextAlign::Right),
    }
}

fn convert_style_to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if style.font.bold {
        format = format.set_bold();
    }
    format = format.set_font_size(style.font.size);
    if style.font.color != Color::black() {
        format = format.set_font_color(XlsxColor::RGB(style.font.color.to_rgb()));
    }
    if let Some(background) = style.background {
        format = format.set_background_color(XlsxColor::RGB(background.to_rgb()));
    }

    format = format.set_align(match style.text_align {
        TextAlign::Left => FormatAlign::Left,
        TextAlign::Center => FormatAlign::Center,
        TextAlign::Right => FormatAlign::Right,
        TextAlign::General => FormatAlign::General,
    });
    format = format.set_align(match style.vertical_align {
        VerticalAlign::Top => FormatAlign::Top,
        VerticalAlign::Middle => FormatAlign::VerticalCenter,
        VerticalAlign::Bottom => FormatAlign::Bottom,
    });

    format = format.set_reading_direction(match style.reading_direction {
        ReadingDirection::Context => 0,
        ReadingDirection::LeftToRight => 1,
        ReadingDirection::RightToLeft => 2,
    });

    match style.border {
        BorderLineStyle::None => {}
        BorderLineStyle::Thin => format = format.set_border(FormatBorder::Thin),
        BorderLineStyle::Medium => format = format.set_border(FormatBorder::Medium),
        BorderLineStyle::Thick => format = format.set_border(FormatBorder::Thick),
    }

    if style.wrap_text {
        format = format.set_text_wrap();
    }

    if style.number_format != NumberFormat::General {
        format = format.set_num_format(spreadsheet_format(&style.number_format));
    }

    format
}

// ============================================================================
// WORKBOOK
// ============================================================================

fn header_text(column: &ColumnDef) -> String {
    if column.header.title.trim().is_empty() {
        column.id.clone()
    } else {
        column.header.title.clone()
    }
}

/// Width in characters: the longest of the header and the first sample rows, plus padding.
fn column_width(header: &str, values: &[Vec<ExportValue>], col: usize, options: &ExportOptions) -> f64 {
    let longest = values
        .iter()
        .take(options.sample_rows)
        .map(|row| row[col].display_len())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0);
    (longest + options.width_padding) as f64
}

fn write_workbook(
    table: &DataTable,
    columns: &[&ColumnDef],
    rows: &[Arc<Value>],
    lookups: &dyn LookupSource,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let localization = table.localization();

    // Format every cell first; styles are interned as we go
    let mut styles = StyleRegistry::new();
    let header_index = styles.get_or_create(header_style());
    let mut values: Vec<Vec<ExportValue>> = Vec::with_capacity(rows.len());
    let mut style_indices: Vec<Vec<usize>> = Vec::with_capacity(rows.len());

    for row in rows {
        let row: &Value = row;
        let mut row_values = Vec::with_capacity(columns.len());
        let mut row_styles = Vec::with_capacity(columns.len());
        for column in columns {
            let (Some(data), Some(column_type)) = (column.data.as_ref(), column.column_type()) else {
                continue;
            };
            let ctx = KindContext { row, meta: &data.meta, lookups, localization };
            let value = export_cell(column_type, column.value(row), &ctx);
            row_styles.push(styles.get_or_create(body_style(&value)));
            row_values.push(value);
        }
        values.push(row_values);
        style_indices.push(row_styles);
    }

    let formats: Vec<Format> = styles.all_styles().iter().map(convert_style_to_format).collect();

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;
    worksheet.set_right_to_left(true);

    for (col, column) in columns.iter().enumerate() {
        let header = header_text(column);
        worksheet.write_string_with_format(0, col as u16, &header, &formats[header_index])?;
        worksheet.set_column_width(col as u16, column_width(&header, &values, col, options))?;
    }

    for (r, (row_values, row_styles)) in values.iter().zip(&style_indices).enumerate() {
        let excel_row = (r + 1) as u32;
        for (col, (value, &style)) in row_values.iter().zip(row_styles).enumerate() {
            let format = &formats[style];
            match value {
                ExportValue::Empty => {
                    worksheet.write_blank(excel_row, col as u16, format)?;
                }
                ExportValue::Text(text) => {
                    worksheet.write_string_with_format(excel_row, col as u16, text, format)?;
                }
                ExportValue::Number { value, .. } => {
                    worksheet.write_number_with_format(excel_row, col as u16, *value, format)?;
                }
            }
        }
    }

    log_debug!("EXPORT", "{} distinct cell styles", styles.len());
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use lookup::{LookupDefinition, LookupRegistry};
    use serde_json::json;
    use std::io::{Cursor, Read};
    use table_engine::{ColumnConfig, ColumnType, FilterValue, TableOptions};

    #[derive(Debug)]
    struct City {
        id: i64,
        name: &'static str,
    }

    fn cities(fail: bool) -> LookupCache {
        LookupCache::new(LookupRegistry::new().with(LookupDefinition::new(
            "cities",
            move || async move {
                if fail {
                    Err("network down".to_string())
                } else {
                    Ok(vec![City { id: 1, name: "ירושלים" }, City { id: 2, name: "חיפה" }])
                }
            },
            |c: &City| c.id.into(),
            |c: &City| c.name.to_string(),
        )))
    }

    fn donations() -> DataTable {
        DataTable::new(
            vec![
                ColumnConfig::new("name", ColumnType::Text, "שם"),
                ColumnConfig::new("amount", ColumnType::Currency, "סכום"),
            ],
            TableOptions::default(),
        )
        .with_rows(vec![
            json!({ "name": "כהן", "amount": 180 }),
            json!({ "name": "לוי", "amount": 36.5 }),
            json!({ "name": "מזרחי", "amount": 5 }),
        ])
    }

    fn read_sheet(bytes: &[u8], name: &str) -> Vec<Vec<Data>> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
        let range = workbook.worksheet_range(name).unwrap();
        range.rows().map(|r| r.to_vec()).collect()
    }

    fn sheet_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[tokio::test]
    async fn test_export_filtered_rows_with_numeric_amounts() {
        let mut table = donations();
        table.set_column_filter("amount", Some(FilterValue::range("10", ""))).unwrap();

        let file = export_to_xlsx(&table, &cities(false), &ExportOptions::default()).await.unwrap();
        assert_eq!(file.file_name, "export.xlsx");

        let rows = read_sheet(&file.bytes, "Sheet1");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![Data::String("שם".into()), Data::String("סכום".into())]);
        assert_eq!(rows[1], vec![Data::String("כהן".into()), Data::Float(180.0)]);
        assert_eq!(rows[2][1], Data::Float(36.5));

        let xml = sheet_xml(&file.bytes);
        assert!(xml.contains("rightToLeft=\"1\""));
    }

    #[tokio::test]
    async fn test_export_translates_lookups_and_skips_hidden_columns() {
        let mut table = DataTable::new(
            vec![
                ColumnConfig::new("name", ColumnType::Text, ""),
                ColumnConfig::new("cityId", ColumnType::Lookup, "עיר").with_lookup("cities"),
                ColumnConfig::new("paid", ColumnType::Boolean, "שולם"),
                ColumnConfig::new("share", ColumnType::Percent, "אחוז"),
            ],
            TableOptions::default(),
        )
        .with_rows(vec![json!({ "name": "כהן", "cityId": 2, "paid": true, "share": 15 })]);
        table.set_column_visibility("paid", false).unwrap();

        let file = export_to_xlsx(&table, &cities(false), &ExportOptions::default()).await.unwrap();
        let rows = read_sheet(&file.bytes, "Sheet1");

        assert_eq!(
            rows[0],
            vec![Data::String("name".into()), Data::String("עיר".into()), Data::String("אחוז".into())]
        );
        assert_eq!(rows[1][1], Data::String("חיפה".into()));
        assert_eq!(rows[1][2], Data::Float(0.15));
    }

    #[tokio::test]
    async fn test_lookup_failure_aborts_export() {
        let table = DataTable::new(
            vec![ColumnConfig::new("cityId", ColumnType::Lookup, "עיר").with_lookup("cities")],
            TableOptions::default(),
        )
        .with_rows(vec![json!({ "cityId": 1 })]);

        let err = export_to_xlsx(&table, &cities(true), &ExportOptions::default()).await.unwrap_err();
        assert!(matches!(err, ExportError::Lookup(_)));
    }

    #[tokio::test]
    async fn test_export_without_columns_fails() {
        let table = DataTable::new(Vec::new(), TableOptions::default()).with_rows(vec![json!({})]);
        let err = export_to_xlsx(&table, &cities(false), &ExportOptions::default()).await.unwrap_err();
        assert!(matches!(err, ExportError::NoColumns));
    }

    #[test]
    fn test_column_width_uses_sample_rows() {
        let options = ExportOptions { sample_rows: 1, width_padding: 2, ..Default::default() };
        let values = vec![
            vec![ExportValue::Text("abc".into())],
            vec![ExportValue::Text("abcdefghij".into())],
        ];
        assert_eq!(column_width("שם", &values, 0, &options), 5.0);
        assert_eq!(column_width("כותרת ארוכה", &values, 0, &options), 13.0);
    }

    #[test]
    fn test_header_format_is_dark_and_rtl() {
        let style = header_style();
        assert!(style.font.bold);
        assert_eq!(style.background.map(|c| c.to_rgb()), Some(0x1F2937));
        assert_eq!(style.reading_direction, ReadingDirection::RightToLeft);

        let numeric = body_style(&ExportValue::Number { value: 1.0, num_format: "0.00".into(), text: "1.00".into() });
        assert_eq!(numeric.text_align, TextAlign::Center);
        assert_eq!(body_style(&ExportValue::Text("x".into())).text_align, TextAlign::Right);
    }
}
