//! The seam between the conversion core and table-document renderers
//! (PDF, Word).
//!
//! The crate prepares everything structural: the header row, the cell
//! grid (flattened from a hierarchy when needed), truncation, row numbers
//! and column-width hints. Byte-level page or OOXML assembly is the
//! renderer's concern, behind [`TableRenderer`].

use crate::core::document::Document;
use crate::core::flatten::{flatten_records, FlattenOptions};
use crate::core::schema::{infer_schema, SchemaOptions};
use crate::core::table::Table;
use crate::error::ConversionError;

/// Options for preparing and rendering a table document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    /// Prepend a 1-based `Row #` column.
    pub include_row_numbers: bool,
    /// A caller-supplied generation stamp, shown under the title when set.
    pub timestamp: Option<String>,
    pub font_size: f32,
    pub font_family: String,
    pub borders: bool,
    pub alternate_row_shading: bool,
    pub landscape: bool,
    /// Cells longer than this are truncated with a trailing ellipsis.
    pub max_cell_len: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Data Export".to_string(),
            include_row_numbers: false,
            timestamp: None,
            font_size: 10.0,
            font_family: "Helvetica".to_string(),
            borders: true,
            alternate_row_shading: false,
            landscape: false,
            max_cell_len: 200,
        }
    }
}

/// The fully prepared input a renderer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct TableExport {
    pub title: String,
    pub timestamp: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Relative column widths derived from the content, one per header.
    pub column_widths: Vec<f32>,
}

/// Renders a prepared table into document bytes (PDF, Word, ...).
///
/// Implementations own all visual concerns; the export they receive is
/// already truncated, numbered and width-hinted.
pub trait TableRenderer {
    fn render(
        &self,
        export: &TableExport,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, ConversionError>;
}

/// Prepares a table for rendering.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::table::Table;
/// use datamorph_rs::render::{prepare_table, RenderOptions};
///
/// let table = Table::new(
///     vec!["Name".into(), "Age".into()],
///     vec![vec!["John".into(), "30".into()]],
/// ).unwrap();
///
/// let export = prepare_table(&table, &RenderOptions {
///     include_row_numbers: true,
///     ..RenderOptions::default()
/// }).unwrap();
///
/// assert_eq!(export.headers, vec!["Row #", "Name", "Age"]);
/// assert_eq!(export.rows[0][0], "1");
/// ```
pub fn prepare_table(
    table: &Table,
    options: &RenderOptions,
) -> Result<TableExport, ConversionError> {
    let mut headers: Vec<String> = Vec::new();
    if options.include_row_numbers {
        headers.push("Row #".to_string());
    }
    headers.extend(table.headers().iter().cloned());

    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells: Vec<String> = Vec::with_capacity(headers.len());
            if options.include_row_numbers {
                cells.push((i + 1).to_string());
            }
            cells.extend(row.iter().map(|cell| truncate(cell, options.max_cell_len)));
            cells
        })
        .collect();

    let column_widths = column_widths(&headers, &rows, options.include_row_numbers);

    Ok(TableExport {
        title: options.title.clone(),
        timestamp: options.timestamp.clone(),
        headers,
        rows,
        column_widths,
    })
}

/// Prepares a document for rendering by inferring its schema and
/// flattening the records into a table first.
pub fn prepare_document(
    document: &Document,
    options: &RenderOptions,
) -> Result<TableExport, ConversionError> {
    let records = document.records();
    let schema = infer_schema(&records, &SchemaOptions::default())?;
    let table = flatten_records(&records, &schema, &FlattenOptions::default())?;
    prepare_table(&table, options)
}

/// Prepares and renders a table in one call.
pub fn render_table(
    table: &Table,
    options: &RenderOptions,
    renderer: &dyn TableRenderer,
) -> Result<Vec<u8>, ConversionError> {
    renderer.render(&prepare_table(table, options)?, options)
}

/// Prepares and renders a document in one call.
pub fn render_document(
    document: &Document,
    options: &RenderOptions,
    renderer: &dyn TableRenderer,
) -> Result<Vec<u8>, ConversionError> {
    renderer.render(&prepare_document(document, options)?, options)
}

fn truncate(cell: &str, max_len: usize) -> String {
    if cell.chars().count() <= max_len {
        return cell.to_string();
    }
    let mut truncated: String = cell.chars().take(max_len.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Width hints proportional to the longest content per column, clamped so
/// a single verbose column cannot starve the rest. The row-number column
/// is fixed narrow.
fn column_widths(headers: &[String], rows: &[Vec<String>], numbered: bool) -> Vec<f32> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            if numbered && i == 0 {
                return 0.8;
            }
            let longest = rows
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            (longest as f32 / 10.0).clamp(1.0, 4.0)
        })
        .collect()
}
