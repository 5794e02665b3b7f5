use csv::{QuoteStyle, WriterBuilder};

use crate::core::table::Table;
use crate::error::ConversionError;

/// Options for rendering a [`Table`] as CSV text.
#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    pub delimiter: u8,
    /// Quote every field. When off, only fields containing the delimiter,
    /// a quote or a newline are quoted, with embedded quotes doubled.
    pub always_quote: bool,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            always_quote: false,
        }
    }
}

/// Renders a table as CSV text, headers first.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::table::Table;
/// use datamorph_rs::format::csv::writer::write_table;
/// use datamorph_rs::format::csv::CsvWriteOptions;
///
/// let table = Table::new(
///     vec!["Name".into(), "Notes".into()],
///     vec![vec!["John".into(), "says \"hi\", sometimes".into()]],
/// ).unwrap();
///
/// let csv = write_table(&table, &CsvWriteOptions::default()).unwrap();
/// assert_eq!(csv, "Name,Notes\nJohn,\"says \"\"hi\"\", sometimes\"\n");
/// ```
pub fn write_table(table: &Table, options: &CsvWriteOptions) -> Result<String, ConversionError> {
    let quote_style = if options.always_quote {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    };

    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .quote_style(quote_style)
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(table.headers())
        .map_err(|e| ConversionError::Writer(format!("failed to write CSV headers: {e}")))?;
    for row in table.rows() {
        writer
            .write_record(row)
            .map_err(|e| ConversionError::Writer(format!("failed to write CSV row: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConversionError::Writer(format!("failed to flush CSV output: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ConversionError::Writer(format!("CSV output is not valid UTF-8: {e}")))
}
