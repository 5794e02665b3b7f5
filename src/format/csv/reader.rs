use std::io::Read;

use csv::{ReaderBuilder, Trim};
use log::warn;

use crate::core::table::Table;
use crate::error::ConversionError;

/// Delimiters considered during auto-detection.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// How many leading lines the delimiter detection samples.
const SAMPLE_LINES: usize = 5;

/// A builder for reading CSV input into a [`Table`].
///
/// The reader is tolerant by design: cells are trimmed, short rows are
/// padded and over-long rows truncated at the header boundary, and a row
/// that fails to parse is skipped with a warning instead of aborting the
/// whole read. The first record always supplies the headers.
///
/// When no delimiter is set explicitly, the reader samples the first five
/// lines and picks the candidate (comma, semicolon, tab, pipe) whose
/// per-line occurrence counts are the most consistent.
///
/// # Examples
///
/// ```
/// use datamorph_rs::format::csv::CsvTableReaderBuilder;
///
/// let data = "Name;Age\nJohn;30\nJane;25";
/// let table = CsvTableReaderBuilder::new().from_str(data).unwrap();
///
/// assert_eq!(table.headers(), &["Name".to_string(), "Age".to_string()]);
/// assert_eq!(table.rows()[0], vec!["John".to_string(), "30".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct CsvTableReaderBuilder {
    delimiter: Option<u8>,
}

impl CsvTableReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the delimiter instead of auto-detecting it.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Reads a table from an in-memory string.
    ///
    /// Returns [`ConversionError::InvalidInput`] when the input yields no
    /// headers.
    pub fn from_str(self, data: &str) -> Result<Table, ConversionError> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(data));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .has_headers(true)
            .from_reader(data.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ConversionError::Reader(format!("failed to read CSV headers: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(ConversionError::InvalidInput(
                "no headers found in CSV input".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            match record {
                Ok(record) => {
                    if record.iter().all(str::is_empty) {
                        continue;
                    }
                    rows.push(record.iter().map(str::to_string).collect());
                }
                Err(e) => {
                    // tolerant read: a malformed row never aborts the batch
                    warn!("skipping malformed CSV row {}: {e}", i + 2);
                }
            }
        }

        Table::new(headers, rows)
    }

    /// Reads a table from any byte source, buffering it fully first.
    pub fn from_reader<R: Read>(self, mut reader: R) -> Result<Table, ConversionError> {
        let mut data = String::new();
        reader
            .read_to_string(&mut data)
            .map_err(|e| ConversionError::Reader(format!("failed to read CSV input: {e}")))?;
        self.from_str(&data)
    }
}

/// Picks the delimiter whose per-line occurrence counts are the most
/// consistent over a sample of leading lines. Comma wins all ties.
pub fn detect_delimiter(data: &str) -> u8 {
    let lines: Vec<&str> = data.lines().take(SAMPLE_LINES).collect();

    let mut best = b',';
    let mut best_consistency = 0;
    for candidate in CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == candidate).count())
            .collect();
        if counts.iter().sum::<usize>() == 0 {
            continue;
        }

        // how many lines agree on the most common occurrence count
        let consistency = counts
            .iter()
            .map(|count| counts.iter().filter(|c| c == &count).count())
            .max()
            .unwrap_or(0);
        if consistency > best_consistency {
            best_consistency = consistency;
            best = candidate;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas_are_detected() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
    }

    #[test]
    fn semicolons_beat_commas_when_more_consistent() {
        // one stray comma, semicolons on every line
        assert_eq!(detect_delimiter("a;b;c\n1;2,5;3\n4;5;6"), b';');
    }

    #[test]
    fn tabs_and_pipes_are_candidates() {
        assert_eq!(detect_delimiter("a\tb\n1\t2"), b'\t');
        assert_eq!(detect_delimiter("a|b\n1|2"), b'|');
    }

    #[test]
    fn delimiterless_input_defaults_to_comma() {
        assert_eq!(detect_delimiter("single column\nvalue"), b',');
    }

    #[test]
    fn cells_are_trimmed() {
        let table = CsvTableReaderBuilder::new()
            .from_str("Name , Age\n John , 30 ")
            .unwrap();

        assert_eq!(table.headers(), &["Name".to_string(), "Age".to_string()]);
        assert_eq!(table.rows()[0], vec!["John".to_string(), "30".to_string()]);
    }

    #[test]
    fn short_and_long_rows_are_normalized() {
        let table = CsvTableReaderBuilder::new()
            .from_str("A,B\n1\n1,2,3")
            .unwrap();

        assert_eq!(table.rows()[0], vec!["1".to_string(), String::new()]);
        assert_eq!(table.rows()[1], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_newlines() {
        let table = CsvTableReaderBuilder::new()
            .delimiter(b',')
            .from_str("Name,Notes\nJohn,\"likes cheese, wine\nand bread\"")
            .unwrap();

        assert_eq!(table.rows()[0][1], "likes cheese, wine\nand bread");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = CsvTableReaderBuilder::new()
            .from_str("A,B\n1,2\n\n3,4")
            .unwrap();
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn empty_input_is_invalid() {
        let result = CsvTableReaderBuilder::new().from_str("");
        assert!(matches!(result, Err(ConversionError::InvalidInput(_))));
    }

    #[test]
    fn explicit_delimiter_overrides_detection() {
        let table = CsvTableReaderBuilder::new()
            .delimiter(b'|')
            .from_str("a|b,c\n1|2,3")
            .unwrap();

        assert_eq!(table.headers(), &["a".to_string(), "b,c".to_string()]);
    }
}
