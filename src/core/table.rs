use serde::Serialize;

use crate::error::ConversionError;

/// The tabular pivot model: ordered headers plus ordered rows of string
/// cells.
///
/// Every converter either produces a `Table` (CSV reader, flattener) or
/// consumes one read-only (all emitters). Conversions never mutate a table
/// in place; they build new instances.
///
/// Header names are positional: duplicates are legal. The empty string is
/// the canonical "absent" cell value. Rows are normalized at construction
/// time, so every row has exactly `headers.len()` cells.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::table::Table;
///
/// let table = Table::new(
///     vec!["Name".into(), "Age".into()],
///     vec![
///         vec!["John".into(), "30".into()],
///         vec!["Jane".into()], // short row, padded
///     ],
/// ).unwrap();
///
/// assert_eq!(table.rows()[1], vec!["Jane".to_string(), String::new()]);
/// assert_eq!(table.column_index("Age"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table, padding short rows with empty cells and truncating
    /// rows longer than the header set.
    ///
    /// Returns [`ConversionError::InvalidInput`] when `headers` is empty;
    /// no conversion can proceed without at least one column.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, ConversionError> {
        if headers.is_empty() {
            return Err(ConversionError::InvalidInput(
                "a table requires at least one header".to_string(),
            ));
        }

        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.truncate(width);
                row.resize(width, String::new());
                row
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of the first header with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// A copy of this table with rows stably sorted by the named column,
    /// lexicographically.
    ///
    /// Returns [`ConversionError::InvalidInput`] when the column does not
    /// exist.
    pub fn sorted_by(&self, column: &str, descending: bool) -> Result<Self, ConversionError> {
        let index = self.column_index(column).ok_or_else(|| {
            ConversionError::InvalidInput(format!("sort column `{column}` not found in headers"))
        })?;

        let mut rows = self.rows.clone();
        if descending {
            rows.sort_by(|a, b| b[index].cmp(&a[index]));
        } else {
            rows.sort_by(|a, b| a[index].cmp(&b[index]));
        }

        Ok(Self {
            headers: self.headers.clone(),
            rows,
        })
    }

    /// Groups row indices by the distinct values of the named column, in
    /// first-seen order. Returns the column index alongside the groups so
    /// callers can exclude the group column from emitted members.
    ///
    /// Returns [`ConversionError::InvalidInput`] when the column does not
    /// exist.
    pub fn grouped_by(
        &self,
        column: &str,
    ) -> Result<(usize, Vec<(String, Vec<usize>)>), ConversionError> {
        let index = self.column_index(column).ok_or_else(|| {
            ConversionError::InvalidInput(format!("group column `{column}` not found in headers"))
        })?;

        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            let key = row[index].as_str();
            match groups.iter_mut().find(|(k, _)| k == key) {
                Some((_, members)) => members.push(i),
                None => groups.push((key.to_string(), vec![i])),
            }
        }

        Ok((index, groups))
    }
}
