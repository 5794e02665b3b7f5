//! YAML emission for tables and documents.
//!
//! The emitters reuse the JSON value-tree builders, so a table groups,
//! types and nests identically in both formats; only the serializer
//! differs.

use serde_json::Value;

use crate::core::document::Document;
use crate::core::table::Table;
use crate::core::unflatten::{unflatten, UnflattenOptions};
use crate::error::ConversionError;
use crate::format::json::{document_value, table_value, JsonOptions};
use crate::format::naming::NamingConvention;

/// The top-level shape of emitted YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YamlStructure {
    /// A sequence of row mappings.
    #[default]
    Array,
    /// A mapping keyed by the first column, each entry holding the
    /// remaining columns of its row.
    Dictionary,
    /// Dotted headers rebuilt into a nested tree under a single root key.
    Hierarchical,
    /// A mapping keyed by the distinct values of the group column.
    Grouped,
}

/// Options for rendering tables and documents as YAML.
#[derive(Debug, Clone)]
pub struct YamlOptions {
    pub structure: YamlStructure,
    pub naming: NamingConvention,
    /// Spaces per nesting level. The serializer emits two; other values
    /// rescale the emitted indentation.
    pub indent: usize,
    pub convert_values: bool,
    /// Group column for [`YamlStructure::Grouped`].
    pub group_by: Option<String>,
    pub date_format: Option<String>,
}

impl Default for YamlOptions {
    fn default() -> Self {
        Self {
            structure: YamlStructure::Array,
            naming: NamingConvention::Original,
            indent: 2,
            convert_values: true,
            group_by: None,
            date_format: None,
        }
    }
}

impl YamlOptions {
    fn value_options(&self) -> JsonOptions {
        JsonOptions {
            convert_values: self.convert_values,
            naming: self.naming,
            date_format: self.date_format.clone(),
            keep_empty: true,
            ..JsonOptions::default()
        }
    }
}

/// Renders a table as YAML in the configured structure.
///
/// Returns [`ConversionError::InvalidInput`] when
/// [`YamlStructure::Grouped`] is selected without a group column, or the
/// group column is absent from the headers.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::table::Table;
/// use datamorph_rs::format::yaml::{table_to_yaml, YamlOptions};
///
/// let table = Table::new(
///     vec!["Name".into(), "Age".into()],
///     vec![vec!["John".into(), "30".into()]],
/// ).unwrap();
///
/// let yaml = table_to_yaml(&table, &YamlOptions::default()).unwrap();
/// assert_eq!(yaml, "- Name: John\n  Age: 30\n");
/// ```
pub fn table_to_yaml(table: &Table, options: &YamlOptions) -> Result<String, ConversionError> {
    let value_options = options.value_options();

    let value = match options.structure {
        YamlStructure::Array => table_value(table, &value_options)?,
        YamlStructure::Dictionary => dictionary_value(table, &value_options)?,
        YamlStructure::Hierarchical => {
            let document = unflatten(table, &UnflattenOptions::default())?;
            document_value(&document, &value_options)
        }
        YamlStructure::Grouped => {
            let group_by = options.group_by.clone().ok_or_else(|| {
                ConversionError::InvalidInput(
                    "grouped YAML requires a group column".to_string(),
                )
            })?;
            table_value(
                table,
                &JsonOptions {
                    group_by: Some(group_by),
                    ..value_options
                },
            )?
        }
    };

    serialize(&value, options)
}

/// Renders a document as YAML, keyed by the root tag.
pub fn document_to_yaml(
    document: &Document,
    options: &YamlOptions,
) -> Result<String, ConversionError> {
    serialize(&document_value(document, &options.value_options()), options)
}

fn dictionary_value(table: &Table, options: &JsonOptions) -> Result<Value, ConversionError> {
    let rows = table_value(table, options)?;
    let Value::Array(rows) = rows else {
        unreachable!("ungrouped tables serialize to arrays");
    };

    let key_header = options.naming.apply(&table.headers()[0]);
    let mut dictionary = serde_json::Map::new();
    for (i, row) in rows.into_iter().enumerate() {
        let Value::Object(mut fields) = row else {
            unreachable!("rows serialize to objects");
        };
        fields.remove(&key_header);
        dictionary.insert(table.rows()[i][0].clone(), Value::Object(fields));
    }

    Ok(Value::Object(dictionary))
}

fn serialize(value: &Value, options: &YamlOptions) -> Result<String, ConversionError> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| ConversionError::Writer(format!("failed to serialize YAML: {e}")))?;

    if options.indent == 2 {
        return Ok(yaml);
    }
    Ok(rescale_indent(&yaml, options.indent))
}

/// Rescales the serializer's fixed two-space indentation. Lines inside
/// block scalars are rescaled with their surrounding indentation, a
/// documented lossy edge for content whose own lines begin with spaces.
fn rescale_indent(yaml: &str, indent: usize) -> String {
    let mut out = String::with_capacity(yaml.len());
    for line in yaml.lines() {
        let leading = line.len() - line.trim_start_matches(' ').len();
        let steps = leading / 2;
        out.push_str(&" ".repeat(steps * indent + leading % 2));
        out.push_str(line.trim_start_matches(' '));
        out.push('\n');
    }
    out
}
