//! JSON emission for tables and documents.
//!
//! Both entry points build an ordered [`serde_json::Value`] tree first and
//! only then serialize, so the structural output matches the YAML emitter
//! for the same options.

use serde_json::{Map, Value};

use crate::core::document::Document;
use crate::core::table::Table;
use crate::core::unflatten::validate_paths;
use crate::core::value::TypeOptions;
use crate::error::ConversionError;
use crate::format::naming::NamingConvention;
use crate::format::tree::{node_value, row_object, RowSpec, TreeSpec};

/// Options for rendering tables and documents as JSON.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Apply the shared value typing to cells; off means every value stays
    /// a string.
    pub convert_values: bool,
    pub pretty: bool,
    /// Include a 1-based `row_number` field in each row object.
    pub include_row_numbers: bool,
    /// Emit a top-level mapping keyed by this column's distinct values,
    /// each holding an array of the remaining-column row objects.
    pub group_by: Option<String>,
    /// Reassemble dotted headers into nested objects.
    pub nested: bool,
    pub nested_separator: String,
    /// Keep empty cells in row objects instead of omitting them.
    pub keep_empty: bool,
    /// Type empty cells as null rather than `""` (only meaningful with
    /// `keep_empty`).
    pub empty_as_null: bool,
    pub date_format: Option<String>,
    /// Split cells on [`JsonOptions::array_delimiter`] into typed arrays.
    pub convert_arrays: bool,
    pub array_delimiter: String,
    pub naming: NamingConvention,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            convert_values: true,
            pretty: true,
            include_row_numbers: false,
            group_by: None,
            nested: false,
            nested_separator: ".".to_string(),
            keep_empty: false,
            empty_as_null: false,
            date_format: None,
            convert_arrays: false,
            array_delimiter: ";".to_string(),
            naming: NamingConvention::Original,
        }
    }
}

impl JsonOptions {
    fn type_options(&self) -> TypeOptions {
        TypeOptions {
            date_format: self.date_format.clone(),
            empty_as_null: self.empty_as_null,
        }
    }
}

/// Renders a table as JSON: an array of row objects, or a grouped mapping
/// when [`JsonOptions::group_by`] is set.
///
/// Returns [`ConversionError::InvalidInput`] for a missing group column
/// and [`ConversionError::StructuralAmbiguity`] for conflicting nested
/// paths.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::table::Table;
/// use datamorph_rs::format::json::{table_to_json, JsonOptions};
///
/// let table = Table::new(
///     vec!["Name".into(), "Age".into()],
///     vec![vec!["John".into(), "30".into()]],
/// ).unwrap();
///
/// let json = table_to_json(&table, &JsonOptions { pretty: false, ..Default::default() }).unwrap();
/// assert_eq!(json, r#"[{"Name":"John","Age":30}]"#);
/// ```
pub fn table_to_json(table: &Table, options: &JsonOptions) -> Result<String, ConversionError> {
    serialize(&table_value(table, options)?, options)
}

/// Builds the value tree a table serializes to. Shared with the YAML
/// emitter's grouped structure.
pub(crate) fn table_value(table: &Table, options: &JsonOptions) -> Result<Value, ConversionError> {
    if options.nested {
        // validate the keys as they will be emitted
        let named: Vec<String> = table
            .headers()
            .iter()
            .map(|h| options.naming.apply(h))
            .collect();
        validate_paths(&named, &options.nested_separator)?;
    }

    let type_options = options.type_options();

    let value = match &options.group_by {
        Some(column) => {
            let (group_index, groups) = table.grouped_by(column)?;
            let mut grouped = Map::new();
            for (key, members) in groups {
                let rows: Vec<Value> = members
                    .iter()
                    .enumerate()
                    .map(|(position, row_index)| {
                        build_row(
                            table,
                            *row_index,
                            position,
                            Some(group_index),
                            &type_options,
                            options,
                        )
                    })
                    .collect();
                grouped.insert(key, Value::Array(rows));
            }
            Value::Object(grouped)
        }
        None => Value::Array(
            (0..table.rows().len())
                .map(|i| build_row(table, i, i, None, &type_options, options))
                .collect(),
        ),
    };

    Ok(value)
}

/// Renders a document as JSON, keyed by the root tag.
///
/// Repeated sibling elements collapse into arrays, attributes become
/// `@`-prefixed keys and raw (CDATA) content is never type-converted.
pub fn document_to_json(
    document: &Document,
    options: &JsonOptions,
) -> Result<String, ConversionError> {
    serialize(&document_value(document, options), options)
}

pub(crate) fn document_value(document: &Document, options: &JsonOptions) -> Value {
    let type_options = options.type_options();
    let spec = TreeSpec {
        naming: options.naming,
        convert: options.convert_values,
        type_options: &type_options,
    };

    let mut wrapper = Map::new();
    wrapper.insert(
        options.naming.apply(&document.root.tag),
        node_value(&document.root, &spec),
    );
    Value::Object(wrapper)
}

fn build_row(
    table: &Table,
    row_index: usize,
    position: usize,
    skip: Option<usize>,
    type_options: &TypeOptions,
    options: &JsonOptions,
) -> Value {
    let spec = RowSpec {
        naming: options.naming,
        convert: options.convert_values,
        type_options,
        keep_empty: options.keep_empty,
        skip,
        row_number: options.include_row_numbers.then_some(position + 1),
        array_delimiter: options
            .convert_arrays
            .then_some(options.array_delimiter.as_str()),
    };

    let flat = row_object(table.headers(), &table.rows()[row_index], &spec);
    if options.nested {
        Value::Object(nest_object(flat, &options.nested_separator))
    } else {
        Value::Object(flat)
    }
}

/// Splits flat keys on the separator and rebuilds the nested objects,
/// sharing intermediate maps between keys with a common prefix.
/// `@`-prefixed keys address attributes, not paths, and stay flat.
fn nest_object(flat: Map<String, Value>, separator: &str) -> Map<String, Value> {
    let mut nested = Map::new();
    for (key, value) in flat {
        if key.starts_with('@') {
            nested.insert(key, value);
            continue;
        }

        let mut segments: Vec<&str> = key.split(separator).collect();
        let leaf = segments.pop().expect("split yields at least one segment");

        let mut target = &mut nested;
        for segment in segments {
            target = target
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()
                .expect("intermediate segments validated as branches");
        }
        target.insert(leaf.to_string(), value);
    }
    nested
}

fn serialize(value: &Value, options: &JsonOptions) -> Result<String, ConversionError> {
    let result = if options.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|e| ConversionError::Writer(format!("failed to serialize JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Node;

    fn compact() -> JsonOptions {
        JsonOptions {
            pretty: false,
            ..JsonOptions::default()
        }
    }

    fn people() -> Table {
        Table::new(
            vec!["Name".into(), "Age".into(), "City".into()],
            vec![
                vec!["John".into(), "30".into(), "Paris".into()],
                vec!["Jane".into(), "25".into(), "Oslo".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rows_become_typed_objects() {
        let json = table_to_json(&people(), &compact()).unwrap();
        assert_eq!(
            json,
            r#"[{"Name":"John","Age":30,"City":"Paris"},{"Name":"Jane","Age":25,"City":"Oslo"}]"#
        );
    }

    #[test]
    fn conversion_can_be_disabled() {
        let json = table_to_json(
            &people(),
            &JsonOptions {
                convert_values: false,
                ..compact()
            },
        )
        .unwrap();
        assert!(json.contains(r#""Age":"30""#));
    }

    #[test]
    fn grouping_keys_by_distinct_values_and_drops_the_column() {
        let table = Table::new(
            vec!["Name".into(), "City".into()],
            vec![
                vec!["John".into(), "Paris".into()],
                vec!["Jim".into(), "Paris".into()],
                vec!["Jane".into(), "Oslo".into()],
            ],
        )
        .unwrap();

        let json = table_to_json(
            &table,
            &JsonOptions {
                group_by: Some("City".to_string()),
                ..compact()
            },
        )
        .unwrap();
        assert_eq!(
            json,
            r#"{"Paris":[{"Name":"John"},{"Name":"Jim"}],"Oslo":[{"Name":"Jane"}]}"#
        );
    }

    #[test]
    fn grouping_by_missing_column_fails() {
        let result = table_to_json(
            &people(),
            &JsonOptions {
                group_by: Some("Country".to_string()),
                ..compact()
            },
        );
        assert!(matches!(result, Err(ConversionError::InvalidInput(_))));
    }

    #[test]
    fn nested_objects_are_rebuilt_from_dotted_headers() {
        let table = Table::new(
            vec!["Name".into(), "Details.Age".into(), "Details.City".into()],
            vec![vec!["John".into(), "30".into(), "Paris".into()]],
        )
        .unwrap();

        let json = table_to_json(
            &table,
            &JsonOptions {
                nested: true,
                ..compact()
            },
        )
        .unwrap();
        assert_eq!(
            json,
            r#"[{"Name":"John","Details":{"Age":30,"City":"Paris"}}]"#
        );
    }

    #[test]
    fn nested_conflicts_are_surfaced() {
        let table = Table::new(
            vec!["a".into(), "a.b".into()],
            vec![vec!["1".into(), "2".into()]],
        )
        .unwrap();

        let result = table_to_json(
            &table,
            &JsonOptions {
                nested: true,
                ..compact()
            },
        );
        assert!(matches!(
            result,
            Err(ConversionError::StructuralAmbiguity(_))
        ));
    }

    #[test]
    fn row_numbers_lead_each_object() {
        let json = table_to_json(
            &people(),
            &JsonOptions {
                include_row_numbers: true,
                ..compact()
            },
        )
        .unwrap();
        assert!(json.starts_with(r#"[{"row_number":1,"Name":"John""#));
    }

    #[test]
    fn empty_cells_are_omitted_unless_kept() {
        let table = Table::new(
            vec!["Name".into(), "Email".into()],
            vec![vec!["John".into(), String::new()]],
        )
        .unwrap();

        let json = table_to_json(&table, &compact()).unwrap();
        assert_eq!(json, r#"[{"Name":"John"}]"#);

        let json = table_to_json(
            &table,
            &JsonOptions {
                keep_empty: true,
                ..compact()
            },
        )
        .unwrap();
        assert_eq!(json, r#"[{"Name":"John","Email":""}]"#);

        let json = table_to_json(
            &table,
            &JsonOptions {
                keep_empty: true,
                empty_as_null: true,
                ..compact()
            },
        )
        .unwrap();
        assert_eq!(json, r#"[{"Name":"John","Email":null}]"#);
    }

    #[test]
    fn delimited_cells_become_arrays() {
        let table = Table::new(
            vec!["Name".into(), "Scores".into()],
            vec![vec!["John".into(), "1;2;3".into()]],
        )
        .unwrap();

        let json = table_to_json(
            &table,
            &JsonOptions {
                convert_arrays: true,
                ..compact()
            },
        )
        .unwrap();
        assert_eq!(json, r#"[{"Name":"John","Scores":[1,2,3]}]"#);
    }

    #[test]
    fn documents_are_keyed_by_the_root_tag() {
        let mut root = Node::new("people");
        let mut person = Node::new("person");
        person.attributes.push(("id".into(), "1".into()));
        person.children.push(Node::leaf("Name", "John"));
        root.children.push(person.clone());
        person.attributes[0].1 = "2".into();
        root.children.push(person);

        let json = document_to_json(&Document::new(root), &compact()).unwrap();
        assert_eq!(
            json,
            r#"{"people":{"person":[{"@id":1,"Name":"John"},{"@id":2,"Name":"John"}]}}"#
        );
    }

    #[test]
    fn pretty_output_is_indented() {
        let json = table_to_json(&people(), &JsonOptions::default()).unwrap();
        assert!(json.contains("\n  "));
    }
}
