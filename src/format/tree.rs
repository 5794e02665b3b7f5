//! Shared builders turning the pivot models into ordered key/value trees.
//!
//! Both the JSON and YAML emitters serialize from the same
//! `serde_json::Value` trees (ordered maps), so their structural output is
//! identical regardless of the serializer that consumes it.

use serde_json::{Map, Number, Value};

use crate::core::document::Node;
use crate::core::value::{format_datetime, type_value, TypeOptions, TypedValue};
use crate::format::naming::NamingConvention;

/// How one raw cell becomes a scalar value.
pub(crate) struct ScalarSpec<'a> {
    pub convert: bool,
    pub type_options: &'a TypeOptions,
}

pub(crate) fn scalar_value(raw: &str, is_raw: bool, spec: &ScalarSpec) -> Value {
    // raw (CDATA) content is never reinterpreted
    if is_raw || !spec.convert {
        return Value::String(raw.to_string());
    }

    match type_value(raw, spec.type_options) {
        TypedValue::Integer(i) => Value::Number(i.into()),
        TypedValue::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        TypedValue::Boolean(b) => Value::Bool(b),
        TypedValue::DateTime(dt) => Value::String(format_datetime(
            &dt,
            spec.type_options.date_format.as_deref(),
        )),
        TypedValue::Null => Value::Null,
        TypedValue::Text(s) => Value::String(s),
    }
}

/// How one table row becomes a key/value object.
pub(crate) struct RowSpec<'a> {
    pub naming: NamingConvention,
    pub convert: bool,
    pub type_options: &'a TypeOptions,
    /// Include empty cells; when false they are omitted from the object.
    pub keep_empty: bool,
    /// Column index to exclude (the group column of a grouped emission).
    pub skip: Option<usize>,
    /// 1-based row number to include as a leading `row_number` entry.
    pub row_number: Option<usize>,
    /// Split cells containing this delimiter into arrays.
    pub array_delimiter: Option<&'a str>,
}

pub(crate) fn row_object(headers: &[String], row: &[String], spec: &RowSpec) -> Map<String, Value> {
    let scalar = ScalarSpec {
        convert: spec.convert,
        type_options: spec.type_options,
    };

    let mut object = Map::new();
    if let Some(number) = spec.row_number {
        object.insert("row_number".to_string(), Value::Number(number.into()));
    }

    for (i, (header, cell)) in headers.iter().zip(row).enumerate() {
        if spec.skip == Some(i) {
            continue;
        }
        if cell.is_empty() && !spec.keep_empty {
            continue;
        }

        let value = match spec.array_delimiter {
            Some(delimiter) if !delimiter.is_empty() && cell.contains(delimiter) => Value::Array(
                cell.split(delimiter)
                    .map(|part| scalar_value(part.trim(), false, &scalar))
                    .collect(),
            ),
            _ => scalar_value(cell, false, &scalar),
        };

        object.insert(spec.naming.apply(header), value);
    }

    object
}

/// How a node tree becomes a value tree.
pub(crate) struct TreeSpec<'a> {
    pub naming: NamingConvention,
    pub convert: bool,
    pub type_options: &'a TypeOptions,
}

/// Converts the content of `node` into a value: a scalar for plain
/// leaves, otherwise a map of `@attribute` entries and child entries.
/// Sibling children sharing a tag collapse into one array entry; a
/// uniquely named child maps to a single nested value. A leaf that also
/// carries attributes keeps its text under `#text`.
pub(crate) fn node_value(node: &Node, spec: &TreeSpec) -> Value {
    let scalar = ScalarSpec {
        convert: spec.convert,
        type_options: spec.type_options,
    };

    if node.is_leaf() && node.attributes.is_empty() {
        return scalar_value(node.text.as_deref().unwrap_or(""), node.raw, &scalar);
    }

    let mut map = Map::new();
    for (name, value) in &node.attributes {
        map.insert(
            format!("@{}", spec.naming.apply(name)),
            scalar_value(value, false, &scalar),
        );
    }

    if node.is_leaf() {
        if let Some(text) = &node.text {
            map.insert(
                "#text".to_string(),
                scalar_value(text, node.raw, &scalar),
            );
        }
        return Value::Object(map);
    }

    let mut seen: Vec<&str> = Vec::new();
    for child in &node.children {
        if !seen.contains(&child.tag.as_str()) {
            seen.push(&child.tag);
        }
    }

    for tag in seen {
        let group: Vec<&Node> = node.children_named(tag).collect();
        let key = spec.naming.apply(tag);
        if group.len() == 1 {
            map.insert(key, node_value(group[0], spec));
        } else {
            map.insert(
                key,
                Value::Array(group.iter().map(|n| node_value(n, spec)).collect()),
            );
        }
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(options: &TypeOptions) -> TreeSpec<'_> {
        TreeSpec {
            naming: NamingConvention::Original,
            convert: true,
            type_options: options,
        }
    }

    #[test]
    fn repeated_siblings_become_arrays() {
        let mut node = Node::new("person");
        node.children.push(Node::leaf("name", "John"));
        node.children.push(Node::leaf("hobby", "chess"));
        node.children.push(Node::leaf("hobby", "running"));

        let options = TypeOptions::default();
        let value = node_value(&node, &spec(&options));
        let object = value.as_object().unwrap();

        assert_eq!(object["name"], Value::String("John".to_string()));
        assert_eq!(
            object["hobby"],
            Value::Array(vec![
                Value::String("chess".to_string()),
                Value::String("running".to_string()),
            ])
        );
    }

    #[test]
    fn attributes_use_at_prefixed_keys() {
        let mut node = Node::new("person");
        node.attributes.push(("id".into(), "1".into()));
        node.children.push(Node::leaf("name", "John"));

        let options = TypeOptions::default();
        let value = node_value(&node, &spec(&options));
        let object = value.as_object().unwrap();

        assert_eq!(object["@id"], Value::Number(1.into()));
        assert_eq!(object["name"], Value::String("John".to_string()));
    }

    #[test]
    fn raw_leaves_are_never_type_converted() {
        let mut leaf = Node::leaf("value", "30");
        leaf.raw = true;

        let options = TypeOptions::default();
        let value = node_value(&leaf, &spec(&options));
        assert_eq!(value, Value::String("30".to_string()));
    }

    #[test]
    fn attributed_leaf_keeps_text_under_hash_text() {
        let mut leaf = Node::leaf("price", "9.50");
        leaf.attributes.push(("currency".into(), "EUR".into()));

        let options = TypeOptions::default();
        let value = node_value(&leaf, &spec(&options));
        let object = value.as_object().unwrap();

        assert_eq!(object["@currency"], Value::String("EUR".to_string()));
        assert_eq!(object["#text"], serde_json::json!(9.5));
    }

    #[test]
    fn row_objects_respect_skip_and_empty_handling() {
        let headers = vec!["Name".to_string(), "City".to_string(), "Age".to_string()];
        let row = vec!["John".to_string(), String::new(), "30".to_string()];
        let options = TypeOptions::default();

        let object = row_object(
            &headers,
            &row,
            &RowSpec {
                naming: NamingConvention::Original,
                convert: true,
                type_options: &options,
                keep_empty: false,
                skip: Some(2),
                row_number: Some(4),
                array_delimiter: None,
            },
        );

        let keys: Vec<&String> = object.keys().collect();
        assert_eq!(keys, vec!["row_number", "Name"]);
        assert_eq!(object["row_number"], Value::Number(4.into()));
    }

    #[test]
    fn delimited_cells_split_into_typed_arrays() {
        let headers = vec!["Scores".to_string()];
        let row = vec!["1; 2; x".to_string()];
        let options = TypeOptions::default();

        let object = row_object(
            &headers,
            &row,
            &RowSpec {
                naming: NamingConvention::Original,
                convert: true,
                type_options: &options,
                keep_empty: true,
                skip: None,
                row_number: None,
                array_delimiter: Some(";"),
            },
        );

        assert_eq!(
            object["Scores"],
            Value::Array(vec![
                Value::Number(1.into()),
                Value::Number(2.into()),
                Value::String("x".to_string()),
            ])
        );
    }
}
