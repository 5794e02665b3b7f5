use std::collections::BTreeSet;

use crate::core::document::Node;
use crate::error::ConversionError;

/// Options for column-path inference.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Expand nested elements into dotted column paths. When disabled, a
    /// nested element contributes a single column at its own path and
    /// recursion stops there.
    pub flatten: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self { flatten: true }
    }
}

/// Infers the column paths covering every attribute and every
/// leaf-reachable element across the given record nodes.
///
/// Record-level attributes contribute `@name` paths; elements contribute
/// dotted paths (`Details.Age`). The result is deduplicated and sorted
/// alphabetically, so regeneration over the same records is byte-stable.
///
/// An attribute and an element sharing a name stay distinct columns
/// (`@id` and `id`): attributes and elements are different constructs and
/// are never merged.
///
/// Returns [`ConversionError::InvalidInput`] for an empty record set.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::document::Node;
/// use datamorph_rs::core::schema::{infer_schema, SchemaOptions};
///
/// let mut record = Node::new("person");
/// record.attributes.push(("id".into(), "1".into()));
/// let mut details = Node::new("Details");
/// details.children.push(Node::leaf("Age", "30"));
/// record.children.push(Node::leaf("Name", "John"));
/// record.children.push(details);
///
/// let schema = infer_schema(&[&record], &SchemaOptions::default()).unwrap();
/// assert_eq!(schema, vec!["@id", "Details.Age", "Name"]);
/// ```
pub fn infer_schema(
    records: &[&Node],
    options: &SchemaOptions,
) -> Result<Vec<String>, ConversionError> {
    if records.is_empty() {
        return Err(ConversionError::InvalidInput(
            "no record nodes to infer a schema from".to_string(),
        ));
    }

    let mut columns = BTreeSet::new();
    for record in records {
        for (name, _) in &record.attributes {
            if !is_namespace_declaration(name) {
                columns.insert(format!("@{name}"));
            }
        }
        for child in &record.children {
            collect_columns(child, "", options.flatten, &mut columns);
        }
    }

    Ok(columns.into_iter().collect())
}

fn collect_columns(node: &Node, prefix: &str, flatten: bool, columns: &mut BTreeSet<String>) {
    let path = if prefix.is_empty() {
        node.tag.clone()
    } else {
        format!("{prefix}.{}", node.tag)
    };

    if node.is_leaf() || !flatten {
        columns.insert(path);
    } else {
        for child in &node.children {
            collect_columns(child, &path, flatten, columns);
        }
    }
}

fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, age: &str, city: Option<&str>) -> Node {
        let mut record = Node::new("person");
        record.children.push(Node::leaf("Name", name));
        let mut details = Node::new("Details");
        details.children.push(Node::leaf("Age", age));
        if let Some(city) = city {
            details.children.push(Node::leaf("City", city));
        }
        record.children.push(details);
        record
    }

    #[test]
    fn schema_is_sorted_and_deterministic() {
        let a = person("John", "30", Some("Paris"));
        let b = person("Jane", "25", None);
        let records = vec![&a, &b];

        let first = infer_schema(&records, &SchemaOptions::default()).unwrap();
        let second = infer_schema(&records, &SchemaOptions::default()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, vec!["Details.Age", "Details.City", "Name"]);
    }

    #[test]
    fn sparse_columns_accumulate_across_records() {
        let a = person("John", "30", None);
        let mut b = person("Jane", "25", None);
        b.children.push(Node::leaf("Email", "jane@example.com"));

        let schema = infer_schema(&[&a, &b], &SchemaOptions::default()).unwrap();
        assert_eq!(schema, vec!["Details.Age", "Email", "Name"]);
    }

    #[test]
    fn attribute_and_element_with_same_name_stay_distinct() {
        let mut record = Node::new("row");
        record.attributes.push(("id".into(), "1".into()));
        record.children.push(Node::leaf("id", "2"));

        let schema = infer_schema(&[&record], &SchemaOptions::default()).unwrap();
        assert_eq!(schema, vec!["@id", "id"]);
    }

    #[test]
    fn namespace_declarations_are_ignored() {
        let mut record = Node::new("row");
        record
            .attributes
            .push(("xmlns".into(), "http://example.com".into()));
        record
            .attributes
            .push(("xmlns:x".into(), "http://example.com/x".into()));
        record.attributes.push(("id".into(), "1".into()));

        let schema = infer_schema(&[&record], &SchemaOptions::default()).unwrap();
        assert_eq!(schema, vec!["@id"]);
    }

    #[test]
    fn disabled_flattening_stops_at_nested_elements() {
        let record = person("John", "30", None);
        let schema = infer_schema(&[&record], &SchemaOptions { flatten: false }).unwrap();
        assert_eq!(schema, vec!["Details", "Name"]);
    }

    #[test]
    fn empty_record_set_is_an_error() {
        let result = infer_schema(&[], &SchemaOptions::default());
        assert!(matches!(result, Err(ConversionError::InvalidInput(_))));
    }
}
