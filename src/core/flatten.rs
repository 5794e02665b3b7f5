use crate::core::document::Node;
use crate::core::table::Table;
use crate::error::ConversionError;

/// Options for flattening record nodes into table rows.
#[derive(Debug, Clone, Default)]
pub struct FlattenOptions {
    /// Substituted for empty or missing cells when set. The default is no
    /// substitution: absent values stay empty strings.
    pub null_token: Option<String>,
}

/// Produces one table row per record node, resolving every column path of
/// the schema.
///
/// Resolution is total: a path that does not resolve on a given record
/// yields an empty cell, never an error. Sparse schemas are expected.
/// Paths starting with `@` look up an attribute on the record node itself
/// (never searched recursively); dotted paths walk child elements by
/// exact tag match, first match winning. Raw (CDATA) content is returned
/// verbatim; other text is trimmed.
///
/// Returns [`ConversionError::InvalidInput`] only when the record set or
/// the schema is empty.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::document::Node;
/// use datamorph_rs::core::flatten::{flatten_records, FlattenOptions};
///
/// let mut record = Node::new("person");
/// record.attributes.push(("id".into(), "1".into()));
/// let mut details = Node::new("Details");
/// details.children.push(Node::leaf("Age", " 30 "));
/// record.children.push(details);
///
/// let schema = vec!["@id".to_string(), "Details.Age".to_string(), "Email".to_string()];
/// let table = flatten_records(&[&record], &schema, &FlattenOptions::default()).unwrap();
///
/// assert_eq!(table.rows()[0], vec!["1".to_string(), "30".to_string(), String::new()]);
/// ```
pub fn flatten_records(
    records: &[&Node],
    schema: &[String],
    options: &FlattenOptions,
) -> Result<Table, ConversionError> {
    if records.is_empty() {
        return Err(ConversionError::InvalidInput(
            "no record nodes to flatten".to_string(),
        ));
    }
    if schema.is_empty() {
        return Err(ConversionError::InvalidInput(
            "cannot flatten records against an empty schema".to_string(),
        ));
    }

    let rows = records
        .iter()
        .map(|record| {
            schema
                .iter()
                .map(|path| {
                    let value = resolve_path(record, path).unwrap_or_default();
                    match &options.null_token {
                        Some(token) if value.is_empty() => token.clone(),
                        _ => value,
                    }
                })
                .collect()
        })
        .collect();

    Table::new(schema.to_vec(), rows)
}

fn resolve_path(record: &Node, path: &str) -> Option<String> {
    if let Some(attribute) = path.strip_prefix('@') {
        return record.attribute(attribute).map(str::to_string);
    }

    let mut node = record;
    for segment in path.split('.') {
        node = node.child(segment)?;
    }

    let text = node.text.as_deref()?;
    if node.raw {
        Some(text.to_string())
    } else {
        Some(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{infer_schema, SchemaOptions};

    fn record() -> Node {
        let mut node = Node::new("person");
        node.attributes.push(("id".into(), "1".into()));
        node.children.push(Node::leaf("Name", "John"));
        let mut details = Node::new("Details");
        details.children.push(Node::leaf("Age", "30"));
        node.children.push(details);
        node
    }

    #[test]
    fn every_row_matches_the_schema_width() {
        let a = record();
        let mut b = Node::new("person");
        b.children.push(Node::leaf("Name", "Jane"));
        let records = vec![&a, &b];

        let schema = infer_schema(&records, &SchemaOptions::default()).unwrap();
        let table = flatten_records(&records, &schema, &FlattenOptions::default()).unwrap();

        assert_eq!(table.rows().len(), 2);
        for row in table.rows() {
            assert_eq!(row.len(), schema.len());
        }
        // missing paths degrade to empty cells on the sparse record
        assert_eq!(table.rows()[1][0], "");
    }

    #[test]
    fn attributes_resolve_on_the_record_only() {
        let mut node = record();
        // nested attribute must not satisfy a record-level @ path
        node.children[1].attributes.push(("id".into(), "9".into()));

        let table = flatten_records(
            &[&node],
            &["@id".to_string(), "@missing".to_string()],
            &FlattenOptions::default(),
        )
        .unwrap();

        assert_eq!(table.rows()[0], vec!["1".to_string(), String::new()]);
    }

    #[test]
    fn raw_content_is_verbatim_and_text_is_trimmed() {
        let mut node = Node::new("row");
        node.children.push(Node::leaf("plain", "  padded  "));
        let mut raw = Node::leaf("script", "  if (a < b) { run(); }  ");
        raw.raw = true;
        node.children.push(raw);

        let table = flatten_records(
            &[&node],
            &["plain".to_string(), "script".to_string()],
            &FlattenOptions::default(),
        )
        .unwrap();

        assert_eq!(table.rows()[0][0], "padded");
        assert_eq!(table.rows()[0][1], "  if (a < b) { run(); }  ");
    }

    #[test]
    fn null_token_substitutes_missing_values() {
        let node = record();
        let table = flatten_records(
            &[&node],
            &["Name".to_string(), "Email".to_string()],
            &FlattenOptions {
                null_token: Some("N/A".to_string()),
            },
        )
        .unwrap();

        assert_eq!(table.rows()[0], vec!["John".to_string(), "N/A".to_string()]);
    }

    #[test]
    fn first_matching_sibling_wins() {
        let mut node = Node::new("row");
        node.children.push(Node::leaf("tag", "first"));
        node.children.push(Node::leaf("tag", "second"));

        let table =
            flatten_records(&[&node], &["tag".to_string()], &FlattenOptions::default()).unwrap();
        assert_eq!(table.rows()[0][0], "first");
    }

    #[test]
    fn empty_inputs_are_errors() {
        let node = record();
        assert!(matches!(
            flatten_records(&[], &["Name".to_string()], &FlattenOptions::default()),
            Err(ConversionError::InvalidInput(_))
        ));
        assert!(matches!(
            flatten_records(&[&node], &[], &FlattenOptions::default()),
            Err(ConversionError::InvalidInput(_))
        ));
    }
}
