use std::collections::BTreeSet;

use crate::core::document::{Document, Node};
use crate::core::table::Table;
use crate::error::ConversionError;

/// Options for rebuilding a hierarchy from dotted headers.
#[derive(Debug, Clone)]
pub struct UnflattenOptions {
    /// Tag of the synthetic root node wrapping all records.
    pub root_tag: String,
    /// Tag of each per-row record node.
    pub row_tag: String,
    /// Also mark values containing embedded newlines as raw, so XML
    /// emission wraps them in CDATA.
    pub raw_newlines: bool,
}

impl Default for UnflattenOptions {
    fn default() -> Self {
        Self {
            root_tag: "root".to_string(),
            row_tag: "row".to_string(),
            raw_newlines: false,
        }
    }
}

/// Rebuilds one record node per table row, reconstructing nesting from
/// dotted column paths. The inverse of
/// [`flatten_records`](crate::core::flatten::flatten_records).
///
/// Headers starting with `@` become attributes on the record node. Dotted
/// headers walk-or-create intermediate child nodes and set the leaf text.
/// Unlike flattening, which only reads, this walk creates nodes that do
/// not exist yet.
///
/// Values that would require escaping in XML (`<`, `>`, `&`, and
/// newlines when [`UnflattenOptions::raw_newlines`] is set) are marked
/// raw, so downstream emission wraps them in CDATA instead of
/// entity-escaping them.
///
/// Conflicting headers, where one path is bound to a scalar and also used
/// as a branch by another header (`a` and `a.b`), are rejected with
/// [`ConversionError::StructuralAmbiguity`] before any row is converted.
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::table::Table;
/// use datamorph_rs::core::unflatten::{unflatten, UnflattenOptions};
///
/// let table = Table::new(
///     vec!["@id".into(), "Name".into(), "Details.Age".into()],
///     vec![vec!["1".into(), "John".into(), "30".into()]],
/// ).unwrap();
///
/// let doc = unflatten(&table, &UnflattenOptions::default()).unwrap();
/// let record = &doc.root.children[0];
///
/// assert_eq!(record.attribute("id"), Some("1"));
/// assert_eq!(record.child("Details").unwrap().child("Age").unwrap().text.as_deref(), Some("30"));
/// ```
pub fn unflatten(table: &Table, options: &UnflattenOptions) -> Result<Document, ConversionError> {
    validate_paths(table.headers(), ".")?;

    let mut root = Node::new(&options.root_tag);
    for row in table.rows() {
        let mut record = Node::new(&options.row_tag);
        for (header, value) in table.headers().iter().zip(row) {
            if let Some(attribute) = header.strip_prefix('@') {
                record
                    .attributes
                    .push((attribute.to_string(), value.clone()));
            } else {
                insert_path(&mut record, header, value, options.raw_newlines);
            }
        }
        root.children.push(record);
    }

    Ok(Document::new(root))
}

/// Checks a header set for conflicting dotted-path bindings: a header
/// that is also an ancestor segment of another header binds the same node
/// to both a scalar and a branch.
///
/// Shared with the nested-object JSON emission, which splits on a
/// configurable separator.
pub fn validate_paths(headers: &[String], separator: &str) -> Result<(), ConversionError> {
    let mut leaves = BTreeSet::new();
    let mut branches = BTreeSet::new();

    for header in headers.iter().filter(|h| !h.starts_with('@')) {
        let segments: Vec<&str> = header.split(separator).collect();
        for i in 1..segments.len() {
            branches.insert(segments[..i].join(separator));
        }
        leaves.insert(header.clone());
    }

    if let Some(conflict) = leaves.intersection(&branches).next() {
        return Err(ConversionError::StructuralAmbiguity(format!(
            "column `{conflict}` is bound to a scalar and used as a branch by another column"
        )));
    }

    Ok(())
}

fn insert_path(record: &mut Node, path: &str, value: &str, raw_newlines: bool) {
    let mut node = record;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let is_last = segments.peek().is_none();
        let position = node.children.iter().position(|c| c.tag == segment);
        let index = match position {
            Some(index) => index,
            None => {
                node.children.push(Node::new(segment));
                node.children.len() - 1
            }
        };
        node = &mut node.children[index];

        if is_last {
            node.text = Some(value.to_string());
            node.raw = needs_raw(value, raw_newlines);
        }
    }
}

fn needs_raw(value: &str, raw_newlines: bool) -> bool {
    value.contains('<')
        || value.contains('>')
        || value.contains('&')
        || (raw_newlines && value.contains('\n'))
}
