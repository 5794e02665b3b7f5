use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use crate::core::document::{Document, Node};
use crate::core::table::Table;
use crate::core::unflatten::{unflatten, UnflattenOptions};
use crate::core::value::{format_datetime, type_value, TypeOptions, TypedValue};
use crate::error::ConversionError;
use crate::format::naming::{sanitize_xml_name, NamingConvention};

/// How table columns are encoded in the emitted XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlFormat {
    /// One child element per column.
    #[default]
    Elements,
    /// One attribute per column on the row element.
    Attributes,
    /// Attribute-eligible columns (short, single-line, markup-free values
    /// on every row) become attributes; the rest become elements.
    Mixed,
    /// Dotted column paths are rebuilt into nested elements, `@` columns
    /// into attributes, one record element per row.
    Hierarchical,
}

/// Options for rendering tables and documents as XML.
#[derive(Debug, Clone)]
pub struct XmlWriteOptions {
    pub format: XmlFormat,
    /// Wrap markup-heavy text in CDATA instead of entity-escaping it.
    pub use_cdata: bool,
    pub root_tag: String,
    pub row_tag: String,
    pub naming: NamingConvention,
    /// Rewrite names that are not valid XML identifiers.
    pub sanitize_names: bool,
    /// Annotate typed leaves with a `type` attribute and empty cells with
    /// `nil="true"`, using the shared value typing.
    pub convert_types: bool,
    /// Add a 1-based `number` attribute to each row element.
    pub include_row_numbers: bool,
    /// Group rows by this column; each group element carries `name` and
    /// `count` attributes and the group column is dropped from members.
    /// Not applied by the hierarchical format.
    pub group_by: Option<String>,
    /// Sort rows by this column before emission, stable and lexicographic.
    pub sort_by: Option<String>,
    pub descending: bool,
    /// Emit the `<?xml ... ?>` declaration.
    pub declaration: bool,
    pub indent: bool,
    /// Maximum value length for attribute eligibility in [`XmlFormat::Mixed`].
    pub attr_value_limit: usize,
    /// Date format used when typed values are rendered.
    pub date_format: Option<String>,
}

impl Default for XmlWriteOptions {
    fn default() -> Self {
        Self {
            format: XmlFormat::Elements,
            use_cdata: true,
            root_tag: "root".to_string(),
            row_tag: "row".to_string(),
            naming: NamingConvention::Original,
            sanitize_names: true,
            convert_types: false,
            include_row_numbers: false,
            group_by: None,
            sort_by: None,
            descending: false,
            declaration: true,
            indent: true,
            attr_value_limit: 80,
            date_format: None,
        }
    }
}

impl XmlWriteOptions {
    fn name(&self, raw: &str) -> String {
        let named = self.naming.apply(raw);
        if self.sanitize_names {
            sanitize_xml_name(&named)
        } else {
            named
        }
    }

    fn type_options(&self) -> TypeOptions {
        TypeOptions {
            date_format: self.date_format.clone(),
            ..TypeOptions::default()
        }
    }
}

/// Renders a table as XML.
///
/// Sorting and grouping are applied first (either referencing a missing
/// column is [`ConversionError::InvalidInput`]), then each row is encoded
/// per [`XmlWriteOptions::format`]. The hierarchical format runs the
/// dotted-path reconstruction and rejects conflicting headers with
/// [`ConversionError::StructuralAmbiguity`].
///
/// # Examples
///
/// ```
/// use datamorph_rs::core::table::Table;
/// use datamorph_rs::format::xml::writer::write_table;
/// use datamorph_rs::format::xml::XmlWriteOptions;
///
/// let table = Table::new(
///     vec!["Name".into(), "Age".into()],
///     vec![vec!["John".into(), "30".into()]],
/// ).unwrap();
///
/// let xml = write_table(&table, &XmlWriteOptions { declaration: false, ..Default::default() }).unwrap();
/// assert!(xml.contains("<Name>John</Name>"));
/// ```
pub fn write_table(table: &Table, options: &XmlWriteOptions) -> Result<String, ConversionError> {
    let sorted;
    let mut table = table;
    if let Some(column) = &options.sort_by {
        sorted = table.sorted_by(column, options.descending)?;
        table = &sorted;
    }

    if options.format == XmlFormat::Hierarchical {
        return write_hierarchical(table, options);
    }

    let mut emitter = Emitter::new(options);
    emitter.declaration()?;
    let root_tag = options.name(&options.root_tag);
    emitter.start(&root_tag, &[])?;

    match &options.group_by {
        Some(column) => {
            let (group_index, groups) = table.grouped_by(column)?;
            let attribute_columns =
                attribute_columns(table, options, Some(group_index));
            for (key, members) in groups {
                let group_tag = options.name(&format!("group_{key}"));
                let count = members.len().to_string();
                emitter.start(
                    &group_tag,
                    &[("name", key.as_str()), ("count", count.as_str())],
                )?;
                for (position, row_index) in members.iter().enumerate() {
                    write_row(
                        &mut emitter,
                        table,
                        &table.rows()[*row_index],
                        position,
                        &attribute_columns,
                        Some(group_index),
                        options,
                    )?;
                }
                emitter.end(&group_tag)?;
            }
        }
        None => {
            let attribute_columns = attribute_columns(table, options, None);
            for (position, row) in table.rows().iter().enumerate() {
                write_row(
                    &mut emitter,
                    table,
                    row,
                    position,
                    &attribute_columns,
                    None,
                    options,
                )?;
            }
        }
    }

    emitter.end(&root_tag)?;
    emitter.finish()
}

/// Renders a document as XML, preserving attribute order, element order
/// and raw (CDATA) content.
pub fn write_document(
    document: &Document,
    options: &XmlWriteOptions,
) -> Result<String, ConversionError> {
    let mut emitter = Emitter::new(options);
    emitter.declaration()?;
    write_node(&mut emitter, &document.root, options)?;
    emitter.finish()
}

fn write_hierarchical(
    table: &Table,
    options: &XmlWriteOptions,
) -> Result<String, ConversionError> {
    let mut document = unflatten(
        table,
        &UnflattenOptions {
            root_tag: options.root_tag.clone(),
            row_tag: options.row_tag.clone(),
            raw_newlines: options.use_cdata,
        },
    )?;

    if options.include_row_numbers {
        for (i, record) in document.root.children.iter_mut().enumerate() {
            record
                .attributes
                .push(("number".to_string(), (i + 1).to_string()));
        }
    }

    write_document(&document, options)
}

fn write_node(
    emitter: &mut Emitter,
    node: &Node,
    options: &XmlWriteOptions,
) -> Result<(), ConversionError> {
    let tag = options.name(&node.tag);
    let attributes: Vec<(String, String)> = node
        .attributes
        .iter()
        .map(|(name, value)| (options.name(name), value.clone()))
        .collect();
    let attribute_refs: Vec<(&str, &str)> = attributes
        .iter()
        .map(|(n, v)| (n.as_str(), v.as_str()))
        .collect();

    if node.children.is_empty() && node.text.is_none() {
        return emitter.empty(&tag, &attribute_refs);
    }

    emitter.start(&tag, &attribute_refs)?;
    if node.children.is_empty() {
        if let Some(text) = &node.text {
            let wrap = node.raw || (options.use_cdata && needs_cdata(text));
            // a literal "]]>" cannot live inside CDATA
            if wrap && !text.contains("]]>") {
                emitter.cdata(text)?;
            } else {
                emitter.text(text)?;
            }
        }
    } else {
        for child in &node.children {
            write_node(emitter, child, options)?;
        }
    }
    emitter.end(&tag)
}

#[allow(clippy::too_many_arguments)]
fn write_row(
    emitter: &mut Emitter,
    table: &Table,
    row: &[String],
    position: usize,
    attribute_columns: &[bool],
    skip: Option<usize>,
    options: &XmlWriteOptions,
) -> Result<(), ConversionError> {
    let row_tag = options.name(&options.row_tag);

    let number = (position + 1).to_string();
    let mut attributes: Vec<(String, String)> = Vec::new();
    if options.include_row_numbers {
        attributes.push(("number".to_string(), number));
    }
    for (i, header) in table.headers().iter().enumerate() {
        if skip == Some(i) || !attribute_columns[i] || row[i].is_empty() {
            continue;
        }
        attributes.push((options.name(header), render_value(&row[i], options)));
    }

    let attribute_refs: Vec<(&str, &str)> = attributes
        .iter()
        .map(|(n, v)| (n.as_str(), v.as_str()))
        .collect();

    let element_columns: Vec<usize> = (0..table.headers().len())
        .filter(|&i| skip != Some(i) && !attribute_columns[i])
        .collect();
    if element_columns.is_empty() {
        return emitter.empty(&row_tag, &attribute_refs);
    }

    emitter.start(&row_tag, &attribute_refs)?;
    for i in element_columns {
        write_cell(emitter, &options.name(&table.headers()[i]), &row[i], options)?;
    }
    emitter.end(&row_tag)
}

fn write_cell(
    emitter: &mut Emitter,
    tag: &str,
    value: &str,
    options: &XmlWriteOptions,
) -> Result<(), ConversionError> {
    if value.is_empty() {
        let attributes: &[(&str, &str)] =
            if options.convert_types { &[("nil", "true")] } else { &[] };
        return emitter.empty(tag, attributes);
    }

    if options.convert_types {
        let typed = type_value(value, &options.type_options());
        if let Some(type_name) = typed.xml_type_name() {
            emitter.start(tag, &[("type", type_name)])?;
            emitter.text(&render_typed(&typed, value, options))?;
            return emitter.end(tag);
        }
    }

    emitter.start(tag, &[])?;
    if options.use_cdata && needs_cdata(value) {
        emitter.cdata(value)?;
    } else {
        emitter.text(value)?;
    }
    emitter.end(tag)
}

fn render_value(value: &str, options: &XmlWriteOptions) -> String {
    if !options.convert_types {
        return value.to_string();
    }
    render_typed(&type_value(value, &options.type_options()), value, options)
}

fn render_typed(typed: &TypedValue, original: &str, options: &XmlWriteOptions) -> String {
    match typed {
        TypedValue::Integer(i) => i.to_string(),
        TypedValue::Float(f) => f.to_string(),
        TypedValue::Boolean(b) => b.to_string(),
        TypedValue::DateTime(dt) => format_datetime(dt, options.date_format.as_deref()),
        TypedValue::Null => String::new(),
        TypedValue::Text(_) => original.to_string(),
    }
}

/// Which columns become attributes for the given output format.
fn attribute_columns(table: &Table, options: &XmlWriteOptions, skip: Option<usize>) -> Vec<bool> {
    match options.format {
        XmlFormat::Elements | XmlFormat::Hierarchical => vec![false; table.headers().len()],
        XmlFormat::Attributes => table
            .headers()
            .iter()
            .enumerate()
            .map(|(i, _)| skip != Some(i))
            .collect(),
        XmlFormat::Mixed => (0..table.headers().len())
            .map(|i| skip != Some(i) && attribute_eligible(table, i, options.attr_value_limit))
            .collect(),
    }
}

/// A column qualifies as an attribute when every non-empty cell is short,
/// single-line and free of markup.
fn attribute_eligible(table: &Table, column: usize, limit: usize) -> bool {
    table.rows().iter().all(|row| {
        let value = &row[column];
        value.len() <= limit
            && !value.contains('\n')
            && !value.contains('\r')
            && !value.contains('<')
            && !value.contains('>')
    })
}

fn needs_cdata(value: &str) -> bool {
    // a literal "]]>" cannot be wrapped; it falls back to entity escaping
    (value.contains('<') || value.contains('>') || value.contains('&') || value.contains('\n'))
        && !value.contains("]]>")
}

/// Thin wrapper over the event writer so every call site maps errors the
/// same way.
struct Emitter {
    writer: Writer<Vec<u8>>,
    declaration: bool,
}

impl Emitter {
    fn new(options: &XmlWriteOptions) -> Self {
        let writer = if options.indent {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        Self {
            writer,
            declaration: options.declaration,
        }
    }

    fn declaration(&mut self) -> Result<(), ConversionError> {
        if self.declaration {
            self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        Ok(())
    }

    fn start(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Result<(), ConversionError> {
        let mut element = BytesStart::new(tag);
        for (name, value) in attributes {
            element.push_attribute((*name, *value));
        }
        self.write(Event::Start(element))
    }

    fn empty(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Result<(), ConversionError> {
        let mut element = BytesStart::new(tag);
        for (name, value) in attributes {
            element.push_attribute((*name, *value));
        }
        self.write(Event::Empty(element))
    }

    fn end(&mut self, tag: &str) -> Result<(), ConversionError> {
        self.write(Event::End(BytesEnd::new(tag)))
    }

    fn text(&mut self, content: &str) -> Result<(), ConversionError> {
        self.write(Event::Text(BytesText::new(content)))
    }

    fn cdata(&mut self, content: &str) -> Result<(), ConversionError> {
        self.write(Event::CData(BytesCData::new(content)))
    }

    fn write(&mut self, event: Event) -> Result<(), ConversionError> {
        self.writer
            .write_event(event)
            .map_err(|e| ConversionError::Writer(format!("failed to write XML event: {e}")))
    }

    fn finish(self) -> Result<String, ConversionError> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| ConversionError::Writer(format!("XML output is not valid UTF-8: {e}")))
    }
}
