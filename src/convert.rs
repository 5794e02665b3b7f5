//! Statically dispatched conversion facade over in-memory strings.
//!
//! The (source, target) matrix is closed: sources and targets are enum
//! variants, each target carrying its typed options record, and every
//! pairing is resolved at compile time. A conversion parses the input
//! into the matching pivot model, bridges to the other model through the
//! flattening core when the target needs it, and hands the model to the
//! target emitter.

#[cfg(all(feature = "csv", feature = "xml"))]
use crate::core::flatten::{flatten_records, FlattenOptions};
#[cfg(all(feature = "csv", feature = "xml"))]
use crate::core::schema::{infer_schema, SchemaOptions};

#[cfg(feature = "csv")]
use crate::core::table::Table;
#[cfg(feature = "xml")]
use crate::core::document::Document;
use crate::error::ConversionError;

#[cfg(feature = "csv")]
use crate::format::csv::{self, CsvTableReaderBuilder, CsvWriteOptions};
#[cfg(feature = "json")]
use crate::format::json::{self, JsonOptions};
#[cfg(feature = "xml")]
use crate::format::xml::{self, XmlWriteOptions};
#[cfg(feature = "yaml")]
use crate::format::yaml::{self, YamlOptions};

#[cfg(feature = "document")]
use crate::render::{self, RenderOptions, TableRenderer};

/// The input format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    #[cfg(feature = "csv")]
    Csv,
    #[cfg(feature = "xml")]
    Xml,
}

/// The output format of a conversion, with its options record.
#[derive(Debug, Clone)]
pub enum TargetOptions {
    #[cfg(feature = "csv")]
    Csv(CsvWriteOptions),
    #[cfg(feature = "json")]
    Json(JsonOptions),
    #[cfg(feature = "xml")]
    Xml(XmlWriteOptions),
    #[cfg(feature = "yaml")]
    Yaml(YamlOptions),
}

/// One of the two pivot models, depending on what the source parses to.
enum Model {
    #[cfg(feature = "csv")]
    Table(Table),
    #[cfg(feature = "xml")]
    Document(Document),
}

/// Converts an in-memory string between formats.
///
/// # Examples
///
/// ```
/// use datamorph_rs::convert::{convert_str, Source, TargetOptions};
/// use datamorph_rs::format::json::JsonOptions;
///
/// let csv = "Name,Age\nJohn,30";
/// let options = JsonOptions { pretty: false, ..JsonOptions::default() };
///
/// let json = convert_str(csv, Source::Csv, &TargetOptions::Json(options)).unwrap();
/// assert_eq!(json, r#"[{"Name":"John","Age":30}]"#);
/// ```
pub fn convert_str(
    input: &str,
    source: Source,
    target: &TargetOptions,
) -> Result<String, ConversionError> {
    write_model(read_model(input, source)?, target)
}

/// Converts an in-memory string into renderer-bound document bytes
/// (PDF, Word, ... — the renderer decides).
#[cfg(feature = "document")]
pub fn render_str(
    input: &str,
    source: Source,
    options: &RenderOptions,
    renderer: &dyn TableRenderer,
) -> Result<Vec<u8>, ConversionError> {
    let export = match read_model(input, source)? {
        #[cfg(feature = "csv")]
        Model::Table(table) => render::prepare_table(&table, options)?,
        #[cfg(feature = "xml")]
        Model::Document(document) => render::prepare_document(&document, options)?,
    };
    renderer.render(&export, options)
}

fn read_model(input: &str, source: Source) -> Result<Model, ConversionError> {
    match source {
        #[cfg(feature = "csv")]
        Source::Csv => Ok(Model::Table(CsvTableReaderBuilder::new().from_str(input)?)),
        #[cfg(feature = "xml")]
        Source::Xml => Ok(Model::Document(xml::reader::read_str(input)?)),
    }
}

fn write_model(model: Model, target: &TargetOptions) -> Result<String, ConversionError> {
    match target {
        #[cfg(feature = "csv")]
        TargetOptions::Csv(options) => match model {
            Model::Table(table) => csv::writer::write_table(&table, options),
            #[cfg(feature = "xml")]
            Model::Document(document) => {
                csv::writer::write_table(&flatten_document(&document)?, options)
            }
        },
        #[cfg(feature = "json")]
        TargetOptions::Json(options) => match model {
            #[cfg(feature = "csv")]
            Model::Table(table) => json::table_to_json(&table, options),
            #[cfg(feature = "xml")]
            Model::Document(document) => json::document_to_json(&document, options),
        },
        #[cfg(feature = "xml")]
        TargetOptions::Xml(options) => match model {
            #[cfg(feature = "csv")]
            Model::Table(table) => xml::writer::write_table(&table, options),
            Model::Document(document) => xml::writer::write_document(&document, options),
        },
        #[cfg(feature = "yaml")]
        TargetOptions::Yaml(options) => match model {
            #[cfg(feature = "csv")]
            Model::Table(table) => yaml::table_to_yaml(&table, options),
            #[cfg(feature = "xml")]
            Model::Document(document) => yaml::document_to_yaml(&document, options),
        },
        // With no format feature enabled, `TargetOptions` has no variants
        // and cannot be constructed, so this arm only exists to make the
        // vacuous match exhaustive.
        #[cfg(not(any(
            feature = "csv",
            feature = "json",
            feature = "xml",
            feature = "yaml"
        )))]
        _ => unreachable!("TargetOptions has no variants without a format feature"),
    }
}

/// Bridges a document to the tabular model: infer the schema over its
/// records, then flatten.
#[cfg(all(feature = "csv", feature = "xml"))]
fn flatten_document(document: &Document) -> Result<Table, ConversionError> {
    let records = document.records();
    let schema = infer_schema(&records, &SchemaOptions::default())?;
    flatten_records(&records, &schema, &FlattenOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_to_xml_elements() {
        let xml = convert_str(
            "Name,Age\nJohn,30\nJane,25",
            Source::Csv,
            &TargetOptions::Xml(XmlWriteOptions {
                declaration: false,
                indent: false,
                ..XmlWriteOptions::default()
            }),
        )
        .unwrap();

        assert_eq!(
            xml,
            "<root><row><Name>John</Name><Age>30</Age></row>\
             <row><Name>Jane</Name><Age>25</Age></row></root>"
        );
    }

    #[test]
    fn xml_attributes_to_csv() {
        let csv = convert_str(
            r#"<root><element Name="John" Age="30"/></root>"#,
            Source::Xml,
            &TargetOptions::Csv(CsvWriteOptions::default()),
        )
        .unwrap();

        assert_eq!(csv, "@Age,@Name\n30,John\n");
    }

    #[test]
    fn nested_xml_to_csv_flattens_dotted_paths() {
        let csv = convert_str(
            "<root>\
                <person><Name>John</Name><Details><Age>30</Age></Details></person>\
                <person><Name>Jane</Name></person>\
             </root>",
            Source::Xml,
            &TargetOptions::Csv(CsvWriteOptions::default()),
        )
        .unwrap();

        assert_eq!(csv, "Details.Age,Name\n30,John\n,Jane\n");
    }

    #[test]
    fn csv_to_grouped_json() {
        let json = convert_str(
            "Name,City\nJohn,Paris\nJane,Oslo\nJim,Paris",
            Source::Csv,
            &TargetOptions::Json(JsonOptions {
                pretty: false,
                group_by: Some("City".to_string()),
                ..JsonOptions::default()
            }),
        )
        .unwrap();

        assert_eq!(
            json,
            r#"{"Paris":[{"Name":"John"},{"Name":"Jim"}],"Oslo":[{"Name":"Jane"}]}"#
        );
    }

    #[test]
    fn xml_to_yaml() {
        let yaml = convert_str(
            "<config><host>localhost</host><port>8080</port></config>",
            Source::Xml,
            &TargetOptions::Yaml(YamlOptions::default()),
        )
        .unwrap();

        assert_eq!(yaml, "config:\n  host: localhost\n  port: 8080\n");
    }

    #[test]
    fn invalid_input_propagates() {
        let result = convert_str(
            "",
            Source::Csv,
            &TargetOptions::Json(JsonOptions::default()),
        );
        assert!(matches!(result, Err(ConversionError::InvalidInput(_))));
    }

    #[test]
    fn renderers_see_flattened_documents() {
        use crate::render::TableExport;

        struct HeaderRenderer;
        impl TableRenderer for HeaderRenderer {
            fn render(
                &self,
                export: &TableExport,
                _options: &RenderOptions,
            ) -> Result<Vec<u8>, ConversionError> {
                Ok(export.headers.join("|").into_bytes())
            }
        }

        let bytes = render_str(
            r#"<root><row id="1"><Name>John</Name></row></root>"#,
            Source::Xml,
            &RenderOptions::default(),
            &HeaderRenderer,
        )
        .unwrap();
        assert_eq!(bytes, b"@id|Name");
    }
}
