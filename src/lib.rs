#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Datamorph for Rust

 A toolkit for converting tabular and hierarchical data between CSV, XML,
 JSON, YAML and table-document renderers (PDF, Word). The crate pivots
 every conversion through two canonical in-memory models and a shared
 flattening core, so each output format only has to understand one shape.

 ## Core Concepts

 Understanding these core components will help you get started:

 - **Table:** the tabular pivot model. An ordered list of column headers plus
   ordered rows of string cells. Built by the CSV reader or the flattener,
   consumed read-only by every emitter.
 - **Document / Node:** the hierarchical pivot model. A tree of named nodes
   with ordered attributes, ordered children, optional leaf text and a
   CDATA marker for content that must round-trip verbatim.
 - **Schema inference:** derives a deterministic, alphabetically sorted list
   of dotted column paths (`Details.Age`, `@id`) from a document's record
   nodes.
 - **Flatten / Unflatten:** the bidirectional bridge between the two models.
   Flattening resolves each column path against each record node;
   unflattening rebuilds nested nodes from dotted headers.
 - **Value typing:** one strict precedence (date, integer, float, boolean,
   null, string) applied identically by the JSON, YAML and typed-XML
   emitters.

 ## Features

 The crate is modular, allowing you to enable only the formats you need:

 | **Feature** | **Description**                                       |
 |-------------|-------------------------------------------------------|
 | csv         | CSV reader (delimiter auto-detection) and writer      |
 | json        | JSON emitters for tables and documents                |
 | xml         | XML reader (with tolerant fallback) and writer        |
 | yaml        | YAML emitters for tables and documents                |
 | document    | Renderer seam for PDF/Word style table documents      |
 | full        | Enables all available features                        |

 ## Getting Started

 Make sure you activated the suitable features on Cargo.toml:

 ```toml
 [dependencies]
 datamorph-rs = { version = "<version>", features = ["full"] }
 ```

 Then converting a CSV string into elements-style XML takes a reader, an
 options record and one call:

 ```rust
 use datamorph_rs::convert::{convert_str, Source, TargetOptions};
 use datamorph_rs::format::xml::XmlWriteOptions;
 use datamorph_rs::error::ConversionError;

 fn main() -> Result<(), ConversionError> {
     let csv = "Name,Age\nJohn,30\nJane,25";

     let options = XmlWriteOptions {
         declaration: false,
         ..XmlWriteOptions::default()
     };

     let xml = convert_str(csv, Source::Csv, &TargetOptions::Xml(options))?;

     assert!(xml.contains("<Name>John</Name>"));
     assert!(xml.contains("<Age>25</Age>"));
     Ok(())
 }
 ```

 ## License

 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Canonical data models and the flattening/typing core
pub mod core;

/// Error types for conversions
pub mod error;

#[doc(inline)]
pub use error::*;

/// Per-format readers and emitters (CSV, XML, JSON, YAML)
pub mod format;

/// Renderer seam for table documents (PDF, Word)
#[cfg(feature = "document")]
pub mod render;

/// Statically dispatched conversion facade over in-memory strings
pub mod convert;
