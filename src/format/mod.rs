/// Key/element naming conventions and XML name sanitization.
pub mod naming;

#[cfg(feature = "json")]
pub(crate) mod tree;

#[cfg(feature = "csv")]
/// CSV reading (delimiter auto-detection) and writing.
pub mod csv;

#[cfg(feature = "json")]
/// JSON emitters for tables and documents.
pub mod json;

#[cfg(feature = "xml")]
/// XML reading (with tolerant fallback) and writing.
pub mod xml;

#[cfg(feature = "yaml")]
/// YAML emitters for tables and documents.
pub mod yaml;
