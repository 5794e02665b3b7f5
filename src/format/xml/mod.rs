/// Event-based XML reading with a tolerant fallback.
pub mod reader;

/// XML rendering for tables and documents.
pub mod writer;

pub use reader::read_str;
pub use writer::{XmlFormat, XmlWriteOptions};
