/// Tolerant CSV reading with delimiter auto-detection.
pub mod reader;

/// CSV rendering with configurable quoting.
pub mod writer;

pub use reader::CsvTableReaderBuilder;
pub use writer::CsvWriteOptions;
