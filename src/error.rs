use thiserror::Error;

#[derive(Error, Debug)]
/// Conversion error
pub enum ConversionError {
    /// Unusable input: empty header set, empty record-node set, or a
    /// requested group-by/sort-by column that is absent from the headers.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Conflicting dotted-path bindings while rebuilding a hierarchy,
    /// e.g. headers `a` and `a.b` both present. Surfaced, never silently
    /// resolved.
    #[error("structural ambiguity: {0}")]
    StructuralAmbiguity(String),

    #[error("reader: {0}")]
    Reader(String),

    #[error("writer: {0}")]
    Writer(String),
}
