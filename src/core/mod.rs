/// The tabular pivot model shared by every converter.
pub mod table;

/// The hierarchical pivot model (node tree with ordered attributes).
pub mod document;

/// Column-path inference over record nodes.
pub mod schema;

/// Record nodes + schema -> table rows.
pub mod flatten;

/// Table rows -> reconstructed node tree.
pub mod unflatten;

/// Shared scalar type inference.
pub mod value;
