//! Error types for the value layer.

/// Error returned by typed [`Value`](crate::Value) accessors and by mutation
/// of a [`Record`](crate::Record).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The value holds a different variant than the accessor asked for.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The record was frozen after decoding and rejects mutation.
    #[error("cannot modify field '{field}' of a frozen record")]
    Frozen { field: String },
}
