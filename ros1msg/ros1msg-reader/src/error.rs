//! Error types for decoder compilation and message decoding.

use std::str::Utf8Error;

/// The schema cannot be compiled into a decoder.
///
/// Raised by [`DecodePlan::compile`](crate::DecodePlan::compile) before any
/// buffer is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("no message definitions given")]
    Empty,

    #[error("expected exactly one unnamed root definition, found {0}")]
    RootCount(usize),

    #[error("unresolved type '{type_name}' for field '{field}' in {owner}")]
    UnresolvedType {
        owner: String,
        field: String,
        type_name: String,
    },

    #[error("ambiguous type '{type_name}' for field '{field}' in {owner}: matches {}", .candidates.join(", "))]
    AmbiguousType {
        owner: String,
        field: String,
        type_name: String,
        candidates: Vec<String>,
    },

    #[error("field '{field}' in {owner} has type '{type_name}', which is not a builtin type")]
    UnknownBuiltin {
        owner: String,
        field: String,
        type_name: String,
    },

    #[error("type '{type_name}' contains itself")]
    RecursiveType { type_name: String },
}

/// A length, count or size would read outside the buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{what} at offset {offset} (field `{path}`) requests {requested} bytes but {available} remain"
)]
pub struct BoundsError {
    /// Construct being read, e.g. `string` or `array count`.
    pub what: &'static str,
    /// Absolute offset of the construct in the buffer.
    pub offset: usize,
    /// Requested byte count; negative for a negative length prefix.
    pub requested: i64,
    pub available: usize,
    /// Field path such as `points[2].x`, filled in while the error propagates.
    pub path: String,
}

impl BoundsError {
    pub(crate) fn new(what: &'static str, offset: usize, requested: i64, available: usize) -> Self {
        Self {
            what,
            offset,
            requested,
            available,
            path: String::new(),
        }
    }
}

/// A message buffer cannot be decoded with the compiled schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error("invalid UTF-8 in string at offset {offset} (field `{path}`): {source}")]
    InvalidUtf8 {
        offset: usize,
        path: String,
        #[source]
        source: Utf8Error,
    },

    #[error("{type_name} has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    #[error("field index {index} out of range for {type_name} with {count} fields")]
    FieldIndex {
        type_name: String,
        index: usize,
        count: usize,
    },
}

impl DecodeError {
    pub fn is_bounds(&self) -> bool {
        matches!(self, DecodeError::Bounds(_))
    }

    /// Prefix the error's field path with the enclosing field name.
    pub(crate) fn in_field(self, name: &str) -> Self {
        self.map_path(|path| {
            if path.is_empty() {
                name.to_string()
            } else if path.starts_with('[') {
                format!("{name}{path}")
            } else {
                format!("{name}.{path}")
            }
        })
    }

    /// Prefix the error's field path with an array index.
    pub(crate) fn at_index(self, index: usize) -> Self {
        self.map_path(|path| {
            if path.is_empty() || path.starts_with('[') {
                format!("[{index}]{path}")
            } else {
                format!("[{index}].{path}")
            }
        })
    }

    fn map_path(mut self, f: impl FnOnce(&str) -> String) -> Self {
        match &mut self {
            DecodeError::Bounds(BoundsError { path, .. })
            | DecodeError::InvalidUtf8 { path, .. } => {
                let updated = f(path);
                *path = updated;
            }
            DecodeError::UnknownField { .. } | DecodeError::FieldIndex { .. } => {}
        }
        self
    }
}
