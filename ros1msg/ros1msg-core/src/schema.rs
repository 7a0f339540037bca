//! Parsed message definitions consumed by the decoder compiler.
//!
//! These mirror the output of a ROS1 `.msg` parser: one [`MessageDefinition`]
//! per type in the concatenated schema, with the unnamed definition being the
//! root message. Text parsing itself happens elsewhere.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One message type of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageDefinition {
    /// Qualified name such as `std_msgs/Header`; `None` marks the root type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Fields and constants in declaration order.
    #[cfg_attr(feature = "serde", serde(rename = "definitions"))]
    pub fields: Vec<FieldDefinition>,
}

impl MessageDefinition {
    /// The unnamed root type of a schema.
    pub fn root(fields: Vec<FieldDefinition>) -> Self {
        Self { name: None, fields }
    }

    /// A named type referenced by complex fields.
    pub fn named(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: Some(name.into()),
            fields,
        }
    }

    pub fn is_root(&self) -> bool {
        self.name.is_none()
    }

    /// Name used in diagnostics; the root type renders as `<root>`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<root>")
    }
}

/// A single field or constant of a [`MessageDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FieldDefinition {
    pub name: String,
    /// Builtin type name (`uint32`, `string`, `time`, ...) or, for complex
    /// fields, a reference to another definition (`Header`, `geometry_msgs/Point`).
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_array: bool,
    /// Element count of a fixed-length array; `None` with `is_array` means dynamic.
    #[cfg_attr(feature = "serde", serde(default))]
    pub array_length: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_complex: bool,
    /// Constants occupy no bytes on the wire.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_constant: bool,
    /// Source text of a constant's value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value_text: Option<String>,
}

impl FieldDefinition {
    /// A builtin-typed field (`uint8`, `string`, `time`, ...).
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// A field whose type is another message definition.
    pub fn complex(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            is_complex: true,
            ..Self::new(name, type_name)
        }
    }

    /// A constant declaration such as `uint8 DEBUG=1`.
    pub fn constant(
        name: impl Into<String>,
        type_name: impl Into<String>,
        value_text: impl Into<String>,
    ) -> Self {
        Self {
            is_constant: true,
            value_text: Some(value_text.into()),
            ..Self::new(name, type_name)
        }
    }

    /// Turn this field into a dynamic array (`T[]`).
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self.array_length = None;
        self
    }

    /// Turn this field into a fixed-length array (`T[len]`).
    pub fn fixed_array(mut self, len: usize) -> Self {
        self.is_array = true;
        self.array_length = Some(len);
        self
    }
}
