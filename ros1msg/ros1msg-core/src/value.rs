//! Decoded value tree produced by the message readers.

use std::sync::Arc;

use crate::{error::ValueError, numeric_array::NumericArray, record::Record};

/// A ROS1 `time` or `duration`: two little-endian `uint32`s on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    pub sec: u32,
    pub nsec: u32,
}

impl Time {
    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }
}

/// Value of one decoded field.
///
/// Arrays of numeric primitives keep their element type as a
/// [`NumericArray`]; every other array is a plain [`Value::Array`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Arc<str>),
    Time(Time),
    Duration(Time),
    NumericArray(NumericArray),
    Array(Vec<Value>),
    Struct(Record),
}

macro_rules! copy_accessors {
    ($($name:ident => $variant:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Result<$ty, ValueError> {
                match self {
                    Value::$variant(v) => Ok(*v),
                    _ => Err(self.type_mismatch(stringify!($variant))),
                }
            }
        )*
    };
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    copy_accessors!(
        try_bool => Bool: bool,
        try_i8 => I8: i8,
        try_i16 => I16: i16,
        try_i32 => I32: i32,
        try_i64 => I64: i64,
        try_u8 => U8: u8,
        try_u16 => U16: u16,
        try_u32 => U32: u32,
        try_u64 => U64: u64,
        try_f32 => F32: f32,
        try_f64 => F64: f64,
        try_time => Time: Time,
        try_duration => Duration: Time,
    );

    pub fn try_str(&self) -> Result<&str, ValueError> {
        match self {
            Value::String(v) => Ok(v),
            _ => Err(self.type_mismatch("String")),
        }
    }

    pub fn try_numeric_array(&self) -> Result<&NumericArray, ValueError> {
        match self {
            Value::NumericArray(v) => Ok(v),
            _ => Err(self.type_mismatch("NumericArray")),
        }
    }

    pub fn try_array(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::Array(v) => Ok(v),
            _ => Err(self.type_mismatch("Array")),
        }
    }

    pub fn try_record(&self) -> Result<&Record, ValueError> {
        match self {
            Value::Struct(v) => Ok(v),
            _ => Err(self.type_mismatch("Struct")),
        }
    }

    pub fn type_mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            actual: self.variant_name(),
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::I8(_) => "I8",
            Value::I16(_) => "I16",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::U8(_) => "U8",
            Value::U16(_) => "U16",
            Value::U32(_) => "U32",
            Value::U64(_) => "U64",
            Value::F32(_) => "F32",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Time(_) => "Time",
            Value::Duration(_) => "Duration",
            Value::NumericArray(_) => "NumericArray",
            Value::Array(_) => "Array",
            Value::Struct(_) => "Struct",
        }
    }

    /// Freeze every record reachable from this value.
    pub(crate) fn freeze(&mut self) {
        match self {
            Value::Struct(record) => record.freeze(),
            Value::Array(items) => items.iter_mut().for_each(Value::freeze),
            _ => {}
        }
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Struct(value)
    }
}

impl From<NumericArray> for Value {
    fn from(value: NumericArray) -> Self {
        Value::NumericArray(value)
    }
}
