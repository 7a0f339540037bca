//! `serde` output of decoded values as plain JSON-like trees.
//!
//! Records become maps in field order, `time`/`duration` become
//! `{ "sec", "nsec" }` maps and every array becomes a sequence.

use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};

use crate::{
    numeric_array::{ArrayElement, NumericArray, TypedArray},
    record::Record,
    value::Value,
};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Time(v) | Value::Duration(v) => v.serialize(serializer),
            Value::NumericArray(v) => v.serialize(serializer),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Struct(record) => record.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<T: ArrayElement + Serialize> Serialize for TypedArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

impl Serialize for NumericArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NumericArray::I8(arr) => arr.serialize(serializer),
            NumericArray::U8(arr) => arr.serialize(serializer),
            NumericArray::I16(arr) => arr.serialize(serializer),
            NumericArray::U16(arr) => arr.serialize(serializer),
            NumericArray::I32(arr) => arr.serialize(serializer),
            NumericArray::U32(arr) => arr.serialize(serializer),
            NumericArray::I64(arr) => arr.serialize(serializer),
            NumericArray::U64(arr) => arr.serialize(serializer),
            NumericArray::F32(arr) => arr.serialize(serializer),
            NumericArray::F64(arr) => arr.serialize(serializer),
        }
    }
}
