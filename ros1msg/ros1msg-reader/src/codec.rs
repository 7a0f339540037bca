//! Builtin ROS1 primitives: widths, scalar decoding and typed arrays.

use bytes::{Buf, Bytes};
use ros1msg_core::{ArrayElement, NumericArray, Time, TypedArray, Value};
use zerocopy::IntoBytes;

use crate::error::BoundsError;

/// Element count below which an unaligned numeric array is decoded one
/// element at a time instead of bulk-copied into an aligned allocation.
///
/// Tunable; the crossover was picked from benchmarks of small arrays.
pub const ELEMENTWISE_ARRAY_THRESHOLD: usize = 10;

/// Fixed-width builtin types of the ROS1 message format.
///
/// `string` is the only variable-width builtin and is handled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Time,
    Duration,
}

impl Builtin {
    /// Look up a builtin by its ROS1 type name, including the legacy
    /// `byte` / `char` aliases.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Builtin::Bool,
            "int8" | "byte" => Builtin::I8,
            "uint8" | "char" => Builtin::U8,
            "int16" => Builtin::I16,
            "uint16" => Builtin::U16,
            "int32" => Builtin::I32,
            "uint32" => Builtin::U32,
            "int64" => Builtin::I64,
            "uint64" => Builtin::U64,
            "float32" => Builtin::F32,
            "float64" => Builtin::F64,
            "time" => Builtin::Time,
            "duration" => Builtin::Duration,
            _ => return None,
        })
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Builtin::Bool => "bool",
            Builtin::I8 => "int8",
            Builtin::U8 => "uint8",
            Builtin::I16 => "int16",
            Builtin::U16 => "uint16",
            Builtin::I32 => "int32",
            Builtin::U32 => "uint32",
            Builtin::I64 => "int64",
            Builtin::U64 => "uint64",
            Builtin::F32 => "float32",
            Builtin::F64 => "float64",
            Builtin::Time => "time",
            Builtin::Duration => "duration",
        }
    }

    /// Encoded width in bytes.
    pub fn width(self) -> usize {
        match self {
            Builtin::Bool | Builtin::I8 | Builtin::U8 => 1,
            Builtin::I16 | Builtin::U16 => 2,
            Builtin::I32 | Builtin::U32 | Builtin::F32 => 4,
            Builtin::I64 | Builtin::U64 | Builtin::F64 | Builtin::Time | Builtin::Duration => 8,
        }
    }

    /// Whether arrays of this type decode to a [`NumericArray`].
    pub fn is_numeric(self) -> bool {
        !matches!(self, Builtin::Bool | Builtin::Time | Builtin::Duration)
    }

    /// Decode one value. The caller guarantees `src` holds at least
    /// [`Self::width`] bytes.
    pub(crate) fn decode(self, src: &mut impl Buf) -> Value {
        match self {
            Builtin::Bool => Value::Bool(src.get_u8() != 0),
            Builtin::I8 => Value::I8(src.get_i8()),
            Builtin::U8 => Value::U8(src.get_u8()),
            Builtin::I16 => Value::I16(src.get_i16_le()),
            Builtin::U16 => Value::U16(src.get_u16_le()),
            Builtin::I32 => Value::I32(src.get_i32_le()),
            Builtin::U32 => Value::U32(src.get_u32_le()),
            Builtin::I64 => Value::I64(src.get_i64_le()),
            Builtin::U64 => Value::U64(src.get_u64_le()),
            Builtin::F32 => Value::F32(src.get_f32_le()),
            Builtin::F64 => Value::F64(src.get_f64_le()),
            Builtin::Time => Value::Time(decode_time(src)),
            Builtin::Duration => Value::Duration(decode_time(src)),
        }
    }
}

fn decode_time(src: &mut impl Buf) -> Time {
    let sec = src.get_u32_le();
    let nsec = src.get_u32_le();
    Time { sec, nsec }
}

/// Bytes left in `buf` from `offset` on.
pub(crate) fn remaining(buf: &[u8], offset: usize) -> usize {
    buf.len().saturating_sub(offset)
}

/// Fail unless `size` bytes are available at `offset`.
pub(crate) fn ensure(
    what: &'static str,
    buf: &[u8],
    offset: usize,
    size: usize,
) -> Result<usize, BoundsError> {
    let available = remaining(buf, offset);
    if size > available {
        return Err(BoundsError::new(
            what,
            offset,
            i64::try_from(size).unwrap_or(i64::MAX),
            available,
        ));
    }
    Ok(size)
}

/// Read the little-endian `uint32` count prefix of a dynamic array.
pub(crate) fn read_count(buf: &[u8], offset: usize) -> Result<usize, BoundsError> {
    ensure("array count", buf, offset, 4)?;
    let mut src = &buf[offset..offset + 4];
    Ok(src.get_u32_le() as usize)
}

/// Read and validate the signed length prefix of a string at `offset`.
///
/// Returns the payload length; the prefix itself adds four more bytes.
pub(crate) fn read_string_len(buf: &[u8], offset: usize) -> Result<usize, BoundsError> {
    ensure("string length", buf, offset, 4)?;
    let mut src = &buf[offset..offset + 4];
    let len = src.get_i32_le();
    let available = remaining(buf, offset + 4);
    match usize::try_from(len) {
        Ok(n) if n <= available => Ok(n),
        _ => Err(BoundsError::new("string", offset, len.into(), available)),
    }
}

/// Decode a numeric array whose encoded bytes are exactly `chunk`.
pub(crate) fn numeric_array(kind: Builtin, chunk: Bytes) -> NumericArray {
    match kind {
        Builtin::I8 => typed_array::<i8>(chunk).into(),
        Builtin::U8 => typed_array::<u8>(chunk).into(),
        Builtin::I16 => typed_array::<i16>(chunk).into(),
        Builtin::U16 => typed_array::<u16>(chunk).into(),
        Builtin::I32 => typed_array::<i32>(chunk).into(),
        Builtin::U32 => typed_array::<u32>(chunk).into(),
        Builtin::I64 => typed_array::<i64>(chunk).into(),
        Builtin::U64 => typed_array::<u64>(chunk).into(),
        Builtin::F32 => typed_array::<f32>(chunk).into(),
        Builtin::F64 => typed_array::<f64>(chunk).into(),
        Builtin::Bool | Builtin::Time | Builtin::Duration => {
            unreachable!("{} is not a numeric array element", kind.type_name())
        }
    }
}

/// Build a typed array over `chunk`, preferring a zero-copy view.
///
/// 1. aligned: view the shared bytes directly;
/// 2. unaligned and short: decode element by element;
/// 3. unaligned and long: one bulk copy into an aligned allocation.
///
/// Big-endian hosts always take the element-wise path.
fn typed_array<T: ArrayElement>(chunk: Bytes) -> TypedArray<T> {
    if cfg!(target_endian = "big") {
        return elementwise(&chunk);
    }
    match TypedArray::try_shared(chunk) {
        Ok(view) => view,
        Err(chunk) if chunk.len() / T::WIDTH < ELEMENTWISE_ARRAY_THRESHOLD => elementwise(&chunk),
        Err(chunk) => {
            // The only copy: `TypedArray::from` takes the `Vec` as is.
            let mut aligned = vec![T::new_zeroed(); chunk.len() / T::WIDTH];
            aligned.as_mut_slice().as_mut_bytes().copy_from_slice(&chunk);
            TypedArray::from(aligned)
        }
    }
}

fn elementwise<T: ArrayElement>(chunk: &[u8]) -> TypedArray<T> {
    chunk.chunks_exact(T::WIDTH).map(T::from_le_slice).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(values: &[f64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// A buffer holding `payload` at an 8-aligned and at an unaligned address.
    fn placements(payload: &[u8]) -> (Bytes, Bytes) {
        let mut raw = vec![0u8; 2 * payload.len() + 32];
        let start = (8 - (raw.as_ptr() as usize % 8)) % 8;
        let odd = start + payload.len().next_multiple_of(8) + 9;
        raw[start..start + payload.len()].copy_from_slice(payload);
        raw[odd..odd + payload.len()].copy_from_slice(payload);
        let bytes = Bytes::from(raw);
        (
            bytes.slice(start..start + payload.len()),
            bytes.slice(odd..odd + payload.len()),
        )
    }

    #[test]
    fn width_table_matches_wire_format() {
        assert_eq!(Builtin::from_type_name("bool").unwrap().width(), 1);
        assert_eq!(Builtin::from_type_name("char"), Some(Builtin::U8));
        assert_eq!(Builtin::from_type_name("byte"), Some(Builtin::I8));
        assert_eq!(Builtin::from_type_name("uint16").unwrap().width(), 2);
        assert_eq!(Builtin::from_type_name("float32").unwrap().width(), 4);
        assert_eq!(Builtin::from_type_name("duration").unwrap().width(), 8);
        assert_eq!(Builtin::from_type_name("string"), None);
    }

    #[test]
    fn time_is_two_little_endian_words() {
        let mut src: &[u8] = &[1, 0, 0, 0, 2, 0, 0, 0];
        assert_eq!(Builtin::Time.decode(&mut src), Value::Time(Time::new(1, 2)));
    }

    #[test]
    fn negative_string_length_is_out_of_bounds() {
        let buf = (-1i32).to_le_bytes();
        let err = read_string_len(&buf, 0).unwrap_err();
        assert_eq!(err.requested, -1);
        assert_eq!(err.what, "string");
    }

    #[test]
    fn string_length_past_end_is_out_of_bounds() {
        let mut buf = 5i32.to_le_bytes().to_vec();
        buf.extend_from_slice(b"abcd");
        let err = read_string_len(&buf, 0).unwrap_err();
        assert_eq!(err.available, 4);
        assert_eq!(read_string_len(&buf[..4], 0).unwrap_err().available, 0);
    }

    #[test]
    fn aligned_array_is_zero_copy() {
        let values = [1.5, -2.0, 3.25];
        let (aligned, _) = placements(&encoded(&values));
        let arr = typed_array::<f64>(aligned.clone());
        assert_eq!(arr.as_slice(), &values);
        if cfg!(target_endian = "little") {
            assert!(arr.is_shared());
            assert_eq!(arr.as_ptr() as usize, aligned.as_ptr() as usize);
        }
    }

    #[test]
    fn unaligned_arrays_match_aligned_values() {
        for len in [0, 1, ELEMENTWISE_ARRAY_THRESHOLD - 1, ELEMENTWISE_ARRAY_THRESHOLD, 40] {
            let values: Vec<f64> = (0..len).map(|i| i as f64 * 0.5 - 3.0).collect();
            let (aligned, unaligned) = placements(&encoded(&values));
            let a = typed_array::<f64>(aligned);
            let u = typed_array::<f64>(unaligned);
            assert_eq!(a, u, "len {len}");
            assert_eq!(u.as_slice(), values.as_slice());
            if len > 0 {
                assert!(!u.is_shared());
            }
        }
    }

    #[test]
    fn bulk_copied_array_is_shared_between_clones() {
        let values: Vec<f64> = (0..ELEMENTWISE_ARRAY_THRESHOLD * 4).map(|i| i as f64).collect();
        let (_, unaligned) = placements(&encoded(&values));
        let arr = typed_array::<f64>(unaligned.clone());
        assert!(!arr.is_shared());
        assert_ne!(arr.as_ptr() as usize, unaligned.as_ptr() as usize);
        assert_eq!(arr.clone().as_ptr(), arr.as_ptr());
        assert_eq!(arr.as_ptr() as usize % align_of::<f64>(), 0);
    }

    #[test]
    fn numeric_array_dispatches_on_kind() {
        let chunk = Bytes::from_static(&[0xff, 0x01]);
        let arr = numeric_array(Builtin::I8, chunk);
        assert_eq!(arr, NumericArray::I8(TypedArray::from(vec![-1i8, 1])));
    }
}
