//! Typed numeric arrays that may borrow directly from the message buffer.

use std::{fmt, ops::Deref, sync::Arc};

use bytes::Bytes;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Element types that can back a [`TypedArray`].
///
/// Implemented for the fixed-width numeric primitives of the ROS1 format.
pub trait ArrayElement:
    FromBytes
    + IntoBytes
    + Immutable
    + KnownLayout
    + Copy
    + PartialEq
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
    /// Encoded width in bytes.
    const WIDTH: usize = size_of::<Self>();

    /// Decode one little-endian element from exactly [`Self::WIDTH`] bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_array_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ArrayElement for $ty {
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_array_element!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

#[derive(Clone)]
enum Storage<T> {
    /// Aligned window into the shared message buffer.
    Shared(Bytes),
    /// Keeps the `Vec` it was built from, so no element is copied twice.
    Owned(Arc<Vec<T>>),
}

/// An immutable `[T]` that is either a zero-copy view into a shared buffer or
/// an owned allocation.
///
/// Cloning is cheap in both cases.
#[derive(Clone)]
pub struct TypedArray<T: ArrayElement> {
    storage: Storage<T>,
}

impl<T: ArrayElement> TypedArray<T> {
    /// Borrow `bytes` as `[T]` without copying.
    ///
    /// Fails, handing the bytes back, when the data is not aligned for `T` or
    /// its length is not a multiple of the element width. The bytes are read
    /// in native byte order, so callers must only use this on little-endian
    /// hosts for little-endian data.
    pub fn try_shared(bytes: Bytes) -> Result<Self, Bytes> {
        if <[T]>::ref_from_bytes(&bytes).is_ok() {
            Ok(Self {
                storage: Storage::Shared(bytes),
            })
        } else {
            Err(bytes)
        }
    }

    /// Whether the elements live in the message buffer itself.
    pub fn is_shared(&self) -> bool {
        matches!(self.storage, Storage::Shared(_))
    }

    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            Storage::Shared(bytes) => match <[T]>::ref_from_bytes(bytes) {
                Ok(slice) => slice,
                Err(_) => unreachable!("shared storage is validated on construction"),
            },
            Storage::Owned(values) => values.as_slice(),
        }
    }
}

impl<T: ArrayElement> Deref for TypedArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: ArrayElement> From<Vec<T>> for TypedArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self {
            storage: Storage::Owned(Arc::new(values)),
        }
    }
}

impl<T: ArrayElement> FromIterator<T> for TypedArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl<T: ArrayElement> PartialEq for TypedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: ArrayElement> fmt::Debug for TypedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// A typed array of one of the numeric ROS1 primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericArray {
    I8(TypedArray<i8>),
    U8(TypedArray<u8>),
    I16(TypedArray<i16>),
    U16(TypedArray<u16>),
    I32(TypedArray<i32>),
    U32(TypedArray<u32>),
    I64(TypedArray<i64>),
    U64(TypedArray<u64>),
    F32(TypedArray<f32>),
    F64(TypedArray<f64>),
}

macro_rules! for_each_array {
    ($self:expr, $arr:ident => $body:expr) => {
        match $self {
            NumericArray::I8($arr) => $body,
            NumericArray::U8($arr) => $body,
            NumericArray::I16($arr) => $body,
            NumericArray::U16($arr) => $body,
            NumericArray::I32($arr) => $body,
            NumericArray::U32($arr) => $body,
            NumericArray::I64($arr) => $body,
            NumericArray::U64($arr) => $body,
            NumericArray::F32($arr) => $body,
            NumericArray::F64($arr) => $body,
        }
    };
}

impl NumericArray {
    pub fn len(&self) -> usize {
        for_each_array!(self, arr => arr.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the elements are a zero-copy view into the message buffer.
    pub fn is_shared(&self) -> bool {
        for_each_array!(self, arr => arr.is_shared())
    }

    /// ROS1 name of the element type.
    pub fn element_type_name(&self) -> &'static str {
        match self {
            NumericArray::I8(_) => "int8",
            NumericArray::U8(_) => "uint8",
            NumericArray::I16(_) => "int16",
            NumericArray::U16(_) => "uint16",
            NumericArray::I32(_) => "int32",
            NumericArray::U32(_) => "uint32",
            NumericArray::I64(_) => "int64",
            NumericArray::U64(_) => "uint64",
            NumericArray::F32(_) => "float32",
            NumericArray::F64(_) => "float64",
        }
    }
}

macro_rules! impl_from_typed_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<TypedArray<$ty>> for NumericArray {
                fn from(value: TypedArray<$ty>) -> Self {
                    NumericArray::$variant(value)
                }
            }
        )*
    };
}

impl_from_typed_array!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);
