//! Schema and value types shared by the `ros1msg` decoders.
//!
//! This crate holds the already-parsed schema input
//! ([`MessageDefinition`] / [`FieldDefinition`]) and the decoded value tree
//! ([`Value`] / [`Record`] / [`NumericArray`]) produced by `ros1msg-reader`.
//! It knows nothing about the wire format itself.

mod error;
mod numeric_array;
mod record;
mod schema;
#[cfg(feature = "serde")]
mod serialize;
mod value;

pub use error::ValueError;
pub use numeric_array::{ArrayElement, NumericArray, TypedArray};
pub use record::Record;
pub use schema::{FieldDefinition, MessageDefinition};
pub use value::{Time, Value};
