//! Schema-driven decoders for the ROS1 message wire format.
//!
//! A schema (a list of [`MessageDefinition`](ros1msg_core::MessageDefinition)s
//! with one unnamed root) is compiled once into a [`DecodePlan`]:
//!
//! ```text
//! definitions ──compile──▶ DecodePlan ─┬─▶ MessageReader      ──▶ Record
//!                                      └─▶ LazyMessageReader  ──▶ LazyRecord
//! ```
//!
//! - [`MessageReader`] decodes a whole message into a [`Record`](ros1msg_core::Record).
//! - [`LazyMessageReader`] wraps the buffer in a [`LazyRecord`] and decodes
//!   a field only when it is accessed.
//!
//! Both readers share the same plan and produce equal values. Numeric
//! arrays are zero-copy views into the input [`Bytes`](bytes::Bytes) when the
//! data happens to be aligned for the element type.

mod codec;
mod cursor;
mod eager;
mod error;
mod lazy;
mod plan;
mod resolver;
mod size;

pub use codec::{Builtin, ELEMENTWISE_ARRAY_THRESHOLD};
pub use eager::{MessageReader, ReaderOptions};
pub use error::{BoundsError, DecodeError, SchemaError};
pub use lazy::{LazyMessageReader, LazyRecord, LazyValue};
pub use plan::{DecodePlan, ElementPlan, FieldPlan, Layout, TypeId, TypePlan};
