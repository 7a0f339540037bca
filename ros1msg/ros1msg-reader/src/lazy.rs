//! On-demand decoding.
//!
//! A [`LazyRecord`] holds the message buffer, its base offset and one
//! memo slot per field (plus one for the end of the record). Accessing a
//! field walks the size chain forward from the nearest known slot, filling
//! in every slot it passes, then decodes only that field. Repeated or
//! in-order access therefore never re-measures a field.

use std::{cell::OnceCell, fmt, sync::Arc};

use bytes::Bytes;
use ros1msg_core::{MessageDefinition, Record, Value};

use crate::{
    codec::{ensure, read_count},
    cursor::Cursor,
    error::{DecodeError, SchemaError},
    plan::{DecodePlan, ElementPlan, FieldPlan, Layout, TypeId},
};

/// Produces [`LazyRecord`]s without decoding anything up front.
#[derive(Debug, Clone)]
pub struct LazyMessageReader {
    plan: Arc<DecodePlan>,
}

impl LazyMessageReader {
    pub fn new(definitions: &[MessageDefinition]) -> Result<Self, SchemaError> {
        Ok(Self::from_plan(Arc::new(DecodePlan::compile(definitions)?)))
    }

    pub fn from_plan(plan: Arc<DecodePlan>) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &Arc<DecodePlan> {
        &self.plan
    }

    /// Encoded length of the message at the start of `buffer`.
    pub fn size(&self, buffer: &[u8]) -> Result<usize, DecodeError> {
        self.plan.type_size(self.plan.root(), buffer, 0)
    }

    /// Wrap `buffer` without reading it. Malformed content surfaces from
    /// the accessor that touches it.
    pub fn read_message(&self, buffer: impl Into<Bytes>) -> LazyRecord {
        LazyRecord::new(Arc::clone(&self.plan), self.plan.root(), buffer.into(), 0)
    }
}

/// A message decoded field by field on access.
///
/// Nested records share the buffer of their parent. A `LazyRecord` can be
/// moved between threads but not shared, since accessors fill its memo
/// slots through `&self`.
#[derive(Clone)]
pub struct LazyRecord {
    plan: Arc<DecodePlan>,
    id: TypeId,
    buf: Bytes,
    base: usize,
    /// `offsets[i]` is the start of field `i`; the last slot is the end.
    offsets: Box<[OnceCell<usize>]>,
}

/// Result of a [`LazyRecord`] accessor.
#[derive(Debug, Clone)]
pub enum LazyValue {
    Value(Value),
    Record(LazyRecord),
    Records(Vec<LazyRecord>),
}

impl LazyRecord {
    fn new(plan: Arc<DecodePlan>, id: TypeId, buf: Bytes, base: usize) -> Self {
        let slots = plan.type_plan(id).fields().len() + 1;
        let offsets: Box<[OnceCell<usize>]> = (0..slots).map(|_| OnceCell::new()).collect();
        let _ = offsets[0].set(base);
        Self {
            plan,
            id,
            buf,
            base,
            offsets,
        }
    }

    fn nested(&self, id: TypeId, base: usize) -> Self {
        Self::new(Arc::clone(&self.plan), id, self.buf.clone(), base)
    }

    pub fn type_name(&self) -> &str {
        self.plan.type_plan(self.id).display_name()
    }

    /// Offset of this record within the buffer it was read from.
    pub fn base_offset(&self) -> usize {
        self.base
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.plan.type_plan(self.id).fields().iter().map(|f| f.name())
    }

    /// Decode the field called `name`.
    pub fn get(&self, name: &str) -> Result<LazyValue, DecodeError> {
        let ty = self.plan.type_plan(self.id);
        let index = ty
            .field_index(name)
            .ok_or_else(|| DecodeError::UnknownField {
                type_name: ty.display_name().to_string(),
                field: name.to_string(),
            })?;
        self.field(index)
    }

    /// Decode the field at `index` in declaration order.
    pub fn field(&self, index: usize) -> Result<LazyValue, DecodeError> {
        self.check_index(index)?;
        let field = &self.plan.type_plan(self.id).fields()[index];
        let offset = self.slot(index)?;
        let (value, end) = self
            .decode_at(field, offset)
            .map_err(|e| e.in_field(field.name()))?;
        if let Some(end) = end {
            let _ = self.offsets[index + 1].set(end);
        }
        Ok(value)
    }

    /// Absolute offset of field `index`, memoized.
    pub fn offset_of(&self, index: usize) -> Result<usize, DecodeError> {
        self.check_index(index)?;
        self.slot(index)
    }

    /// Whether the offset of field `index` is already known.
    pub fn is_offset_cached(&self, index: usize) -> bool {
        self.offsets
            .get(index)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Encoded length of this record.
    pub fn size(&self) -> Result<usize, DecodeError> {
        Ok(self.slot(self.len())? - self.base)
    }

    /// Decode every field, recursively, into an eager [`Record`].
    pub fn to_record(&self) -> Result<Record, DecodeError> {
        let fields = self.plan.type_plan(self.id).fields();
        let mut values = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let value = self
                .field(index)?
                .into_value()
                .map_err(|e| e.in_field(field.name()))?;
            values.push((Arc::clone(field.shared_name()), value));
        }
        Ok(Record::from(values))
    }

    fn check_index(&self, index: usize) -> Result<(), DecodeError> {
        if index < self.len() {
            return Ok(());
        }
        Err(DecodeError::FieldIndex {
            type_name: self.type_name().to_string(),
            index,
            count: self.len(),
        })
    }

    /// Offset stored in slot `index`, computing it and every slot before
    /// it that is still empty.
    fn slot(&self, index: usize) -> Result<usize, DecodeError> {
        if let Some(&offset) = self.offsets[index].get() {
            return Ok(offset);
        }
        let (mut at, mut offset) = (0..index)
            .rev()
            .find_map(|i| self.offsets[i].get().map(|&offset| (i, offset)))
            .unwrap_or((0, self.base));
        let fields = self.plan.type_plan(self.id).fields();
        while at < index {
            let field = &fields[at];
            offset += self
                .plan
                .field_size(field, &self.buf, offset)
                .map_err(|e| e.in_field(field.name()))?;
            at += 1;
            let _ = self.offsets[at].set(offset);
        }
        Ok(offset)
    }

    /// Decode `field` at `offset`, returning its end offset when the
    /// decode had to find it anyway.
    fn decode_at(
        &self,
        field: &FieldPlan,
        offset: usize,
    ) -> Result<(LazyValue, Option<usize>), DecodeError> {
        let ElementPlan::Complex(id) = field.element() else {
            let mut cursor = Cursor::at(self.buf.clone(), offset);
            let value = cursor.read_field(&self.plan, field)?;
            return Ok((LazyValue::Value(value), Some(cursor.offset())));
        };
        let (count, start) = match field.layout() {
            Layout::Single => return Ok((LazyValue::Record(self.nested(id, offset)), None)),
            Layout::Fixed(len) => (len, offset),
            Layout::Dynamic => {
                let count = read_count(&self.buf, offset)?;
                let floor = self.plan.dynamic_array_floor(field.element(), count);
                ensure("array", &self.buf, offset + 4, floor)?;
                (count, offset + 4)
            }
        };

        let min_total = count.saturating_mul(self.plan.type_plan(id).min_size());
        ensure("array", &self.buf, start, min_total)?;

        let mut records = Vec::with_capacity(count.min(self.buf.len() - start));
        let mut end = start;
        for index in 0..count {
            records.push(self.nested(id, end));
            end += self
                .plan
                .type_size(id, &self.buf, end)
                .map_err(|e| e.at_index(index))?;
        }
        Ok((LazyValue::Records(records), Some(end)))
    }
}

impl fmt::Debug for LazyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRecord")
            .field("type", &self.type_name())
            .field("base", &self.base)
            .field("len", &self.buf.len())
            .field(
                "offsets",
                &self.offsets.iter().map(OnceCell::get).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl LazyValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            LazyValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&LazyRecord> {
        match self {
            LazyValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[LazyRecord]> {
        match self {
            LazyValue::Records(records) => Some(records),
            _ => None,
        }
    }

    /// Decode whatever is still lazy into a plain [`Value`].
    pub fn into_value(self) -> Result<Value, DecodeError> {
        match self {
            LazyValue::Value(value) => Ok(value),
            LazyValue::Record(record) => record.to_record().map(Value::Struct),
            LazyValue::Records(records) => records
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    record
                        .to_record()
                        .map(Value::Struct)
                        .map_err(|e| e.at_index(index))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }
}
