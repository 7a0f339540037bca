//! Forward-only decoder over a shared message buffer.
//!
//! Both readers decode through a [`Cursor`]: the eager reader walks one
//! cursor over the whole message, the lazy reader opens a fresh cursor at
//! each field's memoized offset. Offsets are absolute positions in the
//! buffer so errors point at the same byte regardless of which reader ran.

use std::sync::Arc;

use bytes::Bytes;
use ros1msg_core::{Record, Value};

use crate::{
    codec::{self, Builtin, ensure, read_count, read_string_len},
    error::{BoundsError, DecodeError},
    plan::{DecodePlan, ElementPlan, FieldPlan, Layout, TypeId},
};

pub(crate) struct Cursor {
    buf: Bytes,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(buf: Bytes) -> Self {
        Self { buf, pos: 0 }
    }

    /// Cursor positioned at `offset`, which must not lie past the end.
    pub(crate) fn at(buf: Bytes, offset: usize) -> Self {
        debug_assert!(offset <= buf.len());
        Self { buf, pos: offset }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    fn require(&self, what: &'static str, size: usize) -> Result<(), BoundsError> {
        ensure(what, &self.buf, self.pos, size).map(drop)
    }

    fn take(&mut self, len: usize) -> Bytes {
        let chunk = self.buf.slice(self.pos..self.pos + len);
        self.pos += len;
        chunk
    }

    fn scalar(&mut self, builtin: Builtin) -> Result<Value, DecodeError> {
        let width = builtin.width();
        self.require(builtin.type_name(), width)?;
        let value = builtin.decode(&mut &self.buf[self.pos..self.pos + width]);
        self.pos += width;
        Ok(value)
    }

    fn string(&mut self) -> Result<Value, DecodeError> {
        let start = self.pos;
        let len = read_string_len(&self.buf, start)?;
        self.pos += 4;
        let chunk = self.take(len);
        match std::str::from_utf8(&chunk) {
            Ok(s) => Ok(Value::String(Arc::from(s))),
            Err(source) => Err(DecodeError::InvalidUtf8 {
                offset: start,
                path: String::new(),
                source,
            }),
        }
    }

    fn count(&mut self) -> Result<usize, DecodeError> {
        let count = read_count(&self.buf, self.pos)?;
        self.pos += 4;
        Ok(count)
    }

    fn numeric_array(&mut self, kind: Builtin, count: usize) -> Result<Value, DecodeError> {
        let total = count.checked_mul(kind.width()).unwrap_or(usize::MAX);
        self.require("array", total)?;
        Ok(Value::NumericArray(codec::numeric_array(kind, self.take(total))))
    }

    /// Decode a whole value of type `id`.
    pub(crate) fn read_record(
        &mut self,
        plan: &DecodePlan,
        id: TypeId,
    ) -> Result<Record, DecodeError> {
        let ty = plan.type_plan(id);
        let mut fields = Vec::with_capacity(ty.fields().len());
        for field in ty.fields() {
            let value = self
                .read_field(plan, field)
                .map_err(|e| e.in_field(field.name()))?;
            fields.push((Arc::clone(field.shared_name()), value));
        }
        Ok(Record::from(fields))
    }

    /// Decode one field. Errors carry a path relative to the field.
    pub(crate) fn read_field(
        &mut self,
        plan: &DecodePlan,
        field: &FieldPlan,
    ) -> Result<Value, DecodeError> {
        let element = field.element();
        match field.layout() {
            Layout::Single => self.read_element(plan, element),
            Layout::Fixed(len) => self.read_elements(plan, element, len),
            Layout::Dynamic => {
                let count = self.count()?;
                self.require("array", plan.dynamic_array_floor(element, count))?;
                self.read_elements(plan, element, count)
            }
        }
    }

    fn read_element(
        &mut self,
        plan: &DecodePlan,
        element: ElementPlan,
    ) -> Result<Value, DecodeError> {
        match element {
            ElementPlan::Scalar(builtin) => self.scalar(builtin),
            ElementPlan::String => self.string(),
            ElementPlan::Complex(id) => self.read_record(plan, id).map(Value::Struct),
        }
    }

    fn read_elements(
        &mut self,
        plan: &DecodePlan,
        element: ElementPlan,
        count: usize,
    ) -> Result<Value, DecodeError> {
        if let ElementPlan::Scalar(builtin) = element
            && builtin.is_numeric()
        {
            return self.numeric_array(builtin, count);
        }

        let min_total = count.saturating_mul(plan.element_min_size(element));
        self.require("array", min_total)?;

        // A fixed array of zero-width elements is not bounded by the buffer.
        let mut items = Vec::with_capacity(count.min(self.buf.len() - self.pos));
        for index in 0..count {
            items.push(
                self.read_element(plan, element)
                    .map_err(|e| e.at_index(index))?,
            );
        }
        Ok(Value::Array(items))
    }
}
