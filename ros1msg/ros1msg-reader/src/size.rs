//! Encoded-size computation without materializing values.
//!
//! Sizes come from the compiled plan where they are constant; otherwise
//! only the length prefixes are read. Every prefix is checked against the
//! buffer, so a size returned here is always in bounds.

use crate::{
    codec::{ensure, read_count, read_string_len},
    error::DecodeError,
    plan::{DecodePlan, ElementPlan, FieldPlan, Layout, TypeId},
};

impl DecodePlan {
    /// Encoded size of a value of type `id` starting at `offset`.
    pub(crate) fn type_size(
        &self,
        id: TypeId,
        buf: &[u8],
        offset: usize,
    ) -> Result<usize, DecodeError> {
        let ty = self.type_plan(id);
        if let Some(size) = ty.fixed_size() {
            return Ok(ensure("message", buf, offset, size)?);
        }
        let mut end = offset;
        for field in ty.fields() {
            end += self
                .field_size(field, buf, end)
                .map_err(|e| e.in_field(field.name()))?;
        }
        Ok(end - offset)
    }

    /// Encoded size of one field starting at `offset`.
    pub(crate) fn field_size(
        &self,
        field: &FieldPlan,
        buf: &[u8],
        offset: usize,
    ) -> Result<usize, DecodeError> {
        if let Some(size) = field.fixed_size() {
            return Ok(ensure("field", buf, offset, size)?);
        }
        let element = field.element();
        match field.layout() {
            Layout::Single => self.element_size(element, buf, offset),
            Layout::Fixed(len) => self.elements_size(element, len, buf, offset),
            Layout::Dynamic => {
                let count = read_count(buf, offset)?;
                Ok(4 + self.dynamic_elements_size(element, count, buf, offset + 4)?)
            }
        }
    }

    fn dynamic_elements_size(
        &self,
        element: ElementPlan,
        count: usize,
        buf: &[u8],
        offset: usize,
    ) -> Result<usize, DecodeError> {
        // Reject absurd counts before walking them one by one.
        ensure("array", buf, offset, self.dynamic_array_floor(element, count))?;
        if let Some(width) = self.element_width(element) {
            let total = count.checked_mul(width).unwrap_or(usize::MAX);
            return Ok(ensure("array", buf, offset, total)?);
        }
        self.elements_size(element, count, buf, offset)
    }

    fn elements_size(
        &self,
        element: ElementPlan,
        count: usize,
        buf: &[u8],
        offset: usize,
    ) -> Result<usize, DecodeError> {
        let mut end = offset;
        for index in 0..count {
            end += self
                .element_size(element, buf, end)
                .map_err(|e| e.at_index(index))?;
        }
        Ok(end - offset)
    }

    fn element_size(
        &self,
        element: ElementPlan,
        buf: &[u8],
        offset: usize,
    ) -> Result<usize, DecodeError> {
        match element {
            ElementPlan::Scalar(builtin) => {
                Ok(ensure(builtin.type_name(), buf, offset, builtin.width())?)
            }
            ElementPlan::String => Ok(4 + read_string_len(buf, offset)?),
            ElementPlan::Complex(id) => self.type_size(id, buf, offset),
        }
    }
}
