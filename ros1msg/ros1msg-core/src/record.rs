//! Ordered name → value maps for decoded messages.

use std::sync::Arc;

use crate::{error::ValueError, value::Value};

/// A decoded message: field values in declaration order, keyed by name.
///
/// Field names are shared with the compiled decoder, so building a record
/// does not allocate per name. A record can be frozen, after which
/// [`Record::set`], [`Record::get_mut`] and [`Record::push`] fail.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(Arc<str>, Value)>,
    frozen: bool,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field.as_ref() == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_ref(), value))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_ref())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Mutable access to an existing field; `Ok(None)` if there is no such field.
    pub fn get_mut(&mut self, name: &str) -> Result<Option<&mut Value>, ValueError> {
        self.check_mutable(name)?;
        Ok(self
            .fields
            .iter_mut()
            .find(|(field, _)| field.as_ref() == name)
            .map(|(_, value)| value))
    }

    /// Replace a field's value, or append it if absent. Returns the previous value.
    pub fn set(
        &mut self,
        name: impl Into<Arc<str>>,
        value: Value,
    ) -> Result<Option<Value>, ValueError> {
        let name = name.into();
        self.check_mutable(&name)?;
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => Ok(Some(std::mem::replace(slot, value))),
            None => {
                self.fields.push((name, value));
                Ok(None)
            }
        }
    }

    /// Append a field without checking for duplicates.
    pub fn push(&mut self, name: impl Into<Arc<str>>, value: Value) -> Result<(), ValueError> {
        let name = name.into();
        self.check_mutable(&name)?;
        self.fields.push((name, value));
        Ok(())
    }

    /// Make this record and every record nested inside it immutable.
    pub fn freeze(&mut self) {
        self.frozen = true;
        for (_, value) in &mut self.fields {
            value.freeze();
        }
    }

    fn check_mutable(&self, field: &str) -> Result<(), ValueError> {
        if self.frozen {
            return Err(ValueError::Frozen {
                field: field.to_string(),
            });
        }
        Ok(())
    }
}

impl PartialEq for Record {
    /// Records compare by fields only; freezing does not change equality.
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl From<Vec<(Arc<str>, Value)>> for Record {
    fn from(fields: Vec<(Arc<str>, Value)>) -> Self {
        Self {
            fields,
            frozen: false,
        }
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::from(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect::<Vec<_>>(),
        )
    }
}
