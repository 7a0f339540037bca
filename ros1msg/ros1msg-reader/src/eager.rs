use std::sync::Arc;

use bytes::Bytes;
use ros1msg_core::{MessageDefinition, Record};

use crate::{
    cursor::Cursor,
    error::{DecodeError, SchemaError},
    plan::DecodePlan,
};

/// Options for [`MessageReader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Freeze every decoded record so later mutation fails.
    pub freeze: bool,
}

/// Decodes whole messages into [`Record`] trees.
///
/// The decoder is compiled once per schema; [`MessageReader::read_message`]
/// can then be called any number of times, from any number of threads.
#[derive(Debug, Clone)]
pub struct MessageReader {
    plan: Arc<DecodePlan>,
    options: ReaderOptions,
}

impl MessageReader {
    pub fn new(definitions: &[MessageDefinition]) -> Result<Self, SchemaError> {
        Self::with_options(definitions, ReaderOptions::default())
    }

    pub fn with_options(
        definitions: &[MessageDefinition],
        options: ReaderOptions,
    ) -> Result<Self, SchemaError> {
        let plan = DecodePlan::compile(definitions)?;
        Ok(Self::from_plan(Arc::new(plan), options))
    }

    /// Reader sharing an already compiled plan, e.g. with a
    /// [`LazyMessageReader`](crate::LazyMessageReader).
    pub fn from_plan(plan: Arc<DecodePlan>, options: ReaderOptions) -> Self {
        Self { plan, options }
    }

    pub fn plan(&self) -> &Arc<DecodePlan> {
        &self.plan
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Decode the message at the start of `buffer`. Trailing bytes are ignored.
    pub fn read_message(&self, buffer: impl Into<Bytes>) -> Result<Record, DecodeError> {
        self.read_message_with_len(buffer).map(|(record, _)| record)
    }

    /// Like [`Self::read_message`], also returning the number of bytes consumed.
    pub fn read_message_with_len(
        &self,
        buffer: impl Into<Bytes>,
    ) -> Result<(Record, usize), DecodeError> {
        let mut cursor = Cursor::new(buffer.into());
        let mut record = cursor.read_record(&self.plan, self.plan.root())?;
        if self.options.freeze {
            record.freeze();
        }
        Ok((record, cursor.offset()))
    }
}
