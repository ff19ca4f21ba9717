// src/domain/record/entity.rs
use crate::domain::record::value_objects::{RecordId, RecordType};
use serde_json::{Map, Value};

/// A persisted (or about to be persisted) record with loosely typed fields.
///
/// `id` is `None` until the record has been inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: Option<RecordId>,
    pub record_type: RecordType,
    pub fields: Map<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new(record_type: RecordType) -> Self {
        Self {
            id: None,
            record_type,
            fields: Map::new(),
        }
    }

    #[must_use]
    pub const fn with_fields(record_type: RecordType, fields: Map<String, Value>) -> Self {
        Self {
            id: None,
            record_type,
            fields,
        }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.id.is_none()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Textual view of a field. Missing and null fields have no text.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Merge `changes` into the record; a `null` change clears the field value.
    pub fn apply(&mut self, changes: Map<String, Value>) {
        for (field, value) in changes {
            self.fields.insert(field, value);
        }
    }
}
