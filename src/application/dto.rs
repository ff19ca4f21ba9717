use crate::domain::record::Record;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct RecordDto {
    pub id: Option<i64>,
    pub record_type: String,
    pub root_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub fields: Map<String, Value>,
}

impl RecordDto {
    #[must_use]
    pub fn with_slug(mut self, slug: Option<&str>) -> Self {
        self.slug = slug.map(str::to_string);
        self
    }
}

impl From<Record> for RecordDto {
    fn from(record: Record) -> Self {
        Self {
            id: record.id.map(i64::from),
            record_type: record.record_type.name().to_string(),
            root_type: record.record_type.root().to_string(),
            slug: None,
            fields: record.fields,
        }
    }
}
