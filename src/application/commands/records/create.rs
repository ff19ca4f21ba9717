// src/application/commands/records/create.rs
use serde_json::{Map, Value};

use super::RecordCommandService;
use crate::{
    application::{dto::RecordDto, error::ApplicationResult},
    domain::record::{Record, RecordType},
};

pub struct CreateRecordCommand {
    pub record_type: RecordType,
    pub fields: Map<String, Value>,
}

impl CreateRecordCommand {
    #[must_use]
    pub fn builder() -> CreateRecordCommandBuilder {
        CreateRecordCommandBuilder::default()
    }
}

#[derive(Default)]
pub struct CreateRecordCommandBuilder {
    record_type: Option<RecordType>,
    fields: Map<String, Value>,
}

impl CreateRecordCommandBuilder {
    #[must_use]
    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// # Errors
    ///
    /// Fails when no record type was given.
    pub fn build(self) -> Result<CreateRecordCommand, &'static str> {
        Ok(CreateRecordCommand {
            record_type: self.record_type.ok_or("record type is required")?,
            fields: self.fields,
        })
    }
}

impl RecordCommandService {
    /// Resolve the slug and insert, starting over when another writer takes
    /// the slug first.
    ///
    /// # Errors
    ///
    /// Returns lookup and store failures, or the last conflict once every
    /// attempt is spent.
    pub async fn create_record(&self, command: CreateRecordCommand) -> ApplicationResult<RecordDto> {
        let CreateRecordCommand {
            record_type,
            fields,
        } = command;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut record = Record::with_fields(record_type.clone(), fields.clone());
            let outcome = self.registry.before_save(None, &mut record).await?;
            let slug = outcome.slug().map(str::to_string);

            match self.write_repo.insert(record, outcome.into_claim()).await {
                Ok(created) => {
                    tracing::info!(
                        record_type = %created.record_type,
                        id = ?created.id,
                        slug = ?slug,
                        "record created"
                    );
                    return Ok(RecordDto::from(created).with_slug(slug.as_deref()));
                }
                Err(err) if err.is_conflict() && attempt < self.max_attempts => {
                    tracing::warn!(attempt, error = %err, "slug taken on insert, resolving again");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
