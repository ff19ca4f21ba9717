// src/application/commands/records/update.rs
use serde_json::{Map, Value};

use super::RecordCommandService;
use crate::{
    application::{
        dto::RecordDto,
        error::{ApplicationError, ApplicationResult},
    },
    domain::record::RecordId,
};

pub struct UpdateRecordCommand {
    pub id: i64,
    /// Fields to overwrite; `null` clears a field.
    pub changes: Map<String, Value>,
}

impl UpdateRecordCommand {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id,
            changes: Map::new(),
        }
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.changes.insert(field.into(), value.into());
        self
    }
}

impl RecordCommandService {
    /// Reload, apply the changes, resolve and save; every retry starts from
    /// a fresh load.
    ///
    /// # Errors
    ///
    /// `NotFound` when the record is gone, otherwise as for creation.
    pub async fn update_record(&self, command: UpdateRecordCommand) -> ApplicationResult<RecordDto> {
        let id = RecordId::new(command.id)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let persisted = self
                .read_repo
                .find_by_id(id)
                .await?
                .ok_or_else(|| ApplicationError::not_found("record not found"))?;

            let mut pending = persisted.clone();
            pending.apply(command.changes.clone());
            let outcome = self.registry.before_save(Some(&persisted), &mut pending).await?;
            let slug = outcome.slug().map(str::to_string);

            match self.write_repo.update(pending, outcome.into_claim()).await {
                Ok(updated) => {
                    tracing::info!(%id, slug = ?slug, "record updated");
                    return Ok(RecordDto::from(updated).with_slug(slug.as_deref()));
                }
                Err(err) if err.is_conflict() && attempt < self.max_attempts => {
                    tracing::warn!(%id, attempt, error = %err, "slug taken on update, resolving again");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
