// src/application/commands/records/delete.rs
use super::RecordCommandService;
use crate::{
    application::error::{ApplicationError, ApplicationResult},
    domain::record::RecordId,
};

pub struct DeleteRecordCommand {
    pub id: i64,
}

impl RecordCommandService {
    /// Deleting never touches slugs; the freed value simply becomes available.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn delete_record(&self, command: DeleteRecordCommand) -> ApplicationResult<()> {
        let id = RecordId::new(command.id)?;
        if self.read_repo.find_by_id(id).await?.is_none() {
            return Err(ApplicationError::not_found("record not found"));
        }
        self.write_repo.delete(id).await?;
        tracing::info!(%id, "record deleted");
        Ok(())
    }
}
