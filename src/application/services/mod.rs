// src/application/services/mod.rs
use std::sync::Arc;

use crate::{
    application::{commands::records::RecordCommandService, registry::SlugRegistry},
    domain::record::{RecordReadRepository, RecordWriteRepository},
};

pub struct ApplicationServices {
    pub record_commands: Arc<RecordCommandService>,
}

impl ApplicationServices {
    /// `slug_registry` must already hold every record type configuration.
    #[must_use]
    pub fn new(
        record_write_repo: Arc<dyn RecordWriteRepository>,
        record_read_repo: Arc<dyn RecordReadRepository>,
        slug_registry: SlugRegistry,
        save_max_attempts: u32,
    ) -> Self {
        let record_commands = Arc::new(RecordCommandService::new(
            record_write_repo,
            record_read_repo,
            Arc::new(slug_registry),
            save_max_attempts,
        ));

        Self { record_commands }
    }
}
