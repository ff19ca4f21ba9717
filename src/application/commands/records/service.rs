// src/application/commands/records/service.rs
use std::sync::Arc;

use crate::{
    application::registry::SlugRegistry,
    domain::record::{RecordReadRepository, RecordWriteRepository},
};

pub struct RecordCommandService {
    pub(super) write_repo: Arc<dyn RecordWriteRepository>,
    pub(super) read_repo: Arc<dyn RecordReadRepository>,
    pub(super) registry: Arc<SlugRegistry>,
    pub(super) max_attempts: u32,
}

impl RecordCommandService {
    #[must_use]
    pub fn new(
        write_repo: Arc<dyn RecordWriteRepository>,
        read_repo: Arc<dyn RecordReadRepository>,
        registry: Arc<SlugRegistry>,
        max_attempts: u32,
    ) -> Self {
        Self {
            write_repo,
            read_repo,
            registry,
            max_attempts: max_attempts.max(1),
        }
    }
}
