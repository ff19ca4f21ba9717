// tests/support/mocks.rs
//! テストダブル
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use unique_slug::domain::errors::{DomainError, DomainResult};
use unique_slug::domain::record::{Record, RecordId, RecordWriteRepository, SlugLookup};
use unique_slug::domain::slug::{Scope, SlugClaim};
use unique_slug::infrastructure::repositories::InMemoryRecordRepository;

/// 常に失敗する検索（接続断を模倣）
pub struct FailingLookup;

#[async_trait]
impl SlugLookup for FailingLookup {
    async fn exists(
        &self,
        _scope: &Scope,
        _field: &str,
        _value: &str,
        _excluding: Option<RecordId>,
    ) -> DomainResult<bool> {
        Err(DomainError::Persistence("connection refused".into()))
    }
}

/// Inserts a rival record right before the next insert, simulating another
/// writer that claimed the same slug between resolution and persistence.
pub struct RacingWrites {
    inner: Arc<InMemoryRecordRepository>,
    rival: Mutex<Option<Record>>,
}

impl RacingWrites {
    pub fn new(inner: Arc<InMemoryRecordRepository>, rival: Record) -> Self {
        Self {
            inner,
            rival: Mutex::new(Some(rival)),
        }
    }
}

#[async_trait]
impl RecordWriteRepository for RacingWrites {
    async fn insert(&self, record: Record, claim: Option<SlugClaim>) -> DomainResult<Record> {
        let rival = self.rival.lock().await.take();
        if let Some(rival) = rival {
            self.inner.insert(rival, None).await?;
        }
        self.inner.insert(record, claim).await
    }

    async fn update(&self, record: Record, claim: Option<SlugClaim>) -> DomainResult<Record> {
        self.inner.update(record, claim).await
    }

    async fn delete(&self, id: RecordId) -> DomainResult<()> {
        self.inner.delete(id).await
    }
}
