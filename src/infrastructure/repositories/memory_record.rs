use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::record::{
    Record, RecordId, RecordReadRepository, RecordWriteRepository, SlugLookup, SuffixIndex,
    parse_suffix,
};
use crate::domain::slug::{Scope, SlugClaim};

#[derive(Default)]
struct State {
    last_id: i64,
    records: BTreeMap<RecordId, Record>,
}

impl State {
    fn check_claim(&self, claim: Option<&SlugClaim>, own: Option<RecordId>) -> DomainResult<()> {
        let Some(claim) = claim else {
            return Ok(());
        };
        let taken = self
            .records
            .values()
            .any(|r| r.id != own && claim.collides_with(r));
        if taken {
            return Err(DomainError::Conflict(format!(
                "slug `{}` already taken in {}",
                claim.slug, claim.scope
            )));
        }
        Ok(())
    }
}

/// Process-local record store. Claims are checked under the same lock as the
/// write, so concurrent saves cannot both take one slug.
#[derive(Default)]
pub struct InMemoryRecordRepository {
    state: Mutex<State>,
}

impl InMemoryRecordRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordReadRepository for InMemoryRecordRepository {
    async fn find_by_id(&self, id: RecordId) -> DomainResult<Option<Record>> {
        Ok(self.state.lock().await.records.get(&id).cloned())
    }
}

#[async_trait]
impl RecordWriteRepository for InMemoryRecordRepository {
    async fn insert(&self, mut record: Record, claim: Option<SlugClaim>) -> DomainResult<Record> {
        let mut state = self.state.lock().await;
        state.check_claim(claim.as_ref(), None)?;

        state.last_id += 1;
        let id = RecordId::new(state.last_id)?;
        record.id = Some(id);
        state.records.insert(id, record.clone());
        drop(state);
        Ok(record)
    }

    async fn update(&self, record: Record, claim: Option<SlugClaim>) -> DomainResult<Record> {
        let id = record
            .id
            .ok_or_else(|| DomainError::Validation("cannot update an unsaved record".into()))?;
        let mut state = self.state.lock().await;
        if !state.records.contains_key(&id) {
            return Err(DomainError::NotFound(format!("record {id} not found")));
        }
        state.check_claim(claim.as_ref(), Some(id))?;
        state.records.insert(id, record.clone());
        drop(state);
        Ok(record)
    }

    async fn delete(&self, id: RecordId) -> DomainResult<()> {
        self.state.lock().await.records.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl SlugLookup for InMemoryRecordRepository {
    async fn exists(
        &self,
        scope: &Scope,
        field: &str,
        value: &str,
        excluding: Option<RecordId>,
    ) -> DomainResult<bool> {
        let state = self.state.lock().await;
        let found = state.records.values().any(|r| {
            r.id != excluding && scope.contains(r) && r.text(field).as_deref() == Some(value)
        });
        drop(state);
        Ok(found)
    }

    async fn max_suffix(&self, scope: &Scope, field: &str, base: &str) -> DomainResult<SuffixIndex> {
        let state = self.state.lock().await;
        let max = state
            .records
            .values()
            .filter(|r| scope.contains(r))
            .filter_map(|r| parse_suffix(base, &r.text(field)?))
            .max();
        drop(state);
        Ok(max.map_or(SuffixIndex::Empty, SuffixIndex::Max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RecordType;
    use crate::domain::slug::Constraint;

    fn claim(slug: &str) -> SlugClaim {
        SlugClaim {
            scope: Scope {
                root: "standard".into(),
                constraint: Constraint::any_record(),
            },
            field: "slug".into(),
            slug: slug.into(),
        }
    }

    fn record(slug: &str) -> Record {
        Record::new(RecordType::new("standard").unwrap()).with("slug", slug)
    }

    #[tokio::test]
    async fn insert_rejects_a_taken_claim() {
        let repo = InMemoryRecordRepository::new();
        assert!(repo.is_empty().await);
        let first = repo.insert(record("a"), Some(claim("a"))).await.unwrap();
        assert_eq!(first.id, Some(RecordId(1)));

        let err = repo.insert(record("a"), Some(claim("a"))).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn update_may_keep_its_own_claim() {
        let repo = InMemoryRecordRepository::new();
        let saved = repo.insert(record("a"), Some(claim("a"))).await.unwrap();
        let updated = repo
            .update(saved.with("title", "x"), Some(claim("a")))
            .await
            .unwrap();
        assert_eq!(updated.text("title").as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn max_suffix_reports_largest_sibling() {
        let repo = InMemoryRecordRepository::new();
        let scope = claim("a").scope;
        assert_eq!(repo.max_suffix(&scope, "slug", "a").await.unwrap(), SuffixIndex::Empty);

        for slug in ["a", "a-3", "a-10", "a-020", "ab-99"] {
            repo.insert(record(slug), None).await.unwrap();
        }
        assert_eq!(repo.max_suffix(&scope, "slug", "a").await.unwrap(), SuffixIndex::Max(10));
    }
}
