use crate::domain::errors::DomainResult;
use crate::domain::record::entity::Record;
use crate::domain::record::value_objects::RecordId;
use crate::domain::slug::{Scope, SlugClaim};
use async_trait::async_trait;

/// What a store knows about numeric suffixes already used for a base slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixIndex {
    /// The store cannot answer; callers try suffixes one by one.
    Unsupported,
    /// No `{base}-{n}` slug exists in scope.
    Empty,
    /// Largest `n` among `{base}-{n}` slugs in scope.
    Max(u64),
}

/// Read-only queries the resolver issues against a store.
///
/// # Errors
///
/// Store failures are returned as `DomainError::Persistence` and reach the
/// caller unchanged.
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait SlugLookup: Send + Sync {
    /// Whether a record in `scope` other than `excluding` holds `value` in `field`.
    async fn exists(
        &self,
        scope: &Scope,
        field: &str,
        value: &str,
        excluding: Option<RecordId>,
    ) -> DomainResult<bool>;

    /// Upper bound for the suffix search. Stores that cannot answer cheaply
    /// keep the default.
    async fn max_suffix(&self, _scope: &Scope, _field: &str, _base: &str) -> DomainResult<SuffixIndex> {
        Ok(SuffixIndex::Unsupported)
    }
}

#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait RecordReadRepository: Send + Sync {
    async fn find_by_id(&self, id: RecordId) -> DomainResult<Option<Record>>;
}

/// Writes must reject a `claim` that another record already holds, checked
/// atomically with the write.
///
/// # Errors
///
/// A taken claim or a busy store is `DomainError::Conflict`; updating a
/// missing record is `DomainError::NotFound`.
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait RecordWriteRepository: Send + Sync {
    async fn insert(&self, record: Record, claim: Option<SlugClaim>) -> DomainResult<Record>;
    async fn update(&self, record: Record, claim: Option<SlugClaim>) -> DomainResult<Record>;
    async fn delete(&self, id: RecordId) -> DomainResult<()>;
}

/// Parse the `n` of `{base}-{n}`; anything else is not a suffixed sibling.
///
/// Only the canonical rendering counts, so `{base}-02` is not suffix 2.
#[must_use]
pub fn parse_suffix(base: &str, slug: &str) -> Option<u64> {
    let digits = slug.strip_prefix(base)?.strip_prefix('-')?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
