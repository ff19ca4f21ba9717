// src/domain/slug/services.rs
use std::sync::Arc;

use crate::application::ports::util::SlugGenerator;
use crate::domain::errors::DomainResult;
use crate::domain::record::{Record, RecordId, SlugLookup, SuffixIndex};
use crate::domain::slug::config::SlugConfig;
use crate::domain::slug::scope::{Scope, SlugClaim, evaluate_scope};

/// The slug a save starts from, before collision resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Set explicitly by the caller; used verbatim.
    Manual(String),
    /// Normalized from the subject.
    Derived(String),
    /// The stored slug, re-checked because the record moved to another scope.
    Relocated(String),
}

impl Candidate {
    #[must_use]
    pub fn base(&self) -> &str {
        match self {
            Self::Manual(base) | Self::Derived(base) | Self::Relocated(base) => base,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugOutcome {
    /// The record type has no slug configuration.
    Untracked,
    /// The existing slug stays as it is.
    Kept(String),
    /// A slug was written onto the record and must be claimed on save.
    Assigned(SlugClaim),
}

impl SlugOutcome {
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Untracked => None,
            Self::Kept(slug) => Some(slug),
            Self::Assigned(claim) => Some(&claim.slug),
        }
    }

    #[must_use]
    pub fn into_claim(self) -> Option<SlugClaim> {
        match self {
            Self::Assigned(claim) => Some(claim),
            _ => None,
        }
    }
}

/// Domain service responsible for producing scoped unique slugs.
pub struct UniqueSlugService {
    lookup: Arc<dyn SlugLookup>,
    generator: Arc<dyn SlugGenerator>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn suffixed(base: &str, n: u64) -> String {
    format!("{base}-{n}")
}

impl UniqueSlugService {
    #[must_use]
    pub const fn new(lookup: Arc<dyn SlugLookup>, generator: Arc<dyn SlugGenerator>) -> Self {
        Self { lookup, generator }
    }

    /// Pick the base slug for this save, or `None` when the stored slug must
    /// be left alone. `previous` is the persisted state, absent for new records.
    #[must_use]
    pub fn candidate(
        &self,
        config: &SlugConfig,
        previous: Option<&Record>,
        record: &Record,
    ) -> Option<Candidate> {
        let field = config.slug_field_name();
        let current = present(record.text(field));
        let stored = previous.and_then(|p| present(p.text(field)));

        if let Some(manual) = current
            .as_ref()
            .filter(|c| stored.as_deref() != Some(c.as_str()))
        {
            return Some(Candidate::Manual(manual.clone()));
        }

        let subject = config.subject().subject(record);
        let subject_changed =
            previous.is_some_and(|p| config.subject().subject(p) != subject);

        if current.is_none() || subject_changed {
            Some(Candidate::Derived(self.generator.slugify(&subject)))
        } else {
            None
        }
    }

    #[must_use]
    pub fn should_recompute(
        &self,
        config: &SlugConfig,
        previous: Option<&Record>,
        record: &Record,
    ) -> bool {
        self.candidate(config, previous, record).is_some()
    }

    /// Resolve the slug for `record` and write it onto the record.
    ///
    /// A kept slug is still re-checked when the record's scope differs from
    /// the one it was persisted under.
    ///
    /// # Errors
    ///
    /// Returns scope predicate and lookup failures unchanged.
    pub async fn resolve(
        &self,
        config: &SlugConfig,
        root: &str,
        previous: Option<&Record>,
        record: &mut Record,
    ) -> DomainResult<SlugOutcome> {
        let field = config.slug_field_name();
        let scope = evaluate_scope(config.scope(), root, record)?;
        let candidate = if let Some(candidate) = self.candidate(config, previous, record) {
            candidate
        } else {
            let slug = record.text(field).unwrap_or_default();
            let moved = match previous {
                Some(previous) => evaluate_scope(config.scope(), root, previous)? != scope,
                None => false,
            };
            if !moved {
                tracing::debug!(record_type = %record.record_type, %slug, "slug unchanged");
                return Ok(SlugOutcome::Kept(slug));
            }
            Candidate::Relocated(slug)
        };

        let slug = self
            .unique_slug(&scope, field, candidate.base(), record.id)
            .await?;
        tracing::debug!(
            record_type = %record.record_type,
            %scope,
            ?candidate,
            %slug,
            "slug assigned"
        );

        record.set(field, slug.clone());
        Ok(SlugOutcome::Assigned(SlugClaim {
            scope,
            field: field.to_string(),
            slug,
        }))
    }

    /// Return `base` if free in `scope`, otherwise `{base}-{n}` for the
    /// smallest free `n >= 2`.
    ///
    /// # Errors
    ///
    /// Returns lookup failures unchanged.
    pub async fn unique_slug(
        &self,
        scope: &Scope,
        field: &str,
        base: &str,
        ignore_id: Option<RecordId>,
    ) -> DomainResult<String> {
        if !self.lookup.exists(scope, field, base, ignore_id).await? {
            return Ok(base.to_string());
        }

        let limit = match self.lookup.max_suffix(scope, field, base).await? {
            SuffixIndex::Empty => return Ok(suffixed(base, 2)),
            SuffixIndex::Max(max) => Some(max.max(1)),
            SuffixIndex::Unsupported => None,
        };

        // Gaps below the largest suffix are still handed out first.
        let mut n = 2u64;
        while limit.is_none_or(|max| n <= max) {
            let candidate = suffixed(base, n);
            if !self.lookup.exists(scope, field, &candidate, ignore_id).await? {
                return Ok(candidate);
            }
            n += 1;
        }
        Ok(suffixed(base, n))
    }
}
