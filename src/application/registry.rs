// src/application/registry.rs
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::SlugGeneratorPort;
use crate::domain::errors::DomainResult;
use crate::domain::record::{Record, RecordType, SlugLookup};
use crate::domain::slug::{SlugConfig, SlugOutcome, UniqueSlugService};

struct ConfiguredType {
    config: SlugConfig,
    // resolved once when the type is configured
    root: String,
}

/// Maps record types to their slug configuration and runs the before-save
/// hook. Subtypes without their own entry inherit the nearest configured
/// ancestor's settings.
pub struct SlugRegistry {
    service: UniqueSlugService,
    types: HashMap<String, ConfiguredType>,
}

impl SlugRegistry {
    #[must_use]
    pub fn new(lookup: Arc<dyn SlugLookup>, generator: Arc<SlugGeneratorPort>) -> Self {
        Self {
            service: UniqueSlugService::new(lookup, generator),
            types: HashMap::new(),
        }
    }

    /// Register `config` for `record_type` and every subtype without its own
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`](crate::domain::errors::DomainError)
    /// for malformed field names.
    pub fn configure(&mut self, record_type: &RecordType, config: SlugConfig) -> DomainResult<()> {
        config.validate()?;
        let root = record_type.root().to_string();
        tracing::info!(
            record_type = %record_type,
            %root,
            slug_field = config.slug_field_name(),
            scope = ?config.scope(),
            "slug configured"
        );
        self.types
            .insert(record_type.name().to_string(), ConfiguredType { config, root });
        Ok(())
    }

    #[must_use]
    pub fn config_for(&self, record_type: &RecordType) -> Option<&SlugConfig> {
        self.lookup(record_type).map(|c| &c.config)
    }

    /// Assign the slug on `record` ahead of persisting it.
    ///
    /// `previous` is the state last loaded from storage and is `None` for
    /// inserts.
    ///
    /// # Errors
    ///
    /// Errors from the store or a scope predicate are returned as-is.
    pub async fn before_save(
        &self,
        previous: Option<&Record>,
        record: &mut Record,
    ) -> DomainResult<SlugOutcome> {
        let Some(configured) = self.lookup(&record.record_type) else {
            return Ok(SlugOutcome::Untracked);
        };
        self.service
            .resolve(&configured.config, &configured.root, previous, record)
            .await
    }

    fn lookup(&self, record_type: &RecordType) -> Option<&ConfiguredType> {
        record_type.ancestry().find_map(|name| self.types.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::InMemoryRecordRepository;
    use crate::infrastructure::util::DefaultSlugGenerator;

    fn registry() -> SlugRegistry {
        SlugRegistry::new(
            Arc::new(InMemoryRecordRepository::new()),
            Arc::new(DefaultSlugGenerator),
        )
    }

    #[tokio::test]
    async fn unconfigured_types_are_untouched() {
        let registry = registry();
        let mut record = Record::new(RecordType::new("plain").unwrap()).with("title", "Hello");
        let outcome = registry.before_save(None, &mut record).await.unwrap();

        assert_eq!(outcome, SlugOutcome::Untracked);
        assert!(record.get("slug").is_none());
    }

    #[tokio::test]
    async fn subtypes_inherit_the_base_configuration() {
        let mut registry = registry();
        let vehicle = RecordType::new("vehicle").unwrap();
        registry.configure(&vehicle, SlugConfig::default()).unwrap();

        let car = vehicle.subtype("car").unwrap();
        assert!(registry.config_for(&car).is_some());

        let mut record = Record::new(car).with("title", "El Camino");
        let outcome = registry.before_save(None, &mut record).await.unwrap();
        let claim = outcome.into_claim().unwrap();
        assert_eq!(claim.slug, "el-camino");
        assert_eq!(claim.scope.root, "vehicle");
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mut registry = registry();
        let standard = RecordType::new("standard").unwrap();
        let err = registry
            .configure(&standard, SlugConfig::new().subject_field("bad field"))
            .unwrap_err();
        assert!(matches!(err, crate::domain::errors::DomainError::Validation(_)));
        assert!(registry.config_for(&standard).is_none());
    }
}
