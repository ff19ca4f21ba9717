use std::fmt;
use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::record::{Record, validate_identifier};
use crate::domain::slug::scope::Constraint;

pub type SubjectFn = dyn Fn(&Record) -> String + Send + Sync;
pub type ScopeFn = dyn Fn(&Record) -> DomainResult<Constraint> + Send + Sync;

/// Where the text to slugify comes from.
#[derive(Clone)]
pub enum SubjectSource {
    Field(String),
    Computed(Arc<SubjectFn>),
}

impl SubjectSource {
    #[must_use]
    pub fn subject(&self, record: &Record) -> String {
        match self {
            Self::Field(field) => record.text(field).unwrap_or_default(),
            Self::Computed(f) => f(record),
        }
    }
}

impl fmt::Debug for SubjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// How sibling records are narrowed before checking for collisions.
#[derive(Clone, Default)]
pub enum ScopeSpec {
    #[default]
    None,
    Field(String),
    Predicate(Arc<ScopeFn>),
}

impl fmt::Debug for ScopeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Per-type slug settings. Defaults to slugifying `title` into `slug` with no
/// extra scope.
#[derive(Debug, Clone)]
pub struct SlugConfig {
    slug_field: String,
    subject: SubjectSource,
    scope: ScopeSpec,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            slug_field: "slug".into(),
            subject: SubjectSource::Field("title".into()),
            scope: ScopeSpec::None,
        }
    }
}

impl SlugConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn slug_field(mut self, field: impl Into<String>) -> Self {
        self.slug_field = field.into();
        self
    }

    #[must_use]
    pub fn subject_field(mut self, field: impl Into<String>) -> Self {
        self.subject = SubjectSource::Field(field.into());
        self
    }

    #[must_use]
    pub fn subject_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.subject = SubjectSource::Computed(Arc::new(f));
        self
    }

    #[must_use]
    pub fn scope_field(mut self, field: impl Into<String>) -> Self {
        self.scope = ScopeSpec::Field(field.into());
        self
    }

    #[must_use]
    pub fn scope_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> DomainResult<Constraint> + Send + Sync + 'static,
    {
        self.scope = ScopeSpec::Predicate(Arc::new(f));
        self
    }

    #[must_use]
    pub fn slug_field_name(&self) -> &str {
        &self.slug_field
    }

    #[must_use]
    pub const fn subject(&self) -> &SubjectSource {
        &self.subject
    }

    #[must_use]
    pub const fn scope(&self) -> &ScopeSpec {
        &self.scope
    }

    /// # Errors
    ///
    /// Rejects slug, subject or scope field names that are not identifiers.
    pub fn validate(&self) -> DomainResult<()> {
        validate_identifier("slug field", &self.slug_field)?;
        if let SubjectSource::Field(field) = &self.subject {
            validate_identifier("subject field", field)?;
        }
        if let ScopeSpec::Field(field) = &self.scope {
            validate_identifier("scope field", field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RecordType;

    #[test]
    fn defaults_follow_title_and_slug() {
        let config = SlugConfig::default();
        assert_eq!(config.slug_field_name(), "slug");
        assert!(matches!(config.subject(), SubjectSource::Field(f) if f == "title"));
        assert!(matches!(config.scope(), ScopeSpec::None));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn computed_subject_sees_the_record() {
        let config = SlugConfig::new()
            .slug_field("permalink")
            .subject_with(|r| format!("zcvf {} zxvf", r.text("name").unwrap_or_default()));
        let record = Record::new(RecordType::new("custom").unwrap()).with("name", "Sample Record");
        assert_eq!(config.subject().subject(&record), "zcvf Sample Record zxvf");
    }

    #[test]
    fn malformed_field_names_are_rejected() {
        assert!(SlugConfig::new().slug_field("perma link").validate().is_err());
        assert!(SlugConfig::new().scope_field("").validate().is_err());
    }
}
