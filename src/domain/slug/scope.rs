use std::fmt;

use serde_json::Value;

use crate::domain::errors::DomainResult;
use crate::domain::record::Record;
use crate::domain::slug::config::ScopeSpec;

/// Store-agnostic filter over record fields.
///
/// Stores translate this into their own query language; the in-memory store
/// evaluates it directly with [`Constraint::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Eq(String, Value),
    IsNull(String),
    NotNull(String),
    All(Vec<Constraint>),
}

impl Constraint {
    /// Equality on a field; a null value turns into an `IS NULL` check.
    #[must_use]
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        match value.into() {
            Value::Null => Self::IsNull(field),
            value => Self::Eq(field, value),
        }
    }

    #[must_use]
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull(field.into())
    }

    #[must_use]
    pub fn not_null(field: impl Into<String>) -> Self {
        Self::NotNull(field.into())
    }

    #[must_use]
    pub fn all(constraints: impl IntoIterator<Item = Self>) -> Self {
        Self::All(constraints.into_iter().collect())
    }

    /// Matches every record.
    #[must_use]
    pub const fn any_record() -> Self {
        Self::All(Vec::new())
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Eq(field, expected) => match record.get(field) {
                Some(Value::Null) | None => false,
                Some(actual) => actual == expected,
            },
            Self::IsNull(field) => matches!(record.get(field), None | Some(Value::Null)),
            Self::NotNull(field) => !matches!(record.get(field), None | Some(Value::Null)),
            Self::All(inner) => inner.iter().all(|c| c.matches(record)),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(field, value) => write!(f, "{field} = {value}"),
            Self::IsNull(field) => write!(f, "{field} IS NULL"),
            Self::NotNull(field) => write!(f, "{field} IS NOT NULL"),
            Self::All(inner) if inner.is_empty() => f.write_str("*"),
            Self::All(inner) => {
                for (i, c) in inner.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
        }
    }
}

/// The population a slug must be unique in: every record under `root` that
/// satisfies `constraint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub root: String,
    pub constraint: Constraint,
}

impl Scope {
    #[must_use]
    pub fn contains(&self, record: &Record) -> bool {
        record.record_type.root() == self.root && self.constraint.matches(record)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.root, self.constraint)
    }
}

/// A freshly assigned slug that the store must re-check when writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugClaim {
    pub scope: Scope,
    pub field: String,
    pub slug: String,
}

impl SlugClaim {
    /// True when `other` already holds the claimed slug in the claimed scope.
    #[must_use]
    pub fn collides_with(&self, other: &Record) -> bool {
        self.scope.contains(other) && other.text(&self.field).as_deref() == Some(self.slug.as_str())
    }
}

/// Compute the uniqueness scope of `record` for this save.
///
/// # Errors
///
/// Returns the scope predicate's error unchanged.
pub fn evaluate_scope(spec: &ScopeSpec, root: &str, record: &Record) -> DomainResult<Scope> {
    let constraint = match spec {
        ScopeSpec::None => Constraint::any_record(),
        ScopeSpec::Field(field) => {
            Constraint::field_eq(field.as_str(), record.get(field).cloned().unwrap_or(Value::Null))
        }
        ScopeSpec::Predicate(predicate) => predicate(record)?,
    };
    Ok(Scope {
        root: root.to_string(),
        constraint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::record::RecordType;
    use serde_json::json;
    use std::sync::Arc;

    fn record() -> Record {
        Record::new(RecordType::new("standard").unwrap())
    }

    #[test]
    fn no_scope_covers_the_root_type() {
        let vehicle = RecordType::new("vehicle").unwrap();
        let truck = Record::new(vehicle.subtype("truck").unwrap());
        let scope = evaluate_scope(&ScopeSpec::None, "vehicle", &truck).unwrap();

        assert_eq!(scope.constraint, Constraint::any_record());
        assert!(scope.contains(&Record::new(vehicle.subtype("car").unwrap())));
        assert!(!scope.contains(&record()));
    }

    #[test]
    fn field_scope_uses_current_value() {
        let r = record().with("some_scope", 1);
        let scope = evaluate_scope(&ScopeSpec::Field("some_scope".into()), "standard", &r).unwrap();
        assert_eq!(scope.constraint, Constraint::Eq("some_scope".into(), json!(1)));
        assert!(scope.contains(&record().with("some_scope", 1)));
        assert!(!scope.contains(&record().with("some_scope", 2)));
        assert!(!scope.contains(&record().with("some_scope", true)));
        assert!(!scope.contains(&record().with("some_scope", 1.0)));
        assert!(!scope.contains(&record().with("some_scope", "1")));

        let unscoped = evaluate_scope(&ScopeSpec::Field("some_scope".into()), "standard", &record())
            .unwrap();
        assert_eq!(unscoped.constraint, Constraint::is_null("some_scope"));
        assert!(unscoped.contains(&record()));
    }

    #[test]
    fn predicate_scope_errors_propagate() {
        let spec = ScopeSpec::Predicate(Arc::new(|_: &Record| -> DomainResult<Constraint> {
            Err(DomainError::Persistence("predicate failed".into()))
        }));
        let err = evaluate_scope(&spec, "standard", &record()).unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
    }

    #[test]
    fn constraint_display_is_readable() {
        let c = Constraint::all([Constraint::is_null("deleted_at"), Constraint::field_eq("site", "a")]);
        assert_eq!(c.to_string(), "deleted_at IS NULL AND site = \"a\"");
    }
}
