use crate::domain::errors::{DomainError, DomainResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i64);

impl RecordId {
    /// # Errors
    ///
    /// Rejects ids that are zero or negative.
    pub fn new(id: i64) -> DomainResult<Self> {
        if id <= 0 {
            Err(DomainError::Validation("record id must be positive".into()))
        } else {
            Ok(Self(id))
        }
    }
}

impl From<RecordId> for i64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Field and type names end up in storage queries, so they are restricted to
/// ASCII identifiers.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] naming `kind` when `value` is empty or
/// contains anything but ASCII letters, digits and `_`.
pub fn validate_identifier(kind: &str, value: &str) -> DomainResult<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "{kind} `{value}` must be a non-empty identifier"
        )))
    }
}

/// A record type together with its explicit lineage.
///
/// Subtypes stored alongside their base type share one uniqueness domain, so
/// the root is tracked here instead of being discovered at query time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordType {
    name: String,
    // nearest ancestor first
    lineage: Vec<String>,
}

impl RecordType {
    /// # Errors
    ///
    /// Rejects names that are not identifiers.
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        validate_identifier("record type", &name)?;
        Ok(Self {
            name,
            lineage: Vec::new(),
        })
    }

    /// Derive a subtype whose lineage continues through `self`.
    ///
    /// # Errors
    ///
    /// Rejects malformed names and names already present in the lineage.
    pub fn subtype(&self, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        validate_identifier("record type", &name)?;
        if name == self.name || self.lineage.contains(&name) {
            return Err(DomainError::Validation(format!(
                "record type `{name}` cannot inherit from itself"
            )));
        }
        let mut lineage = Vec::with_capacity(self.lineage.len() + 1);
        lineage.push(self.name.clone());
        lineage.extend(self.lineage.iter().cloned());
        Ok(Self { name, lineage })
    }

    /// Rebuild a type from its stored name and lineage.
    ///
    /// # Errors
    ///
    /// Rejects malformed names.
    pub fn from_parts(name: impl Into<String>, lineage: Vec<String>) -> DomainResult<Self> {
        let name = name.into();
        validate_identifier("record type", &name)?;
        for ancestor in &lineage {
            validate_identifier("record type", ancestor)?;
        }
        Ok(Self { name, lineage })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    #[must_use]
    pub fn root(&self) -> &str {
        self.lineage
            .last()
            .map_or(self.name.as_str(), String::as_str)
    }

    /// The type itself followed by its ancestors, nearest first.
    pub fn ancestry(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.lineage.iter().map(String::as_str))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_of_plain_type_is_itself() {
        let standard = RecordType::new("standard").unwrap();
        assert_eq!(standard.root(), "standard");
        assert!(standard.lineage().is_empty());
    }

    #[test]
    fn subtypes_resolve_to_topmost_ancestor() {
        let vehicle = RecordType::new("vehicle").unwrap();
        let car = vehicle.subtype("car").unwrap();
        let coupe = car.subtype("coupe").unwrap();

        assert_eq!(car.root(), "vehicle");
        assert_eq!(coupe.root(), "vehicle");
        assert_eq!(
            coupe.ancestry().collect::<Vec<_>>(),
            vec!["coupe", "car", "vehicle"]
        );
    }

    #[test]
    fn rejects_cyclic_and_malformed_names() {
        let vehicle = RecordType::new("vehicle").unwrap();
        assert!(vehicle.subtype("vehicle").is_err());
        assert!(RecordType::new("").is_err());
        assert!(RecordType::new("bad name").is_err());
        assert!(RecordId::new(0).is_err());
    }
}
