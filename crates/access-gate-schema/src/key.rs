// access-gate-schema/src/key.rs
// ============================================================================
// Module: Qualified Keys
// Description: Globally-unique two-part attribute identifiers.
// Purpose: Name attributes and mutations with stable namespace/name pairs.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every attribute and mutation in the schema is named by a qualified key: a
//! namespace plus a name, written canonically as `namespace/name`. Keys are
//! opaque beyond that structure and serialize as their canonical string form.
//! Validation of the string form happens at the parse boundary; constructed
//! keys are trusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when parsing the canonical string form of a key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The string has no `/` separator.
    #[error("qualified key is missing the namespace separator: {0}")]
    MissingSeparator(String),
    /// The namespace or name part is empty.
    #[error("qualified key has an empty part: {0}")]
    EmptyPart(String),
    /// The name part contains a second separator.
    #[error("qualified key has more than one separator: {0}")]
    ExtraSeparator(String),
}

// ============================================================================
// SECTION: Qualified Key
// ============================================================================

/// Globally-unique two-part identifier naming an attribute or mutation.
///
/// # Invariants
/// - Canonical string form is `namespace/name`.
/// - Keys are unique within a registry; ordering is lexicographic over the
///   canonical form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedKey {
    /// Namespace part of the key (the entity or mutation grouping).
    namespace: String,
    /// Name part of the key.
    name: String,
}

impl QualifiedKey {
    /// Creates a qualified key from already-validated parts.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Returns the namespace part.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the name part.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for QualifiedKey {
    type Err = KeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((namespace, name)) = value.split_once('/') else {
            return Err(KeyError::MissingSeparator(value.to_string()));
        };
        if namespace.is_empty() || name.is_empty() {
            return Err(KeyError::EmptyPart(value.to_string()));
        }
        if name.contains('/') {
            return Err(KeyError::ExtraSeparator(value.to_string()));
        }
        Ok(Self::new(namespace, name))
    }
}

impl Serialize for QualifiedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
