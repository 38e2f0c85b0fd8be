// access-gate-schema/src/descriptor.rs
// ============================================================================
// Module: Attribute Descriptors
// Description: Immutable per-attribute metadata records.
// Purpose: Describe type, cardinality, identity, and validation for one attribute.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! A descriptor captures everything the rest of the system needs to know
//! about one attribute: its qualified key, value type, reference target,
//! cardinality, identity flag, optional value check, and an open facet map
//! for subsystem-specific metadata. Descriptors are immutable once
//! constructed and double as accessors that extract their own value from any
//! keyed row.
//!
//! A `ref`-typed descriptor without a target is a configuration defect, not
//! an error: construction logs a warning and query generation degrades to a
//! bare field selector.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::key::QualifiedKey;
use crate::value::AttributeRow;
use crate::value::AttributeValue;

// ============================================================================
// SECTION: Attribute Kinds
// ============================================================================

/// Value type of an attribute.
///
/// # Invariants
/// - Variants are stable for serialization.
/// - More kinds are added over time; coercion passes unknown shapes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Free-form text.
    Text,
    /// Signed integer.
    Int,
    /// UUID.
    Uuid,
    /// Boolean.
    Bool,
    /// Reference to another entity, identified by its identity attribute.
    Ref,
}

/// Cardinality of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one value.
    #[default]
    One,
    /// A collection of values.
    Many,
}

// ============================================================================
// SECTION: Value Checks
// ============================================================================

/// Per-field validation predicate attached to a descriptor.
#[derive(Clone)]
pub struct ValueCheck {
    /// Wrapped predicate applied to a candidate field value.
    predicate: Arc<dyn Fn(&AttributeValue) -> bool + Send + Sync>,
}

impl ValueCheck {
    /// Wraps a predicate as a value check.
    #[must_use]
    pub fn new(predicate: impl Fn(&AttributeValue) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Applies the predicate to a candidate value.
    #[must_use]
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for ValueCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueCheck(..)")
    }
}

// ============================================================================
// SECTION: Attribute Descriptor
// ============================================================================

/// Immutable metadata record for one attribute.
///
/// # Invariants
/// - Descriptors never change after construction.
/// - `target` is meaningful only for [`AttributeKind::Ref`] descriptors.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    /// Qualified key identifying the attribute.
    key: QualifiedKey,
    /// Value type of the attribute.
    kind: AttributeKind,
    /// Identity-attribute key of the referenced entity, for `Ref` attributes.
    target: Option<QualifiedKey>,
    /// Cardinality of the attribute.
    cardinality: Cardinality,
    /// True when this attribute is the identity field of its entity.
    identity: bool,
    /// Optional per-field validation predicate.
    check: Option<ValueCheck>,
    /// Open extension map for subsystem-specific facets.
    facets: BTreeMap<String, Value>,
}

impl AttributeDescriptor {
    /// Creates a descriptor with default cardinality and no facets.
    #[must_use]
    pub fn new(key: QualifiedKey, kind: AttributeKind) -> Self {
        if kind == AttributeKind::Ref {
            tracing::warn!(key = %key, "ref attribute constructed without a target");
        }
        Self {
            key,
            kind,
            target: None,
            cardinality: Cardinality::One,
            identity: false,
            check: None,
            facets: BTreeMap::new(),
        }
    }

    /// Creates a `Ref` descriptor pointing at the target's identity key.
    #[must_use]
    pub fn reference(key: QualifiedKey, target: QualifiedKey) -> Self {
        Self {
            key,
            kind: AttributeKind::Ref,
            target: Some(target),
            cardinality: Cardinality::One,
            identity: false,
            check: None,
            facets: BTreeMap::new(),
        }
    }

    /// Sets the cardinality.
    #[must_use]
    pub const fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Marks this attribute as the identity field of its entity.
    #[must_use]
    pub const fn with_identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Attaches a per-field validation predicate.
    #[must_use]
    pub fn with_check(mut self, check: ValueCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// Attaches a facet entry to the open extension map.
    #[must_use]
    pub fn with_facet(mut self, name: impl Into<String>, value: Value) -> Self {
        self.facets.insert(name.into(), value);
        self
    }

    /// Returns the qualified key.
    #[must_use]
    pub const fn key(&self) -> &QualifiedKey {
        &self.key
    }

    /// Returns the value type.
    #[must_use]
    pub const fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Returns the reference target, when declared.
    #[must_use]
    pub const fn target(&self) -> Option<&QualifiedKey> {
        self.target.as_ref()
    }

    /// Returns the cardinality.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Returns true when this attribute is its entity's identity field.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.identity
    }

    /// Returns the attached value check, when declared.
    #[must_use]
    pub const fn check(&self) -> Option<&ValueCheck> {
        self.check.as_ref()
    }

    /// Returns a facet value by name.
    #[must_use]
    pub fn facet(&self, name: &str) -> Option<&Value> {
        self.facets.get(name)
    }

    /// Extracts this attribute's value from a keyed row.
    ///
    /// Descriptors act as accessors: any component holding a descriptor can
    /// pull the matching field out of a data bag without consulting the
    /// registry.
    #[must_use]
    pub fn get<'row>(&self, row: &'row AttributeRow) -> Option<&'row AttributeValue> {
        row.get(&self.key)
    }
}
