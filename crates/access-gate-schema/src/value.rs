// access-gate-schema/src/value.rs
// ============================================================================
// Module: Attribute Values
// Description: Typed field values and the redaction sentinel.
// Purpose: Provide a closed value model distinguishable from host JSON values.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Field values carry the small fixed set of types the attribute model
//! understands. [`AttributeValue::Redacted`] is the distinguished sentinel
//! substituted for values the reader is not authorized to see; it is a
//! separate variant so every consumer can tell it apart from [`AttributeValue::Nil`]
//! and from an absent field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::key::QualifiedKey;

// ============================================================================
// SECTION: Attribute Values
// ============================================================================

/// Typed field value handled by the attribute model.
///
/// # Invariants
/// - Variants are stable for serialization; the tagged form keeps `Nil` and
///   `Redacted` distinguishable in every serialized representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// Free-form text value.
    Text(String),
    /// Signed integer value.
    Int(i64),
    /// UUID value.
    Uuid(Uuid),
    /// Boolean value.
    Bool(bool),
    /// Explicit empty value, distinct from an absent field.
    Nil,
    /// Redaction sentinel: the value exists but the reader may not see it.
    Redacted,
}

impl AttributeValue {
    /// Returns true when this value is the redaction sentinel.
    #[must_use]
    pub const fn is_redacted(&self) -> bool {
        matches!(self, Self::Redacted)
    }

    /// Renders the value as display text.
    ///
    /// The redaction sentinel renders as the empty string so redacted values
    /// never leak through text round-trips.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Int(value) => value.to_string(),
            Self::Uuid(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Nil | Self::Redacted => String::new(),
        }
    }
}

// ============================================================================
// SECTION: Attribute Rows
// ============================================================================

/// Keyed data bag mapping qualified keys to field values.
pub type AttributeRow = BTreeMap<QualifiedKey, AttributeValue>;
