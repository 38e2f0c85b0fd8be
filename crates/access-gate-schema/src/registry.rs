// access-gate-schema/src/registry.rs
// ============================================================================
// Module: Attribute Registry
// Description: Process-wide table of attribute descriptors.
// Purpose: Resolve qualified keys to descriptors with pure, total lookups.
// Dependencies: crate::{coerce, descriptor, key, value}
// ============================================================================

//! ## Overview
//! The registry maps qualified keys to immutable descriptors. It is populated
//! once at startup via [`AttributeRegistry::register`] (idempotently
//! replaceable, last writer wins per key) and read from any thread after
//! that. The registry is an injectable object rather than ambient global
//! state so tests can hold isolated instances.
//!
//! Every operation is total: lookups return absence for unknown keys, and a
//! poisoned lock is recovered rather than surfaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use crate::coerce::coerce_from_text;
use crate::coerce::coerce_to_text;
use crate::descriptor::AttributeDescriptor;
use crate::descriptor::Cardinality;
use crate::key::QualifiedKey;
use crate::value::AttributeValue;

// ============================================================================
// SECTION: Attribute Registry
// ============================================================================

/// Process-wide mapping from qualified key to attribute descriptor.
///
/// # Invariants
/// - Qualified keys are unique within the registry; the registry is unordered.
/// - Registration happens before steady-state traffic; reads are unsynchronized
///   against each other and never block on other readers.
#[derive(Debug, Default, Clone)]
pub struct AttributeRegistry {
    /// Descriptor table protected by a read-mostly lock.
    entries: Arc<RwLock<BTreeMap<QualifiedKey, Arc<AttributeDescriptor>>>>,
}

impl AttributeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the given descriptors into the registry, keyed by qualified key.
    ///
    /// Prior entries for other keys are kept; a duplicate key is overwritten
    /// without error (last writer wins). Intended to be called once during
    /// startup on every runtime that needs the schema.
    pub fn register(&self, attributes: impl IntoIterator<Item = AttributeDescriptor>) {
        let mut entries = self.write_entries();
        for descriptor in attributes {
            entries.insert(descriptor.key().clone(), Arc::new(descriptor));
        }
    }

    /// Empties the registry. Test isolation only.
    pub fn clear(&self) {
        self.write_entries().clear();
    }

    /// Looks up the descriptor registered under a key.
    #[must_use]
    pub fn lookup(&self, key: &QualifiedKey) -> Option<Arc<AttributeDescriptor>> {
        self.read_entries().get(key).cloned()
    }

    /// Returns true when the key's descriptor has cardinality many.
    ///
    /// An absent descriptor defaults to false.
    #[must_use]
    pub fn is_to_many(&self, key: &QualifiedKey) -> bool {
        self.lookup(key).is_some_and(|descriptor| descriptor.cardinality() == Cardinality::Many)
    }

    /// Returns true when the key's descriptor is an identity attribute.
    ///
    /// An absent descriptor defaults to false.
    #[must_use]
    pub fn is_identity(&self, key: &QualifiedKey) -> bool {
        self.lookup(key).is_some_and(|descriptor| descriptor.is_identity())
    }

    /// Coerces raw text into a typed value using the key's descriptor.
    ///
    /// Unknown keys pass the text through unchanged. See [`coerce_from_text`]
    /// for the per-kind policy.
    #[must_use]
    pub fn coerce_from_text(&self, key: &QualifiedKey, text: &str) -> AttributeValue {
        coerce_from_text(self.lookup(key).as_deref(), text)
    }

    /// Renders a typed value back to text using the key's descriptor.
    #[must_use]
    pub fn coerce_to_text(&self, key: &QualifiedKey, value: &AttributeValue) -> String {
        coerce_to_text(self.lookup(key).as_deref(), value)
    }

    /// Acquires the read guard, recovering a poisoned lock.
    fn read_entries(&self) -> RwLockReadGuard<'_, BTreeMap<QualifiedKey, Arc<AttributeDescriptor>>> {
        self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Acquires the write guard, recovering a poisoned lock.
    fn write_entries(
        &self,
    ) -> RwLockWriteGuard<'_, BTreeMap<QualifiedKey, Arc<AttributeDescriptor>>> {
        self.entries.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
