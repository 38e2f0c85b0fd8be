// access-gate-schema/src/form.rs
// ============================================================================
// Module: Form Validator Hook
// Description: Field validators pluggable into an external form system.
// Purpose: Apply per-attribute value checks to form state with permissive defaults.
// Dependencies: crate::{descriptor, key, value}
// ============================================================================

//! ## Overview
//! [`make_validator`] turns a set of descriptors into a `(form, key) -> bool`
//! function the surrounding form system can call per field. Only fields whose
//! descriptor declares a check can fail; a field absent from the set or
//! lacking a check is always valid, so unknown fields never block form
//! submission.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::descriptor::AttributeDescriptor;
use crate::key::QualifiedKey;
use crate::value::AttributeRow;
use crate::value::AttributeValue;

// ============================================================================
// SECTION: Field Validators
// ============================================================================

/// Field validator produced by [`make_validator`].
pub type FieldValidator = Box<dyn Fn(&AttributeRow, &QualifiedKey) -> bool + Send + Sync>;

/// Builds a field validator over the given attribute set.
///
/// For a field whose descriptor carries a check, the validator applies the
/// check to the field's current value (an absent value is checked as
/// [`AttributeValue::Nil`], so required-style predicates can still fail it).
/// Every other field is valid.
#[must_use]
pub fn make_validator(
    attrs: impl IntoIterator<Item = Arc<AttributeDescriptor>>,
) -> FieldValidator {
    let checked: BTreeMap<QualifiedKey, Arc<AttributeDescriptor>> = attrs
        .into_iter()
        .filter(|attr| attr.check().is_some())
        .map(|attr| (attr.key().clone(), attr))
        .collect();
    Box::new(move |form, key| {
        checked.get(key).and_then(|attr| attr.check()).is_none_or(|check| {
            let current = form.get(key).unwrap_or(&AttributeValue::Nil);
            check.accepts(current)
        })
    })
}
