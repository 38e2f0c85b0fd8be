// access-gate-core/src/runtime/redact.rs
// ============================================================================
// Module: Field Redaction
// Description: Registry-driven redaction of unauthorized field values.
// Purpose: Substitute the redaction sentinel for fields the reader may not see.
// Dependencies: access-gate-schema, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Field-resolution layers that deny read access must substitute the
//! redaction sentinel rather than omitting the field or returning nil.
//! [`redact_row`] applies that contract over a keyed row: every field with a
//! registered descriptor is checked against the authority, and unauthorized
//! values are replaced by [`AttributeValue::Redacted`]. Keys without a
//! descriptor sit outside the attribute authorization model and pass through
//! untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use access_gate_schema::AttributeRegistry;
use access_gate_schema::AttributeRow;
use access_gate_schema::AttributeValue;

use crate::core::session::Identity;
use crate::interfaces::DecisionAuthority;

// ============================================================================
// SECTION: Row Redaction
// ============================================================================

/// Replaces unauthorized field values with the redaction sentinel.
///
/// The shape of the row is preserved: redacted fields stay present, so
/// consumers can distinguish "not authorized" from "absent" and from nil.
#[must_use]
pub fn redact_row(
    registry: &AttributeRegistry,
    authority: &impl DecisionAuthority,
    identity: Option<&Identity>,
    row: &AttributeRow,
) -> AttributeRow {
    row.iter()
        .map(|(key, value)| {
            let guarded = registry.lookup(key).is_some();
            if guarded && !authority.permits(identity, key) {
                (key.clone(), AttributeValue::Redacted)
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}
