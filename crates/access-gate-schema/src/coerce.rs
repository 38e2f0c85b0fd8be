// access-gate-schema/src/coerce.rs
// ============================================================================
// Module: Text Coercion
// Description: Forgiving text-to-value and value-to-text conversion.
// Purpose: Turn raw form input into typed values without ever failing the UI.
// Dependencies: crate::{descriptor, value}, uuid
// ============================================================================

//! ## Overview
//! Form layers hand the schema raw strings; coercion applies the descriptor's
//! value type to produce a typed value. The policy is deliberately forgiving:
//! malformed numeric text silently yields `0`, malformed uuid or bool text
//! passes through unchanged, and unknown kinds or unregistered keys pass the
//! string through as text. Coercion is total and never raises.

// ============================================================================
// SECTION: Imports
// ============================================================================

use uuid::Uuid;

use crate::descriptor::AttributeDescriptor;
use crate::descriptor::AttributeKind;
use crate::value::AttributeValue;

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Coerces raw text into a typed value according to the descriptor's kind.
///
/// A missing descriptor passes the text through unchanged, as does any kind
/// without a dedicated parser.
#[must_use]
pub fn coerce_from_text(descriptor: Option<&AttributeDescriptor>, text: &str) -> AttributeValue {
    let Some(descriptor) = descriptor else {
        return AttributeValue::Text(text.to_string());
    };
    match descriptor.kind() {
        AttributeKind::Int => AttributeValue::Int(text.trim().parse().unwrap_or(0)),
        AttributeKind::Uuid => Uuid::parse_str(text.trim())
            .map_or_else(|_| AttributeValue::Text(text.to_string()), AttributeValue::Uuid),
        AttributeKind::Bool => match text.trim() {
            "true" => AttributeValue::Bool(true),
            "false" => AttributeValue::Bool(false),
            _ => AttributeValue::Text(text.to_string()),
        },
        AttributeKind::Text | AttributeKind::Ref => AttributeValue::Text(text.to_string()),
    }
}

/// Renders a typed value back to text.
///
/// The default is the value's generic display rendering; descriptor kinds can
/// grow dedicated formatting over time. A missing descriptor falls back to
/// the generic rendering as well.
#[must_use]
pub fn coerce_to_text(descriptor: Option<&AttributeDescriptor>, value: &AttributeValue) -> String {
    let _ = descriptor;
    value.render()
}
