// access-gate-core/tests/identifiers.rs
// ============================================================================
// Module: Identifier Tests
// Description: Tests for Access Gate identifier wrappers.
// Purpose: Ensure IDs round-trip through serde and display correctly.
// Dependencies: access-gate-core, serde_json
// ============================================================================

//! ## Overview
//! Validates that identifier wrappers preserve their underlying string values
//! and serialize deterministically.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use access_gate_core::ProviderId;
use access_gate_core::RequesterId;
use access_gate_core::SubjectId;

macro_rules! assert_id_roundtrip {
    ($ty:ty, $value:expr) => {{
        let id = <$ty>::new($value);
        assert_eq!(id.as_str(), $value);
        assert_eq!(id.to_string(), $value);

        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", $value));

        let decoded: $ty = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.as_str(), $value);
    }};
}

/// Verifies identifier wrappers expose stable string values and serde.
#[test]
fn identifiers_roundtrip_with_serde_and_display() {
    assert_id_roundtrip!(RequesterId, "ui/report-1");
    assert_id_roundtrip!(ProviderId, "local");
    assert_id_roundtrip!(SubjectId, "ada");
}
