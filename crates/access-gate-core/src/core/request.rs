// access-gate-core/src/core/request.rs
// ============================================================================
// Module: Request and Decision Protocol
// Description: Authorization requests and their correlated decisions.
// Purpose: Define the event contract between requesters and the orchestrator.
// Dependencies: access-gate-schema, serde, serde_json
// ============================================================================

//! ## Overview
//! A requesting state machine raises an [`AccessRequest`] naming itself, the
//! original event it paused, and the capability set it needs granted. The
//! orchestrator answers with exactly one [`AccessDecision`] that echoes the
//! original event untouched, so the requester can resume exactly the
//! operation it paused.
//!
//! The original event is opaque to the core: it is never inspected for
//! control decisions and must be preserved byte-for-byte.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use access_gate_schema::QualifiedKey;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::RequesterId;

// ============================================================================
// SECTION: Authorization Requests
// ============================================================================

/// Authorization request raised by a requesting state machine.
///
/// # Invariants
/// - `original_event` is opaque; the core echoes it untouched.
/// - `required_capabilities` name fields or mutations by qualified key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Identifier of the requesting machine.
    pub requester_id: RequesterId,
    /// The paused event, preserved verbatim for the decision echo.
    pub original_event: Value,
    /// Capability set that must be satisfied for a grant.
    pub required_capabilities: BTreeSet<QualifiedKey>,
}

// ============================================================================
// SECTION: Authorization Decisions
// ============================================================================

/// Outcome of an authorization decision.
///
/// # Invariants
/// - Variants are stable for serialization; there is no partial-grant form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// Every required capability was satisfied.
    Granted,
    /// At least one required capability was not satisfied.
    Denied,
}

/// Correlated decision answering one [`AccessRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Identifier of the requester the decision targets.
    pub requester_id: RequesterId,
    /// The original event, echoed from the matching request.
    pub original_event: Value,
    /// Grant or deny outcome.
    pub outcome: DecisionOutcome,
}

impl AccessDecision {
    /// Builds the decision answering a request with the given outcome.
    #[must_use]
    pub fn answering(request: &AccessRequest, outcome: DecisionOutcome) -> Self {
        Self {
            requester_id: request.requester_id.clone(),
            original_event: request.original_event.clone(),
            outcome,
        }
    }
}
