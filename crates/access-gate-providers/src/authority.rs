// access-gate-providers/src/authority.rs
// ============================================================================
// Module: Grant Table Authority
// Description: Set-based decision authority over subject capability grants.
// Purpose: Provide a deterministic built-in authority behind the decision seam.
// Dependencies: access-gate-core, access-gate-schema
// ============================================================================

//! ## Overview
//! The grant table maps subjects to the capability keys they hold, plus an
//! anonymous grant set that applies to everyone. It is one implementation of
//! the pluggable decision seam, not a rule language: membership is the whole
//! policy, and evaluation is deterministic given (identity, capability).
//! An unknown subject holds nothing beyond the anonymous grants.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use access_gate_core::DecisionAuthority;
use access_gate_core::Identity;
use access_gate_core::SubjectId;
use access_gate_schema::QualifiedKey;

// ============================================================================
// SECTION: Grant Table
// ============================================================================

/// Deterministic set-based decision authority.
#[derive(Debug, Default, Clone)]
pub struct GrantTable {
    /// Capability grants per subject.
    grants: BTreeMap<SubjectId, BTreeSet<QualifiedKey>>,
    /// Grants that apply to every reader, anonymous included.
    anonymous: BTreeSet<QualifiedKey>,
}

impl GrantTable {
    /// Creates an empty grant table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants a capability to a subject.
    #[must_use]
    pub fn grant(mut self, subject: SubjectId, capability: QualifiedKey) -> Self {
        self.grants.entry(subject).or_default().insert(capability);
        self
    }

    /// Grants a capability to everyone, anonymous readers included.
    #[must_use]
    pub fn grant_anonymous(mut self, capability: QualifiedKey) -> Self {
        self.anonymous.insert(capability);
        self
    }
}

impl DecisionAuthority for GrantTable {
    fn permits(&self, identity: Option<&Identity>, capability: &QualifiedKey) -> bool {
        if self.anonymous.contains(capability) {
            return true;
        }
        identity.is_some_and(|identity| {
            self.grants
                .get(&identity.subject_id)
                .is_some_and(|granted| granted.contains(capability))
        })
    }
}
