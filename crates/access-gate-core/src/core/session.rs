// access-gate-core/src/core/session.rs
// ============================================================================
// Module: Authentication Session Model
// Description: Authentication levels, identities, and persisted resumption state.
// Purpose: Model the transient session and the state that survives a redirect.
// Dependencies: crate::core::{hashing, identifiers, request}, serde
// ============================================================================

//! ## Overview
//! The orchestrator holds a transient authentication session: the current
//! level, the established identity, and — while a redirect-based flow is in
//! flight — a [`ResumeState`] persisted to durable client-side storage. The
//! persisted form carries the whole pending queue plus the resumption token,
//! sealed with a canonical-JSON digest.
//!
//! Security posture: resumption state is read back from client-side storage
//! and must be treated as untrusted on load; rehydration verifies the seal
//! and fails closed on a mismatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::ProviderId;
use crate::core::identifiers::SubjectId;
use crate::core::request::AccessRequest;

// ============================================================================
// SECTION: Authentication Levels
// ============================================================================

/// Authentication level of the current session.
///
/// # Invariants
/// - Ordering is meaningful: `None < Partial < Full`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AuthLevel {
    /// No authenticated identity.
    #[default]
    None,
    /// Partially established identity (e.g. first factor only).
    Partial,
    /// Fully authenticated identity.
    Full,
}

// ============================================================================
// SECTION: Identities
// ============================================================================

/// Identity established by a completed login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject identifier asserted by the provider.
    pub subject_id: SubjectId,
    /// Authentication level the provider established.
    pub level: AuthLevel,
    /// Provider-asserted claims, opaque to the core.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl Identity {
    /// Creates a fully-authenticated identity without claims.
    #[must_use]
    pub fn full(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            level: AuthLevel::Full,
            claims: serde_json::Map::new(),
        }
    }
}

// ============================================================================
// SECTION: Resumption Tokens
// ============================================================================

/// Opaque marker reassociating a redirect callback with its pending flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeToken(String);

impl ResumeToken {
    /// Creates a resumption token from its opaque string form.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Resumption State
// ============================================================================

/// Canonical body sealed by the resumption digest.
#[derive(Serialize)]
struct ResumeBody<'state> {
    /// Provider that owns the in-flight login.
    provider_id: &'state ProviderId,
    /// Token identifying the in-flight login.
    resume_token: &'state ResumeToken,
    /// Pending queue in arrival order.
    pending: &'state [AccessRequest],
}

/// Pending queue and resumption token persisted across a redirect.
///
/// # Invariants
/// - `pending` preserves arrival order.
/// - `digest` seals the body; [`ResumeState::verify`] must pass before the
///   state is rehydrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeState {
    /// Provider that owns the in-flight login.
    pub provider_id: ProviderId,
    /// Token identifying the in-flight login.
    pub resume_token: ResumeToken,
    /// Pending queue in arrival order.
    pub pending: Vec<AccessRequest>,
    /// Canonical-JSON digest sealing the fields above.
    digest: HashDigest,
}

impl ResumeState {
    /// Seals a resumption state over the given queue.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the body cannot be canonicalized.
    pub fn seal(
        provider_id: ProviderId,
        resume_token: ResumeToken,
        pending: Vec<AccessRequest>,
    ) -> Result<Self, HashError> {
        let digest = hash_canonical_json(&ResumeBody {
            provider_id: &provider_id,
            resume_token: &resume_token,
            pending: &pending,
        })?;
        Ok(Self {
            provider_id,
            resume_token,
            pending,
            digest,
        })
    }

    /// Returns true when the stored digest matches the current body.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the body cannot be canonicalized.
    pub fn verify(&self) -> Result<bool, HashError> {
        let recomputed = hash_canonical_json(&ResumeBody {
            provider_id: &self.provider_id,
            resume_token: &self.resume_token,
            pending: &self.pending,
        })?;
        Ok(recomputed == self.digest)
    }

    /// Returns the sealing digest.
    #[must_use]
    pub const fn digest(&self) -> &HashDigest {
        &self.digest
    }
}

// ============================================================================
// SECTION: Machine States
// ============================================================================

/// State of the authorization orchestration machine.
///
/// # Invariants
/// - `Authorizing` is transient: it is entered while a request is being
///   evaluated and left before the triggering call returns. The resolved
///   step is not a resting state at all; it collapses into the decision
///   emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// No session sufficient for authorization decisions.
    Unauthenticated,
    /// Provider UI sequence in progress, possibly spanning a redirect.
    Authenticating,
    /// Session established, no pending authorization decision.
    Authenticated,
    /// Evaluating a specific request against the current identity.
    Authorizing,
}
