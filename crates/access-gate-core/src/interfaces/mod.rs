// access-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Access Gate Interfaces
// Description: Capability contracts for providers, authorities, sinks, and stores.
// Purpose: Define the seams the orchestrator integrates through.
// Dependencies: access-gate-schema, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the orchestration machine integrates with
//! authentication providers, the authorization authority, decision delivery,
//! and durable resumption storage — without embedding provider-specific
//! transport. The machine treats every provider polymorphically through
//! [`AuthProvider`]; variant selection happens in configuration, never by
//! runtime type inspection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use access_gate_schema::QualifiedKey;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ProviderId;
use crate::core::identifiers::RequesterId;
use crate::core::request::AccessDecision;
use crate::core::session::AuthLevel;
use crate::core::session::Identity;
use crate::core::session::ResumeState;
use crate::core::session::ResumeToken;

// ============================================================================
// SECTION: Auth Provider
// ============================================================================

/// Context handed to a provider when a login sequence begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginContext {
    /// Requester whose submission triggered the login.
    pub triggered_by: RequesterId,
    /// Number of requests pending behind the login, including the trigger.
    pub pending: usize,
}

/// UI sequence a provider asks the host to drive.
///
/// # Invariants
/// - `Redirect` leaves the application; the in-memory machine will not
///   survive, so the orchestrator persists resumption state first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum UiEffect {
    /// Gather credentials in-UI, synchronously.
    CredentialPrompt {
        /// Provider that will consume the credentials.
        provider_id: ProviderId,
    },
    /// Leave the application for an external identity endpoint.
    Redirect {
        /// Absolute location of the external authorize endpoint.
        location: String,
        /// Token the callback must echo to reassociate the flow.
        resume_token: ResumeToken,
    },
}

/// Result of a login attempt handed back to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "callback", rename_all = "snake_case")]
pub enum CallbackData {
    /// In-UI credential submission.
    Credentials {
        /// Submitted username.
        username: String,
        /// Submitted secret.
        secret: String,
    },
    /// Return leg of a redirect round-trip.
    RedirectReturn {
        /// Token rehydrated from persisted resumption state, when the
        /// in-memory flow did not survive the redirect.
        resume_token: Option<ResumeToken>,
        /// Query parameters carried by the callback.
        params: BTreeMap<String, String>,
    },
}

/// Authentication errors reported by providers.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "detail", rename_all = "snake_case")]
pub enum AuthError {
    /// Submitted credentials were rejected.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The provider or its backing identity endpoint is unreachable.
    #[error("provider unreachable: {0}")]
    Unreachable(String),
    /// The redirect callback does not match the in-flight login.
    #[error("redirect callback does not match the pending login")]
    CallbackMismatch,
    /// A login completion arrived with no login in flight.
    #[error("no login in flight")]
    NoLoginInFlight,
    /// The callback payload is structurally invalid.
    #[error("malformed callback: {0}")]
    MalformedCallback(String),
    /// Persisted resumption state failed integrity verification.
    #[error("resumption state rejected: {0}")]
    ResumeState(String),
}

/// Capability contract for one authentication mechanism.
///
/// Implementations own no orchestration state: the pending queue and the
/// session machine belong to the orchestrator. Providers only establish
/// identities and manage their own session markers.
pub trait AuthProvider {
    /// Returns the provider's identifier.
    fn provider_id(&self) -> ProviderId;

    /// Returns the minimum level required before authorization decisions may
    /// be evaluated. Anonymous-friendly providers return [`AuthLevel::None`].
    fn required_level(&self) -> AuthLevel;

    /// Non-blocking read of the current authentication level.
    fn check_session(&self) -> AuthLevel;

    /// Initiates the provider-specific credential-gathering sequence.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the sequence cannot be started.
    fn begin_login(&self, ctx: &LoginContext) -> Result<UiEffect, AuthError>;

    /// Consumes the result of a login attempt, including resuming from a
    /// previously stored resumption token after a redirect round-trip.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the attempt fails; the orchestrator then
    /// routes every queued request to Denied.
    fn complete_login(&self, callback: &CallbackData) -> Result<Identity, AuthError>;

    /// Clears local and provider-side session markers.
    fn logout(&self);
}

// ============================================================================
// SECTION: Decision Authority
// ============================================================================

/// Pluggable authority deciding whether an identity holds a capability.
///
/// Implementations must be deterministic given (identity, capability); the
/// orchestrator folds per-capability answers with all-of semantics and never
/// issues partial grants. `identity` is `None` for anonymous-level
/// evaluation when the active provider permits it.
pub trait DecisionAuthority {
    /// Returns true when the identity's context satisfies the capability.
    fn permits(&self, identity: Option<&Identity>, capability: &QualifiedKey) -> bool;
}

// ============================================================================
// SECTION: Decision Sink
// ============================================================================

/// Receipt reported by a decision delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryReceipt {
    /// The requester received the decision.
    Delivered,
    /// The requester no longer exists; the decision was dropped silently.
    Dropped,
}

/// Delivery seam routing each decision to its originating requester.
///
/// Delivery to a defunct requester is a no-op reported as
/// [`DeliveryReceipt::Dropped`], never an error.
pub trait DecisionSink {
    /// Delivers a decision to the requester it names.
    fn deliver(&self, decision: &AccessDecision) -> DeliveryReceipt;
}

// ============================================================================
// SECTION: Resume Store
// ============================================================================

/// Storage errors for persisted resumption state.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing storage failed.
    #[error("resume store failure: {0}")]
    Store(String),
    /// State could not be serialized or deserialized.
    #[error("resume state serialization failure: {0}")]
    Serialize(String),
}

/// Durable client-side storage for redirect-spanning resumption state.
///
/// The format written by an implementation is provider-opaque but must
/// round-trip losslessly.
pub trait ResumeStore {
    /// Persists the resumption state, replacing any prior state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the state cannot be written.
    fn save(&self, state: &ResumeState) -> Result<(), StoreError>;

    /// Loads the persisted resumption state, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the state cannot be read.
    fn load(&self) -> Result<Option<ResumeState>, StoreError>;

    /// Removes any persisted resumption state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the state cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}
