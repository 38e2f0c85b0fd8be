// access-gate-providers/src/redirect.rs
// ============================================================================
// Module: Redirect Provider
// Description: OAuth/OIDC-style provider spanning an external redirect.
// Purpose: Hand off to an external identity endpoint and validate the callback.
// Dependencies: access-gate-core, url
// ============================================================================

//! ## Overview
//! The redirect provider leaves the application: `begin_login` derives a
//! fresh resumption token, arms it as the expected `state` parameter, and
//! returns the authorize location for the host to navigate to. The
//! orchestrator persists the pending queue plus the token before the
//! navigation happens. On return, `complete_login` validates the echoed
//! `state` — against the in-memory token for same-process completions, or
//! against the token rehydrated from persisted state after a reload — in
//! constant time, and accepts the identity the callback asserts.
//!
//! The transport to the identity endpoint itself is out of scope; this
//! provider only owns the handoff and callback contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use access_gate_core::AuthError;
use access_gate_core::AuthLevel;
use access_gate_core::AuthProvider;
use access_gate_core::CallbackData;
use access_gate_core::Identity;
use access_gate_core::LoginContext;
use access_gate_core::ProviderId;
use access_gate_core::ResumeToken;
use access_gate_core::SubjectId;
use access_gate_core::UiEffect;
use access_gate_core::hash_bytes;
use subtle::ConstantTimeEq;
use url::Url;

// ============================================================================
// SECTION: Redirect Provider Configuration
// ============================================================================

/// Settings for one redirect-based identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectProviderConfig {
    /// Absolute authorize endpoint of the external identity provider.
    pub authorize_endpoint: String,
    /// Client identifier registered with the identity provider.
    pub client_id: String,
    /// Absolute location the callback returns to.
    pub return_to: String,
}

// ============================================================================
// SECTION: Redirect Provider
// ============================================================================

/// Redirect-based provider implementation.
///
/// # Invariants
/// - Each `begin_login` derives a distinct resumption token.
/// - `complete_login` fails closed when the echoed state does not match the
///   expected token.
#[derive(Debug)]
pub struct RedirectProvider {
    /// Endpoint and client settings.
    config: RedirectProviderConfig,
    /// Counter feeding token derivation.
    nonce: AtomicU64,
    /// Token of the login currently in flight, when begun in this process.
    inflight: Mutex<Option<ResumeToken>>,
    /// Identity established by the last completed login.
    session: Mutex<Option<Identity>>,
}

impl RedirectProvider {
    /// Creates a redirect provider over the given settings.
    #[must_use]
    pub fn new(config: RedirectProviderConfig) -> Self {
        Self {
            config,
            nonce: AtomicU64::new(0),
            inflight: Mutex::new(None),
            session: Mutex::new(None),
        }
    }

    /// Derives the next resumption token.
    fn derive_token(&self) -> ResumeToken {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let material = format!("{}:{}:{nonce}", self.provider_id(), self.config.client_id);
        ResumeToken::new(hash_bytes(material.as_bytes()).as_str())
    }

    /// Reads the in-flight token, recovering a poisoned lock.
    fn inflight_token(&self) -> Option<ResumeToken> {
        self.inflight.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Replaces the in-flight token, recovering a poisoned lock.
    fn set_inflight(&self, token: Option<ResumeToken>) {
        *self.inflight.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = token;
    }

    /// Replaces the session marker, recovering a poisoned lock.
    fn set_session(&self, identity: Option<Identity>) {
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = identity;
    }
}

impl AuthProvider for RedirectProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::new("redirect")
    }

    fn required_level(&self) -> AuthLevel {
        AuthLevel::Full
    }

    fn check_session(&self) -> AuthLevel {
        self.session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map_or(AuthLevel::None, |identity| identity.level)
    }

    fn begin_login(&self, _ctx: &LoginContext) -> Result<UiEffect, AuthError> {
        let mut location = Url::parse(&self.config.authorize_endpoint)
            .map_err(|err| AuthError::Unreachable(format!("bad authorize endpoint: {err}")))?;
        let token = self.derive_token();
        location
            .query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.return_to)
            .append_pair("state", token.as_str());
        self.set_inflight(Some(token.clone()));
        Ok(UiEffect::Redirect {
            location: location.into(),
            resume_token: token,
        })
    }

    fn complete_login(&self, callback: &CallbackData) -> Result<Identity, AuthError> {
        let CallbackData::RedirectReturn {
            resume_token,
            params,
        } = callback
        else {
            return Err(AuthError::MalformedCallback(
                "redirect provider expects a redirect callback".to_string(),
            ));
        };
        let expected = resume_token.clone().or_else(|| self.inflight_token());
        let Some(expected) = expected else {
            return Err(AuthError::NoLoginInFlight);
        };
        let Some(state) = params.get("state") else {
            return Err(AuthError::MalformedCallback("missing state parameter".to_string()));
        };
        if !bool::from(state.as_bytes().ct_eq(expected.as_str().as_bytes())) {
            return Err(AuthError::CallbackMismatch);
        }
        if !params.contains_key("code") {
            return Err(AuthError::MalformedCallback("missing code parameter".to_string()));
        }
        let Some(subject) = params.get("subject") else {
            return Err(AuthError::MalformedCallback("missing subject parameter".to_string()));
        };
        let identity = Identity::full(SubjectId::new(subject.clone()));
        self.set_session(Some(identity.clone()));
        self.set_inflight(None);
        Ok(identity)
    }

    fn logout(&self) {
        self.set_session(None);
        self.set_inflight(None);
    }
}
