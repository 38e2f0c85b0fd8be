// access-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Scripted providers, authorities, and request builders.
// Purpose: Provide reusable deterministic fixtures for orchestrator tests.
// Dependencies: access-gate-core, access-gate-schema
// ============================================================================

//! ## Overview
//! This module provides scripted provider implementations (a synchronous
//! local stub and a redirect stub), a set-based decision authority, and
//! request builders shared across the orchestrator test files.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;

use access_gate_core::AuthError;
use access_gate_core::AuthLevel;
use access_gate_core::AuthProvider;
use access_gate_core::CallbackData;
use access_gate_core::DecisionAuthority;
use access_gate_core::Identity;
use access_gate_core::LoginContext;
use access_gate_core::ProviderId;
use access_gate_core::RequesterId;
use access_gate_core::ResumeToken;
use access_gate_core::SubjectId;
use access_gate_core::UiEffect;
use access_gate_core::AccessRequest;
use access_gate_schema::QualifiedKey;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Request Builders
// ============================================================================

/// Builds a request with the given requester, event payload, and capabilities.
#[must_use]
pub fn request(requester: &str, event: Value, capabilities: &[&str]) -> AccessRequest {
    AccessRequest {
        requester_id: RequesterId::new(requester),
        original_event: event,
        required_capabilities: capability_set(capabilities),
    }
}

/// Parses a capability set from canonical key strings.
#[must_use]
pub fn capability_set(capabilities: &[&str]) -> BTreeSet<QualifiedKey> {
    capabilities
        .iter()
        .map(|raw| raw.parse().unwrap_or_else(|_| panic!("bad capability fixture: {raw}")))
        .collect()
}

/// Builds a distinct event payload for a requester.
#[must_use]
pub fn event_for(requester: &str) -> Value {
    json!({"event": "resume-operation", "requester": requester})
}

// ============================================================================
// SECTION: Set-Based Authority
// ============================================================================

/// Decision authority granting capabilities from fixed sets.
#[derive(Debug, Default)]
pub struct AllowSet {
    /// Capabilities granted to any authenticated identity.
    pub authenticated: BTreeSet<QualifiedKey>,
    /// Capabilities granted to anonymous evaluation.
    pub anonymous: BTreeSet<QualifiedKey>,
}

impl AllowSet {
    /// Builds an authority granting the given keys to authenticated identities.
    #[must_use]
    pub fn granting(capabilities: &[&str]) -> Self {
        Self {
            authenticated: capability_set(capabilities),
            anonymous: BTreeSet::new(),
        }
    }

    /// Builds an authority granting the given keys anonymously.
    #[must_use]
    pub fn granting_anonymous(capabilities: &[&str]) -> Self {
        Self {
            authenticated: BTreeSet::new(),
            anonymous: capability_set(capabilities),
        }
    }
}

impl DecisionAuthority for AllowSet {
    fn permits(&self, identity: Option<&Identity>, capability: &QualifiedKey) -> bool {
        match identity {
            Some(_) => self.authenticated.contains(capability),
            None => self.anonymous.contains(capability),
        }
    }
}

// ============================================================================
// SECTION: Local Stub Provider
// ============================================================================

/// Secret accepted by the local stub provider.
pub const STUB_SECRET: &str = "correct-horse";

/// Synchronous in-UI provider accepting one fixed secret.
#[derive(Debug)]
pub struct StubLocalProvider {
    /// Minimum level required before authorization decisions run.
    required: AuthLevel,
    /// Session level established by the last completed login.
    session: Mutex<AuthLevel>,
}

impl StubLocalProvider {
    /// Creates a stub requiring full authentication.
    #[must_use]
    pub fn new() -> Self {
        Self::with_required_level(AuthLevel::Full)
    }

    /// Creates a stub with an explicit level requirement.
    #[must_use]
    pub fn with_required_level(required: AuthLevel) -> Self {
        Self {
            required,
            session: Mutex::new(AuthLevel::None),
        }
    }

    /// Reads the stub's session marker.
    fn session_level(&self) -> AuthLevel {
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Writes the stub's session marker.
    fn set_session(&self, level: AuthLevel) {
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = level;
    }
}

impl Default for StubLocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for StubLocalProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::new("stub-local")
    }

    fn required_level(&self) -> AuthLevel {
        self.required
    }

    fn check_session(&self) -> AuthLevel {
        self.session_level()
    }

    fn begin_login(&self, _ctx: &LoginContext) -> Result<UiEffect, AuthError> {
        Ok(UiEffect::CredentialPrompt {
            provider_id: self.provider_id(),
        })
    }

    fn complete_login(&self, callback: &CallbackData) -> Result<Identity, AuthError> {
        match callback {
            CallbackData::Credentials { username, secret } if secret == STUB_SECRET => {
                self.set_session(AuthLevel::Full);
                Ok(Identity::full(SubjectId::new(username.clone())))
            }
            CallbackData::Credentials { .. } => Err(AuthError::InvalidCredentials),
            CallbackData::RedirectReturn { .. } => {
                Err(AuthError::MalformedCallback("local provider expects credentials".to_string()))
            }
        }
    }

    fn logout(&self) {
        self.set_session(AuthLevel::None);
    }
}

// ============================================================================
// SECTION: Redirect Stub Provider
// ============================================================================

/// Fixed resumption token issued by the redirect stub.
pub const STUB_REDIRECT_TOKEN: &str = "resume-token-1";

/// Redirect-based provider stub with a fixed resumption token.
#[derive(Debug)]
pub struct StubRedirectProvider {
    /// Token of the login currently in flight, when begun in this process.
    inflight: Mutex<Option<ResumeToken>>,
    /// Session level established by the last completed login.
    session: Mutex<AuthLevel>,
}

impl StubRedirectProvider {
    /// Creates a redirect stub with no login in flight.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(None),
            session: Mutex::new(AuthLevel::None),
        }
    }
}

impl Default for StubRedirectProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for StubRedirectProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::new("stub-redirect")
    }

    fn required_level(&self) -> AuthLevel {
        AuthLevel::Full
    }

    fn check_session(&self) -> AuthLevel {
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn begin_login(&self, _ctx: &LoginContext) -> Result<UiEffect, AuthError> {
        let token = ResumeToken::new(STUB_REDIRECT_TOKEN);
        *self.inflight.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some(token.clone());
        Ok(UiEffect::Redirect {
            location: format!("https://idp.example/authorize?state={STUB_REDIRECT_TOKEN}"),
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
                "redirect provider expects a callback".to_string(),
            ));
        };
        let expected = resume_token.clone().or_else(|| {
            self.inflight.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
        });
        let Some(expected) = expected else {
            return Err(AuthError::NoLoginInFlight);
        };
        if params.get("state").map(String::as_str) != Some(expected.as_str()) {
            return Err(AuthError::CallbackMismatch);
        }
        let Some(subject) = params.get("subject") else {
            return Err(AuthError::MalformedCallback("missing subject".to_string()));
        };
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = AuthLevel::Full;
        Ok(Identity::full(SubjectId::new(subject.clone())))
    }

    fn logout(&self) {
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = AuthLevel::None;
        *self.inflight.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }
}

// ============================================================================
// SECTION: Callback Builders
// ============================================================================

/// Builds a credentials callback for the local stub.
#[must_use]
pub fn credentials(username: &str, secret: &str) -> CallbackData {
    CallbackData::Credentials {
        username: username.to_string(),
        secret: secret.to_string(),
    }
}

/// Builds redirect callback params carrying state and subject.
#[must_use]
pub fn callback_params(state: &str, subject: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("state".to_string(), state.to_string());
    params.insert("subject".to_string(), subject.to_string());
    params
}
