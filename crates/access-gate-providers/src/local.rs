// access-gate-providers/src/local.rs
// ============================================================================
// Module: Local Provider
// Description: Synchronous in-UI credential provider.
// Purpose: Authenticate against an injected credential verifier without redirects.
// Dependencies: access-gate-core, subtle
// ============================================================================

//! ## Overview
//! The local provider gathers credentials in-UI and completes synchronously.
//! Credential checking is delegated to an injected [`CredentialVerifier`]
//! capability; [`StaticCredentials`] ships as the in-memory implementation
//! used by configuration and tests, comparing secrets in constant time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use access_gate_core::AuthError;
use access_gate_core::AuthLevel;
use access_gate_core::AuthProvider;
use access_gate_core::CallbackData;
use access_gate_core::Identity;
use access_gate_core::LoginContext;
use access_gate_core::ProviderId;
use access_gate_core::SubjectId;
use access_gate_core::UiEffect;
use subtle::ConstantTimeEq;

// ============================================================================
// SECTION: Credential Verifier
// ============================================================================

/// Capability checking a username/secret pair.
///
/// Hashing and storage of real credentials live behind this seam; the
/// provider never sees how verification is implemented.
pub trait CredentialVerifier: Send + Sync {
    /// Returns true when the pair is valid.
    fn verify(&self, username: &str, secret: &str) -> bool;
}

/// In-memory credential table comparing secrets in constant time.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    /// Expected secret per username.
    entries: BTreeMap<String, String>,
}

impl StaticCredentials {
    /// Creates an empty credential table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one username/secret entry.
    #[must_use]
    pub fn with_entry(mut self, username: impl Into<String>, secret: impl Into<String>) -> Self {
        self.entries.insert(username.into(), secret.into());
        self
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, secret: &str) -> bool {
        self.entries
            .get(username)
            .is_some_and(|expected| expected.as_bytes().ct_eq(secret.as_bytes()).into())
    }
}

// ============================================================================
// SECTION: Local Provider
// ============================================================================

/// Synchronous credential provider without redirects.
///
/// # Invariants
/// - Owns only its session marker; the pending queue belongs to the
///   orchestrator.
#[derive(Debug)]
pub struct LocalProvider<V> {
    /// Minimum level required before authorization decisions run.
    required: AuthLevel,
    /// Injected credential verifier.
    verifier: V,
    /// Identity established by the last completed login.
    session: Mutex<Option<Identity>>,
}

impl<V: CredentialVerifier> LocalProvider<V> {
    /// Creates a local provider requiring full authentication.
    #[must_use]
    pub fn new(verifier: V) -> Self {
        Self::with_required_level(verifier, AuthLevel::Full)
    }

    /// Creates a local provider with an explicit level requirement.
    #[must_use]
    pub fn with_required_level(verifier: V, required: AuthLevel) -> Self {
        Self {
            required,
            verifier,
            session: Mutex::new(None),
        }
    }

    /// Reads the session marker, recovering a poisoned lock.
    fn session_identity(&self) -> Option<Identity> {
        self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Replaces the session marker, recovering a poisoned lock.
    fn set_session(&self, identity: Option<Identity>) {
        *self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = identity;
    }
}

impl<V: CredentialVerifier> AuthProvider for LocalProvider<V> {
    fn provider_id(&self) -> ProviderId {
        ProviderId::new("local")
    }

    fn required_level(&self) -> AuthLevel {
        self.required
    }

    fn check_session(&self) -> AuthLevel {
        self.session_identity().map_or(AuthLevel::None, |identity| identity.level)
    }

    fn begin_login(&self, _ctx: &LoginContext) -> Result<UiEffect, AuthError> {
        Ok(UiEffect::CredentialPrompt {
            provider_id: self.provider_id(),
        })
    }

    fn complete_login(&self, callback: &CallbackData) -> Result<Identity, AuthError> {
        let CallbackData::Credentials { username, secret } = callback else {
            return Err(AuthError::MalformedCallback(
                "local provider expects in-UI credentials".to_string(),
            ));
        };
        if !self.verifier.verify(username, secret) {
            return Err(AuthError::InvalidCredentials);
        }
        let identity = Identity::full(SubjectId::new(username.clone()));
        self.set_session(Some(identity.clone()));
        Ok(identity)
    }

    fn logout(&self) {
        self.set_session(None);
    }
}
