// access-gate-providers/src/config.rs
// ============================================================================
// Module: Provider Selection Configuration
// Description: Configuration loading and validation for built-in providers.
// Purpose: Select and build the active provider with strict, fail-closed checks.
// Dependencies: access-gate-core, serde, url
// ============================================================================

//! ## Overview
//! Hosts select the active authentication mechanism through configuration,
//! never by runtime type inspection. [`AccessGateConfig`] deserializes from
//! the host's config source, validates fail-closed (unknown shapes, empty
//! credential tables, non-https endpoints, and oversized limits are all
//! rejected), and builds the [`SelectedProvider`] the orchestrator runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use access_gate_core::AuthError;
use access_gate_core::AuthLevel;
use access_gate_core::AuthProvider;
use access_gate_core::CallbackData;
use access_gate_core::Identity;
use access_gate_core::LoginContext;
use access_gate_core::OrchestratorConfig;
use access_gate_core::ProviderId;
use access_gate_core::UiEffect;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::local::LocalProvider;
use crate::local::StaticCredentials;
use crate::redirect::RedirectProvider;
use crate::redirect::RedirectProviderConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of static credential entries.
pub(crate) const MAX_CREDENTIAL_ENTRIES: usize = 1024;
/// Maximum allowed pending-queue limit.
pub(crate) const MAX_PENDING_LIMIT: usize = 4_096;
/// Default pending-queue limit when unspecified.
const DEFAULT_PENDING_LIMIT: usize = 64;

/// Returns the default pending-queue limit for serde.
const fn default_pending_limit() -> usize {
    DEFAULT_PENDING_LIMIT
}

/// Returns the default required level for the local provider.
const fn full_level() -> AuthLevel {
    AuthLevel::Full
}

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Errors raised by configuration validation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The local provider has no credential entries.
    #[error("local provider requires at least one credential entry")]
    EmptyCredentials,
    /// The credential table exceeds the hard limit.
    #[error("too many credential entries ({count} > {limit})")]
    TooManyCredentials {
        /// Configured entry count.
        count: usize,
        /// Hard limit.
        limit: usize,
    },
    /// A credential entry has an empty username.
    #[error("credential entry has an empty username")]
    EmptyUsername,
    /// The authorize endpoint is not a valid absolute URL.
    #[error("invalid authorize endpoint: {0}")]
    InvalidEndpoint(String),
    /// The authorize endpoint does not use https.
    #[error("authorize endpoint must use https: {0}")]
    InsecureEndpoint(String),
    /// The client identifier is empty.
    #[error("redirect provider requires a client id")]
    EmptyClientId,
    /// The return location is not a valid absolute URL.
    #[error("invalid return location: {0}")]
    InvalidReturnTo(String),
    /// The pending-queue limit is zero.
    #[error("pending queue limit must be nonzero")]
    ZeroQueueLimit,
    /// The pending-queue limit exceeds the hard limit.
    #[error("pending queue limit too large ({limit} > {max})")]
    QueueLimitTooLarge {
        /// Configured limit.
        limit: usize,
        /// Hard limit.
        max: usize,
    },
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// One static credential entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Username of the entry.
    pub username: String,
    /// Secret of the entry.
    pub secret: String,
}

/// Provider selection, tagged by mechanism kind.
///
/// # Invariants
/// - Unknown kinds fail deserialization; there is no permissive fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderSelection {
    /// Local in-UI credential provider.
    Local {
        /// Static credential entries accepted by the provider.
        credentials: Vec<CredentialEntry>,
        /// Minimum level required before authorization decisions run.
        #[serde(default = "full_level")]
        required_level: AuthLevel,
    },
    /// Redirect-based external identity provider.
    Redirect {
        /// Absolute authorize endpoint of the identity provider.
        authorize_endpoint: String,
        /// Client identifier registered with the identity provider.
        client_id: String,
        /// Absolute location the callback returns to.
        return_to: String,
    },
}

/// Top-level Access Gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessGateConfig {
    /// Active provider selection.
    pub provider: ProviderSelection,
    /// Hard limit on requests queued behind one login sequence.
    #[serde(default = "default_pending_limit")]
    pub max_pending: usize,
}

impl AccessGateConfig {
    /// Validates the configuration, failing closed on any defect.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pending == 0 {
            return Err(ConfigError::ZeroQueueLimit);
        }
        if self.max_pending > MAX_PENDING_LIMIT {
            return Err(ConfigError::QueueLimitTooLarge {
                limit: self.max_pending,
                max: MAX_PENDING_LIMIT,
            });
        }
        match &self.provider {
            ProviderSelection::Local { credentials, .. } => {
                if credentials.is_empty() {
                    return Err(ConfigError::EmptyCredentials);
                }
                if credentials.len() > MAX_CREDENTIAL_ENTRIES {
                    return Err(ConfigError::TooManyCredentials {
                        count: credentials.len(),
                        limit: MAX_CREDENTIAL_ENTRIES,
                    });
                }
                if credentials.iter().any(|entry| entry.username.is_empty()) {
                    return Err(ConfigError::EmptyUsername);
                }
                Ok(())
            }
            ProviderSelection::Redirect {
                authorize_endpoint,
                client_id,
                return_to,
            } => {
                let endpoint = Url::parse(authorize_endpoint)
                    .map_err(|_| ConfigError::InvalidEndpoint(authorize_endpoint.clone()))?;
                if endpoint.scheme() != "https" {
                    return Err(ConfigError::InsecureEndpoint(authorize_endpoint.clone()));
                }
                if client_id.is_empty() {
                    return Err(ConfigError::EmptyClientId);
                }
                Url::parse(return_to)
                    .map_err(|_| ConfigError::InvalidReturnTo(return_to.clone()))?;
                Ok(())
            }
        }
    }

    /// Builds the selected provider after validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn build_provider(&self) -> Result<SelectedProvider, ConfigError> {
        self.validate()?;
        match &self.provider {
            ProviderSelection::Local {
                credentials,
                required_level,
            } => {
                let verifier = credentials.iter().fold(
                    StaticCredentials::new(),
                    |table, entry| table.with_entry(entry.username.clone(), entry.secret.clone()),
                );
                Ok(SelectedProvider::Local(LocalProvider::with_required_level(
                    verifier,
                    *required_level,
                )))
            }
            ProviderSelection::Redirect {
                authorize_endpoint,
                client_id,
                return_to,
            } => Ok(SelectedProvider::Redirect(RedirectProvider::new(RedirectProviderConfig {
                authorize_endpoint: authorize_endpoint.clone(),
                client_id: client_id.clone(),
                return_to: return_to.clone(),
            }))),
        }
    }

    /// Returns the orchestrator configuration carried by this config.
    #[must_use]
    pub const fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_pending: self.max_pending,
        }
    }
}

// ============================================================================
// SECTION: Selected Provider
// ============================================================================

/// Provider variant built from configuration.
///
/// Variant dispatch happens here, once, at the configuration boundary; the
/// orchestrator only ever sees the [`AuthProvider`] contract.
#[derive(Debug)]
pub enum SelectedProvider {
    /// Local in-UI credential provider.
    Local(LocalProvider<StaticCredentials>),
    /// Redirect-based external identity provider.
    Redirect(RedirectProvider),
}

impl AuthProvider for SelectedProvider {
    fn provider_id(&self) -> ProviderId {
        match self {
            Self::Local(provider) => provider.provider_id(),
            Self::Redirect(provider) => provider.provider_id(),
        }
    }

    fn required_level(&self) -> AuthLevel {
        match self {
            Self::Local(provider) => provider.required_level(),
            Self::Redirect(provider) => provider.required_level(),
        }
    }

    fn check_session(&self) -> AuthLevel {
        match self {
            Self::Local(provider) => provider.check_session(),
            Self::Redirect(provider) => provider.check_session(),
        }
    }

    fn begin_login(&self, ctx: &LoginContext) -> Result<UiEffect, AuthError> {
        match self {
            Self::Local(provider) => provider.begin_login(ctx),
            Self::Redirect(provider) => provider.begin_login(ctx),
        }
    }

    fn complete_login(&self, callback: &CallbackData) -> Result<Identity, AuthError> {
        match self {
            Self::Local(provider) => provider.complete_login(callback),
            Self::Redirect(provider) => provider.complete_login(callback),
        }
    }

    fn logout(&self) {
        match self {
            Self::Local(provider) => provider.logout(),
            Self::Redirect(provider) => provider.logout(),
        }
    }
}
