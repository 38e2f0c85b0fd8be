// access-gate-providers/tests/redirect_provider.rs
// ============================================================================
// Module: Redirect Provider Tests
// Description: Tests for the OAuth/OIDC-style redirect provider.
// Purpose: Validate authorize-location construction and callback validation.
// Dependencies: access-gate-providers, access-gate-core, url
// ============================================================================

//! ## Overview
//! Tests the redirect provider for:
//! - Happy path: authorize location carries client, return, and state params
//! - Callback validation: state mismatch, missing parameters, no login
//! - Rehydrated completion: a fresh instance accepts the persisted token
//!
//! Security posture: callback parameters arrive from outside the
//! application and are validated fail-closed.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use access_gate_core::AuthError;
use access_gate_core::AuthLevel;
use access_gate_core::AuthProvider;
use access_gate_core::CallbackData;
use access_gate_core::LoginContext;
use access_gate_core::RequesterId;
use access_gate_core::ResumeToken;
use access_gate_core::UiEffect;
use access_gate_providers::RedirectProvider;
use access_gate_providers::RedirectProviderConfig;
use url::Url;

/// Builds a provider over fixture endpoint settings.
fn provider() -> RedirectProvider {
    RedirectProvider::new(RedirectProviderConfig {
        authorize_endpoint: "https://idp.example/authorize".to_string(),
        client_id: "gate".to_string(),
        return_to: "https://app.example/auth/return".to_string(),
    })
}

/// Builds a login context fixture.
fn ctx() -> LoginContext {
    LoginContext {
        triggered_by: RequesterId::new("ui/test"),
        pending: 1,
    }
}

/// Begins a login and returns the redirect location plus token.
fn begin(provider: &RedirectProvider) -> (Url, ResumeToken) {
    let UiEffect::Redirect {
        location,
        resume_token,
    } = provider.begin_login(&ctx()).expect("login begins")
    else {
        panic!("expected redirect effect");
    };
    (Url::parse(&location).expect("location parses"), resume_token)
}

/// Builds callback params with the given state.
fn params(state: &str, subject: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("state".to_string(), state.to_string());
    params.insert("code".to_string(), "authcode-1".to_string());
    params.insert("subject".to_string(), subject.to_string());
    params
}

/// Tests that the authorize location carries the handoff parameters.
#[test]
fn authorize_location_carries_handoff_params() {
    let provider = provider();
    let (location, token) = begin(&provider);

    assert_eq!(location.host_str(), Some("idp.example"));
    assert_eq!(location.path(), "/authorize");
    let pairs: BTreeMap<String, String> =
        location.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
    assert_eq!(pairs.get("client_id").map(String::as_str), Some("gate"));
    assert_eq!(
        pairs.get("redirect_uri").map(String::as_str),
        Some("https://app.example/auth/return")
    );
    assert_eq!(pairs.get("state").map(String::as_str), Some(token.as_str()));
}

/// Tests same-process completion against the in-memory in-flight token.
#[test]
fn same_process_completion_uses_inflight_token() {
    let provider = provider();
    let (_, token) = begin(&provider);

    let identity = provider
        .complete_login(&CallbackData::RedirectReturn {
            resume_token: None,
            params: params(token.as_str(), "ada"),
        })
        .expect("callback accepted");
    assert_eq!(identity.subject_id.as_str(), "ada");
    assert_eq!(provider.check_session(), AuthLevel::Full);
}

/// Tests rehydrated completion on a fresh instance with the persisted token.
#[test]
fn fresh_instance_accepts_rehydrated_token() {
    let first = provider();
    let (_, token) = begin(&first);
    drop(first);

    // As after a reload: a new provider instance with no in-memory state.
    let second = provider();
    let identity = second
        .complete_login(&CallbackData::RedirectReturn {
            resume_token: Some(token.clone()),
            params: params(token.as_str(), "ada"),
        })
        .expect("rehydrated callback accepted");
    assert_eq!(identity.subject_id.as_str(), "ada");
}

/// Tests that a forged state parameter fails closed.
#[test]
fn forged_state_is_rejected() {
    let provider = provider();
    let (_, _token) = begin(&provider);

    let result = provider.complete_login(&CallbackData::RedirectReturn {
        resume_token: None,
        params: params("forged", "mallory"),
    });
    assert_eq!(result, Err(AuthError::CallbackMismatch));
}

/// Tests that structurally incomplete callbacks are malformed.
#[test]
fn incomplete_callbacks_are_malformed() {
    let provider = provider();
    let (_, token) = begin(&provider);

    let mut missing_code = params(token.as_str(), "ada");
    missing_code.remove("code");
    assert!(matches!(
        provider.complete_login(&CallbackData::RedirectReturn {
            resume_token: None,
            params: missing_code,
        }),
        Err(AuthError::MalformedCallback(_))
    ));

    let mut missing_subject = params(token.as_str(), "ada");
    missing_subject.remove("subject");
    assert!(matches!(
        provider.complete_login(&CallbackData::RedirectReturn {
            resume_token: None,
            params: missing_subject,
        }),
        Err(AuthError::MalformedCallback(_))
    ));
}

/// Tests that completion without any login in flight is rejected.
#[test]
fn completion_without_login_is_rejected() {
    let provider = provider();
    let result = provider.complete_login(&CallbackData::RedirectReturn {
        resume_token: None,
        params: params("anything", "ada"),
    });
    assert_eq!(result, Err(AuthError::NoLoginInFlight));
}

/// Tests that an unparseable endpoint fails login start.
#[test]
fn bad_endpoint_fails_login_start() {
    let provider = RedirectProvider::new(RedirectProviderConfig {
        authorize_endpoint: "not a url".to_string(),
        client_id: "gate".to_string(),
        return_to: "https://app.example/auth/return".to_string(),
    });
    assert!(matches!(provider.begin_login(&ctx()), Err(AuthError::Unreachable(_))));
}
