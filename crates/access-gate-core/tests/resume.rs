// access-gate-core/tests/resume.rs
// ============================================================================
// Module: Redirect Resume Tests
// Description: Tests for redirect-spanning persistence and rehydration.
// Purpose: Validate that pending requests survive loss of in-memory state.
// Dependencies: access-gate-core, access-gate-schema, serde_json
// ============================================================================

//! ## Overview
//! A redirect-based login destroys the in-memory machine. These tests
//! persist the pending queue plus resumption token before the redirect,
//! rebuild the machine from scratch, and verify the rehydrated flow replays
//! the post-authentication step as if it had never paused. Tampered
//! persisted state must fail closed.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

use std::collections::BTreeMap;

use access_gate_core::AccessGate;
use access_gate_core::AuthError;
use access_gate_core::DecisionOutcome;
use access_gate_core::GateState;
use access_gate_core::InMemoryResumeStore;
use access_gate_core::LoginOutcome;
use access_gate_core::OrchestratorConfig;
use access_gate_core::OrchestratorError;
use access_gate_core::ProviderId;
use access_gate_core::RecordingSink;
use access_gate_core::RequesterId;
use access_gate_core::ResumeState;
use access_gate_core::ResumeStore;
use access_gate_core::ResumeToken;
use access_gate_core::SubmitOutcome;
use access_gate_core::UiEffect;
use access_gate_schema::AttributeRegistry;
use serde_json::json;

use crate::common::AllowSet;
use crate::common::STUB_REDIRECT_TOKEN;
use crate::common::StubRedirectProvider;
use crate::common::callback_params;
use crate::common::event_for;
use crate::common::request;

/// Builds a gate over the redirect stub sharing the given store and sink.
fn redirect_gate(
    store: InMemoryResumeStore,
    sink: RecordingSink,
) -> AccessGate<StubRedirectProvider, AllowSet, InMemoryResumeStore, RecordingSink> {
    AccessGate::new(
        AttributeRegistry::new(),
        StubRedirectProvider::new(),
        AllowSet::granting(&["account/name"]),
        store,
        sink,
        OrchestratorConfig::default(),
    )
}

/// End-to-end redirect survival: persist, simulate reload, resume, decide.
#[test]
fn pending_request_survives_redirect_round_trip() {
    let store = InMemoryResumeStore::new();
    let sink = RecordingSink::new();
    sink.register(RequesterId::new("ui/report-1"));

    let mut first = redirect_gate(store.clone(), sink.clone());
    let outcome = first
        .submit(request("ui/report-1", event_for("ui/report-1"), &["account/name"]))
        .expect("request accepted");
    let SubmitOutcome::LoginStarted(UiEffect::Redirect {
        location,
        resume_token,
    }) = outcome
    else {
        panic!("expected redirect effect");
    };
    assert!(location.starts_with("https://idp.example/authorize"));
    assert_eq!(resume_token.as_str(), STUB_REDIRECT_TOKEN);

    let persisted = store.load().expect("store readable").expect("state persisted");
    assert_eq!(persisted.pending.len(), 1);
    assert_eq!(persisted.resume_token.as_str(), STUB_REDIRECT_TOKEN);
    drop(first);

    // Fresh machine, as after a full page reload: only the store survives.
    let mut second = redirect_gate(store.clone(), sink.clone());
    assert_eq!(second.state(), GateState::Unauthenticated);

    let report = second
        .resume(callback_params(STUB_REDIRECT_TOKEN, "ada"))
        .expect("resume succeeds");
    assert!(matches!(report.outcome, LoginOutcome::Established(_)));
    assert_eq!(second.state(), GateState::Authenticated);

    let delivered = sink.take(&RequesterId::new("ui/report-1"));
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].original_event, event_for("ui/report-1"));
    assert_eq!(delivered[0].outcome, DecisionOutcome::Granted);
    assert!(store.load().expect("store readable").is_none(), "resume clears the slot");
}

/// Requests submitted while the redirect is pending re-persist the queue.
#[test]
fn queue_grown_behind_redirect_is_repersisted() {
    let store = InMemoryResumeStore::new();
    let sink = RecordingSink::new();
    let mut gate = redirect_gate(store.clone(), sink);

    gate.submit(request("ui/report-1", event_for("ui/report-1"), &["account/name"]))
        .expect("first accepted");
    let queued = gate
        .submit(request("ui/settings-1", event_for("ui/settings-1"), &["account/name"]))
        .expect("second accepted");
    assert_eq!(queued, SubmitOutcome::Queued);

    let persisted = store.load().expect("store readable").expect("state persisted");
    assert_eq!(persisted.pending.len(), 2);
    assert_eq!(persisted.pending[0].requester_id, RequesterId::new("ui/report-1"));
    assert_eq!(persisted.pending[1].requester_id, RequesterId::new("ui/settings-1"));
}

/// A wrong callback state token fails the login and denies the queue.
#[test]
fn mismatched_callback_state_denies_rehydrated_queue() {
    let store = InMemoryResumeStore::new();
    let sink = RecordingSink::new();
    sink.register(RequesterId::new("ui/report-1"));

    let mut first = redirect_gate(store.clone(), sink.clone());
    first
        .submit(request("ui/report-1", event_for("ui/report-1"), &["account/name"]))
        .expect("request accepted");
    drop(first);

    let mut second = redirect_gate(store, sink.clone());
    let report = second
        .resume(callback_params("forged-token", "mallory"))
        .expect("resume runs");
    assert_eq!(report.outcome, LoginOutcome::Failed(AuthError::CallbackMismatch));
    assert_eq!(second.state(), GateState::Unauthenticated);

    let delivered = sink.take(&RequesterId::new("ui/report-1"));
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].outcome, DecisionOutcome::Denied);
}

/// Tampered persisted state fails integrity verification and fails closed.
#[test]
fn tampered_resume_state_fails_closed() {
    let store = InMemoryResumeStore::new();
    let sink = RecordingSink::new();
    sink.register(RequesterId::new("ui/report-1"));

    let mut first = redirect_gate(store.clone(), sink.clone());
    first
        .submit(request("ui/report-1", event_for("ui/report-1"), &["account/name"]))
        .expect("request accepted");
    drop(first);

    // Rewrite the persisted capability set behind the seal's back.
    let persisted = store.load().expect("store readable").expect("state persisted");
    let mut raw = serde_json::to_value(&persisted).expect("serialize persisted state");
    raw["pending"][0]["required_capabilities"] = json!(["account/ssn"]);
    let tampered: ResumeState = serde_json::from_value(raw).expect("deserialize tampered state");
    assert!(!tampered.verify().expect("verification runs"));
    store.save(&tampered).expect("store writable");

    let mut second = redirect_gate(store.clone(), sink.clone());
    let report = second
        .resume(callback_params(STUB_REDIRECT_TOKEN, "ada"))
        .expect("resume runs");
    assert!(matches!(report.outcome, LoginOutcome::Failed(AuthError::ResumeState(_))));
    assert_eq!(second.state(), GateState::Unauthenticated);
    assert!(store.load().expect("store readable").is_none(), "tampered slot cleared");

    let delivered = sink.take(&RequesterId::new("ui/report-1"));
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].outcome, DecisionOutcome::Denied);
}

/// Resuming with nothing persisted is an explicit error.
#[test]
fn resume_without_persisted_state_is_rejected() {
    let mut gate = redirect_gate(InMemoryResumeStore::new(), RecordingSink::new());
    let result = gate.resume(BTreeMap::new());
    assert!(matches!(result, Err(OrchestratorError::NothingToResume)));
}

/// Sealed resumption state round-trips losslessly through serde.
#[test]
fn sealed_resume_state_round_trips_losslessly() {
    let state = ResumeState::seal(
        ProviderId::new("stub-redirect"),
        ResumeToken::new(STUB_REDIRECT_TOKEN),
        vec![request("ui/report-1", event_for("ui/report-1"), &["account/name"])],
    )
    .expect("seal succeeds");
    assert!(state.verify().expect("verification runs"));

    let encoded = serde_json::to_string(&state).expect("serialize");
    let decoded: ResumeState = serde_json::from_str(&encoded).expect("deserialize");
    assert_eq!(decoded, state);
    assert!(decoded.verify().expect("verification runs"));
}
