// access-gate-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Authorization Orchestrator
// Description: Singleton state machine turning requests into correlated decisions.
// Purpose: Drive login sequences, hold the pending queue, and emit decisions.
// Dependencies: access-gate-schema, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`AccessGate`] is the single canonical execution path for authorization.
//! Requesting machines submit [`AccessRequest`]s; the gate decides whether
//! the current session suffices, drives the active provider's login sequence
//! when it does not (persisting resumption state before any redirect), and
//! answers every accepted request with exactly one correlated decision.
//!
//! Concurrent requesters interleave freely: requests queue FIFO behind an
//! in-flight login and drain in arrival order once it completes. Decisions
//! are correlated strictly by requester id plus the echoed original event,
//! never by arrival order alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;

use access_gate_schema::AttributeRegistry;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::HashError;
use crate::core::request::AccessDecision;
use crate::core::request::AccessRequest;
use crate::core::request::DecisionOutcome;
use crate::core::session::AuthLevel;
use crate::core::session::GateState;
use crate::core::session::Identity;
use crate::core::session::ResumeState;
use crate::core::session::ResumeToken;
use crate::interfaces::AuthError;
use crate::interfaces::AuthProvider;
use crate::interfaces::CallbackData;
use crate::interfaces::DecisionAuthority;
use crate::interfaces::DecisionSink;
use crate::interfaces::DeliveryReceipt;
use crate::interfaces::LoginContext;
use crate::interfaces::ResumeStore;
use crate::interfaces::StoreError;
use crate::interfaces::UiEffect;

// ============================================================================
// SECTION: Orchestrator Configuration
// ============================================================================

/// Default pending-queue limit.
const DEFAULT_MAX_PENDING: usize = 64;

/// Configuration for the authorization orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Hard limit on requests queued behind one login sequence.
    pub max_pending: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

// ============================================================================
// SECTION: Orchestrator Errors
// ============================================================================

/// Errors returned by orchestrator entry points.
///
/// # Invariants
/// - No variant leaves an accepted request unresolved: a request is either
///   rejected at intake (`QueueFull`) or eventually answered.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The pending queue is full; the request was not accepted.
    #[error("pending queue limit reached ({limit})")]
    QueueFull {
        /// Configured queue limit.
        limit: usize,
    },
    /// The resume store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Resumption state could not be sealed or verified.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// A login completion arrived with no login in flight.
    #[error("no login in flight")]
    NoLoginInFlight,
    /// A resume was requested but no resumption state is persisted.
    #[error("no persisted login to resume")]
    NothingToResume,
}

// ============================================================================
// SECTION: Outcome Reports
// ============================================================================

/// Result of submitting one authorization request.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The request was evaluated immediately; the decision was delivered.
    Decided(AccessDecision),
    /// The request was queued and a login sequence was started.
    LoginStarted(UiEffect),
    /// The request was queued behind an already-running login sequence.
    Queued,
}

/// Terminal result of a login sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// The provider established an identity.
    Established(Identity),
    /// The provider reported a failure; every queued request was denied.
    Failed(AuthError),
}

/// One delivered decision with its delivery receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// The correlated decision.
    pub decision: AccessDecision,
    /// Receipt reported by the sink.
    pub receipt: DeliveryReceipt,
}

/// Report of a completed (or failed) login and the decisions it released.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginReport {
    /// How the login sequence ended.
    pub outcome: LoginOutcome,
    /// Decisions released by the completion, in original arrival order.
    pub delivered: Vec<DeliveryRecord>,
}

// ============================================================================
// SECTION: Access Gate
// ============================================================================

/// Authorization orchestration state machine.
///
/// # Invariants
/// - The pending queue and session state are owned exclusively by this
///   machine; it is a single logical owner and is not internally parallel.
/// - Every accepted request yields exactly one decision.
pub struct AccessGate<P, A, S, D> {
    /// Attribute registry used to resolve capability symbols.
    registry: AttributeRegistry,
    /// Active authentication provider.
    provider: P,
    /// Pluggable authorization authority.
    authority: A,
    /// Durable store for redirect-spanning resumption state.
    store: S,
    /// Delivery seam for correlated decisions.
    sink: D,
    /// Orchestrator configuration.
    config: OrchestratorConfig,
    /// Current machine state.
    state: GateState,
    /// Identity established by the last completed login.
    identity: Option<Identity>,
    /// Requests queued behind the in-flight login, in arrival order.
    pending: VecDeque<AccessRequest>,
    /// Resumption token of the in-flight redirect, when one is pending.
    inflight_token: Option<ResumeToken>,
}

impl<P, A, S, D> AccessGate<P, A, S, D>
where
    P: AuthProvider,
    A: DecisionAuthority,
    S: ResumeStore,
    D: DecisionSink,
{
    /// Creates a gate over the given collaborators.
    ///
    /// The initial state adopts an existing provider session when its level
    /// already satisfies the provider's requirement.
    #[must_use]
    pub fn new(
        registry: AttributeRegistry,
        provider: P,
        authority: A,
        store: S,
        sink: D,
        config: OrchestratorConfig,
    ) -> Self {
        let state = if provider.check_session() >= provider.required_level()
            && provider.check_session() > AuthLevel::None
        {
            GateState::Authenticated
        } else {
            GateState::Unauthenticated
        };
        Self {
            registry,
            provider,
            authority,
            store,
            sink,
            config,
            state,
            identity: None,
            pending: VecDeque::new(),
            inflight_token: None,
        }
    }

    /// Returns the current machine state.
    #[must_use]
    pub const fn state(&self) -> GateState {
        self.state
    }

    /// Returns the identity established by the last completed login.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns the number of requests queued behind the in-flight login.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns the decision sink for consumer-side inspection.
    #[must_use]
    pub const fn sink(&self) -> &D {
        &self.sink
    }

    /// Submits an authorization request.
    ///
    /// A sufficient session evaluates the request immediately; otherwise the
    /// request queues and a login sequence starts (or is joined). When the
    /// provider's sequence is redirect-based, the whole pending queue plus
    /// the resumption token is persisted before the effect is surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::QueueFull`] when the request cannot be
    /// accepted. Every accepted request eventually yields one decision.
    pub fn submit(&mut self, request: AccessRequest) -> Result<SubmitOutcome, OrchestratorError> {
        if self.pending.len() >= self.config.max_pending {
            return Err(OrchestratorError::QueueFull {
                limit: self.config.max_pending,
            });
        }

        if self.state == GateState::Authenticating {
            self.pending.push_back(request);
            if let Some(token) = self.inflight_token.clone() {
                self.persist_pending(&token);
            }
            return Ok(SubmitOutcome::Queued);
        }

        if self.session_sufficient() {
            let record = self.evaluate_and_deliver(&request);
            return Ok(SubmitOutcome::Decided(record.decision));
        }

        self.pending.push_back(request.clone());
        self.transition(GateState::Authenticating);
        let ctx = LoginContext {
            triggered_by: request.requester_id.clone(),
            pending: self.pending.len(),
        };
        match self.provider.begin_login(&ctx) {
            Ok(UiEffect::Redirect {
                location,
                resume_token,
            }) => {
                self.persist_pending(&resume_token);
                self.inflight_token = Some(resume_token.clone());
                Ok(SubmitOutcome::LoginStarted(UiEffect::Redirect {
                    location,
                    resume_token,
                }))
            }
            Ok(effect) => Ok(SubmitOutcome::LoginStarted(effect)),
            Err(err) => {
                tracing::warn!(error = %err, "login sequence failed to start");
                let mut delivered = self.deny_all_pending();
                self.transition(GateState::Unauthenticated);
                let decision = delivered.pop().map_or_else(
                    || AccessDecision::answering(&request, DecisionOutcome::Denied),
                    |record| record.decision,
                );
                Ok(SubmitOutcome::Decided(decision))
            }
        }
    }

    /// Completes the in-flight login with a provider callback.
    ///
    /// Success drains the pending queue in arrival order, evaluating each
    /// request in isolation; failure routes every queued request to Denied.
    /// Either way the queue is never left unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::NoLoginInFlight`] when no login sequence
    /// is in progress.
    pub fn complete_login(
        &mut self,
        callback: &CallbackData,
    ) -> Result<LoginReport, OrchestratorError> {
        if self.state != GateState::Authenticating {
            return Err(OrchestratorError::NoLoginInFlight);
        }
        Ok(self.finish_login(callback))
    }

    /// Resumes a redirect-spanning login after loss of in-memory state.
    ///
    /// The persisted queue and resumption token are rehydrated (verifying
    /// the integrity seal; a mismatch fails closed, denying every rehydrated
    /// request), and the post-authentication step replays as if the machine
    /// had never paused.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::NothingToResume`] when no state is
    /// persisted, or [`OrchestratorError::Store`]/[`OrchestratorError::Hash`]
    /// when it cannot be read.
    pub fn resume(
        &mut self,
        params: BTreeMap<String, String>,
    ) -> Result<LoginReport, OrchestratorError> {
        let Some(persisted) = self.store.load()? else {
            return Err(OrchestratorError::NothingToResume);
        };
        if !persisted.verify()? {
            tracing::warn!("persisted resumption state failed integrity verification");
            self.clear_store();
            self.pending = persisted.pending.into();
            let delivered = self.deny_all_pending();
            self.transition(GateState::Unauthenticated);
            return Ok(LoginReport {
                outcome: LoginOutcome::Failed(AuthError::ResumeState(
                    "integrity digest mismatch".to_string(),
                )),
                delivered,
            });
        }

        self.pending = persisted.pending.into();
        self.inflight_token = Some(persisted.resume_token.clone());
        self.transition(GateState::Authenticating);
        let callback = CallbackData::RedirectReturn {
            resume_token: Some(persisted.resume_token),
            params,
        };
        Ok(self.finish_login(&callback))
    }

    /// Logs out, clearing the session and denying anything still pending.
    pub fn logout(&mut self) -> Vec<DeliveryRecord> {
        self.provider.logout();
        self.identity = None;
        self.inflight_token = None;
        self.clear_store();
        let delivered = self.deny_all_pending();
        self.transition(GateState::Unauthenticated);
        delivered
    }

    /// Shared completion path for in-process callbacks and resumed flows.
    fn finish_login(&mut self, callback: &CallbackData) -> LoginReport {
        match self.provider.complete_login(callback) {
            Ok(identity) => {
                self.identity = Some(identity.clone());
                self.inflight_token = None;
                self.clear_store();
                self.transition(GateState::Authenticated);
                let delivered = self.drain_pending();
                LoginReport {
                    outcome: LoginOutcome::Established(identity),
                    delivered,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "login completion failed; denying queued requests");
                self.inflight_token = None;
                self.clear_store();
                let delivered = self.deny_all_pending();
                self.transition(GateState::Unauthenticated);
                LoginReport {
                    outcome: LoginOutcome::Failed(err),
                    delivered,
                }
            }
        }
    }

    /// Evaluates queued requests in arrival order, delivering each decision.
    fn drain_pending(&mut self) -> Vec<DeliveryRecord> {
        let mut delivered = Vec::with_capacity(self.pending.len());
        while let Some(request) = self.pending.pop_front() {
            delivered.push(self.evaluate_and_deliver(&request));
        }
        delivered
    }

    /// Denies every queued request, delivering each decision.
    fn deny_all_pending(&mut self) -> Vec<DeliveryRecord> {
        let mut delivered = Vec::with_capacity(self.pending.len());
        while let Some(request) = self.pending.pop_front() {
            let decision = AccessDecision::answering(&request, DecisionOutcome::Denied);
            let receipt = self.sink.deliver(&decision);
            delivered.push(DeliveryRecord { decision, receipt });
        }
        delivered
    }

    /// Evaluates one request against the current identity and delivers the
    /// correlated decision.
    fn evaluate_and_deliver(&mut self, request: &AccessRequest) -> DeliveryRecord {
        let resting = self.resting_state();
        self.transition(GateState::Authorizing);
        let outcome = self.evaluate(request);
        let decision = AccessDecision::answering(request, outcome);
        let receipt = self.sink.deliver(&decision);
        self.transition(resting);
        DeliveryRecord { decision, receipt }
    }

    /// Evaluates a capability set against the current identity.
    ///
    /// A request is granted only when every capability in the set is
    /// satisfied; there is no partial grant.
    fn evaluate(&self, request: &AccessRequest) -> DecisionOutcome {
        let identity = self.identity.as_ref();
        let granted = request.required_capabilities.iter().all(|capability| {
            if self.registry.lookup(capability).is_none() {
                tracing::debug!(capability = %capability, "capability has no descriptor; treated as mutation symbol");
            }
            self.authority.permits(identity, capability)
        });
        if granted {
            DecisionOutcome::Granted
        } else {
            DecisionOutcome::Denied
        }
    }

    /// Returns the resting state matching the current session.
    fn resting_state(&self) -> GateState {
        if self.identity.is_some() || self.provider.check_session() > AuthLevel::None {
            GateState::Authenticated
        } else {
            GateState::Unauthenticated
        }
    }

    /// Returns true when the current session suffices for evaluation.
    fn session_sufficient(&self) -> bool {
        let level = self
            .identity
            .as_ref()
            .map_or_else(|| self.provider.check_session(), |identity| identity.level);
        level >= self.provider.required_level()
    }

    /// Persists the pending queue under the given resumption token.
    ///
    /// Persistence failures are non-fatal here: the queue stays in memory
    /// and the login continues, so a same-process completion still resolves
    /// every request. Only a reload would lose the queue.
    fn persist_pending(&self, token: &ResumeToken) {
        let pending: Vec<AccessRequest> = self.pending.iter().cloned().collect();
        let sealed =
            ResumeState::seal(self.provider.provider_id(), token.clone(), pending).map_err(
                |err| StoreError::Serialize(err.to_string()),
            );
        match sealed.and_then(|state| self.store.save(&state)) {
            Ok(()) => {}
            Err(err) => {
                tracing::warn!(error = %err, "failed to persist resumption state before redirect");
            }
        }
    }

    /// Clears persisted resumption state, tolerating store failures.
    fn clear_store(&self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear persisted resumption state");
        }
    }

    /// Records a state transition.
    fn transition(&mut self, to: GateState) {
        if self.state != to {
            tracing::debug!(from = ?self.state, to = ?to, "gate transition");
            self.state = to;
        }
    }
}
