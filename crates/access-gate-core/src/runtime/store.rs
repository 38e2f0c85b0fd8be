// access-gate-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Runtime Implementations
// Description: Simple resume store and decision sink for tests and examples.
// Purpose: Provide deterministic implementations without external deps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of [`ResumeStore`] and
//! [`DecisionSink`] for tests and local demos. The sink only accepts
//! decisions for requesters that registered an inbox, which makes defunct
//! requesters observable as dropped deliveries. Neither implementation is
//! intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::identifiers::RequesterId;
use crate::core::request::AccessDecision;
use crate::core::session::ResumeState;
use crate::interfaces::DecisionSink;
use crate::interfaces::DeliveryReceipt;
use crate::interfaces::ResumeStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Resume Store
// ============================================================================

/// In-memory resume store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResumeStore {
    /// Single persisted slot protected by a mutex.
    slot: Arc<Mutex<Option<ResumeState>>>,
}

impl InMemoryResumeStore {
    /// Creates an empty in-memory resume store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the slot guard.
    fn guard(&self) -> Result<MutexGuard<'_, Option<ResumeState>>, StoreError> {
        self.slot.lock().map_err(|_| StoreError::Store("resume store mutex poisoned".to_string()))
    }
}

impl ResumeStore for InMemoryResumeStore {
    fn save(&self, state: &ResumeState) -> Result<(), StoreError> {
        *self.guard()? = Some(state.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<ResumeState>, StoreError> {
        Ok(self.guard()?.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.guard()? = None;
        Ok(())
    }
}

// ============================================================================
// SECTION: Recording Sink
// ============================================================================

/// In-memory decision sink keyed by registered requester inboxes.
///
/// # Invariants
/// - Deliveries to unregistered requesters report
///   [`DeliveryReceipt::Dropped`] and record nothing.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    /// Per-requester inboxes protected by a mutex.
    inboxes: Arc<Mutex<BTreeMap<RequesterId, Vec<AccessDecision>>>>,
}

impl RecordingSink {
    /// Creates a sink with no registered inboxes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an inbox for a requester.
    pub fn register(&self, requester_id: RequesterId) {
        self.guard().entry(requester_id).or_default();
    }

    /// Removes a requester's inbox, simulating its teardown.
    pub fn deregister(&self, requester_id: &RequesterId) {
        self.guard().remove(requester_id);
    }

    /// Takes every decision delivered to a requester so far.
    #[must_use]
    pub fn take(&self, requester_id: &RequesterId) -> Vec<AccessDecision> {
        self.guard().get_mut(requester_id).map_or_else(Vec::new, std::mem::take)
    }

    /// Acquires the inbox guard, recovering a poisoned lock.
    fn guard(&self) -> MutexGuard<'_, BTreeMap<RequesterId, Vec<AccessDecision>>> {
        self.inboxes.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DecisionSink for RecordingSink {
    fn deliver(&self, decision: &AccessDecision) -> DeliveryReceipt {
        let mut inboxes = self.guard();
        match inboxes.get_mut(&decision.requester_id) {
            Some(inbox) => {
                inbox.push(decision.clone());
                DeliveryReceipt::Delivered
            }
            None => DeliveryReceipt::Dropped,
        }
    }
}
