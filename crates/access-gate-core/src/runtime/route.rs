// access-gate-core/src/runtime/route.rs
// ============================================================================
// Module: Route Control Contract
// Description: Consumer-side handling of denied navigation decisions.
// Purpose: Let a routing layer map Denied decisions onto navigation outcomes.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The core guarantees a deterministic, correlated Denied event; what the
//! routing layer does with it is its own choice. [`RouteGuard`] is a sink
//! decorator implementing that consumer contract: it forwards every decision
//! to the inner sink and records the configured [`RouteDisposition`] for each
//! denied navigation-gating requester.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RequesterId;
use crate::core::request::AccessDecision;
use crate::core::request::DecisionOutcome;
use crate::interfaces::DecisionSink;
use crate::interfaces::DeliveryReceipt;

// ============================================================================
// SECTION: Route Dispositions
// ============================================================================

/// Navigation outcome a router applies on a denied route.
///
/// # Invariants
/// - Variants are stable for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum RouteDisposition {
    /// Abort the route and return to the prior location.
    AbortNavigation,
    /// Render a permission-denied placement in the denied route's position.
    DeniedPlacement,
    /// Apply an application-specific alternative location.
    Alternate {
        /// Location the router navigates to instead.
        location: String,
    },
}

// ============================================================================
// SECTION: Route Guard
// ============================================================================

/// Sink decorator applying route dispositions to denied decisions.
#[derive(Debug)]
pub struct RouteGuard<D> {
    /// Inner sink every decision is forwarded to.
    inner: D,
    /// Per-requester disposition overrides.
    overrides: BTreeMap<RequesterId, RouteDisposition>,
    /// Disposition applied when no override exists.
    default: RouteDisposition,
    /// Dispositions applied so far, keyed by requester.
    applied: Mutex<BTreeMap<RequesterId, RouteDisposition>>,
}

impl<D> RouteGuard<D> {
    /// Creates a guard with the given default disposition.
    #[must_use]
    pub fn new(inner: D, default: RouteDisposition) -> Self {
        Self {
            inner,
            overrides: BTreeMap::new(),
            default,
            applied: Mutex::new(BTreeMap::new()),
        }
    }

    /// Sets a per-requester disposition override.
    #[must_use]
    pub fn with_disposition(mut self, requester_id: RequesterId, disposition: RouteDisposition) -> Self {
        self.overrides.insert(requester_id, disposition);
        self
    }

    /// Returns the disposition applied for a requester, if one was.
    #[must_use]
    pub fn applied_for(&self, requester_id: &RequesterId) -> Option<RouteDisposition> {
        self.guard().get(requester_id).cloned()
    }

    /// Acquires the applied-map guard, recovering a poisoned lock.
    fn guard(&self) -> MutexGuard<'_, BTreeMap<RequesterId, RouteDisposition>> {
        self.applied.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<D: DecisionSink> DecisionSink for RouteGuard<D> {
    fn deliver(&self, decision: &AccessDecision) -> DeliveryReceipt {
        if decision.outcome == DecisionOutcome::Denied {
            let disposition = self
                .overrides
                .get(&decision.requester_id)
                .cloned()
                .unwrap_or_else(|| self.default.clone());
            self.guard().insert(decision.requester_id.clone(), disposition);
        }
        self.inner.deliver(decision)
    }
}
