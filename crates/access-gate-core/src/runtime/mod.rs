// access-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Access Gate Runtime
// Description: Orchestrator, runtime implementations, and consumer helpers.
// Purpose: Expose the state machine and its supporting runtime pieces.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime hosts the authorization orchestrator plus the in-memory
//! store/sink implementations, the route-control consumer contract, and the
//! row-redaction helper.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod orchestrator;
pub mod redact;
pub mod route;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use orchestrator::AccessGate;
pub use orchestrator::DeliveryRecord;
pub use orchestrator::LoginOutcome;
pub use orchestrator::LoginReport;
pub use orchestrator::OrchestratorConfig;
pub use orchestrator::OrchestratorError;
pub use orchestrator::SubmitOutcome;
pub use redact::redact_row;
pub use route::RouteDisposition;
pub use route::RouteGuard;
pub use store::InMemoryResumeStore;
pub use store::RecordingSink;
