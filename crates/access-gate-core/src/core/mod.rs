// access-gate-core/src/core/mod.rs
// ============================================================================
// Module: Access Gate Core Types
// Description: Canonical protocol and session structures.
// Purpose: Provide stable, serializable types for requests, decisions, and sessions.
// Dependencies: access-gate-schema, serde
// ============================================================================

//! ## Overview
//! Access Gate core types define the request/decision protocol, the
//! identifiers that correlate them, the authentication-session model, and
//! the sealed resumption state that survives a redirect round-trip. These
//! types are the canonical source of truth for any host integration.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod identifiers;
pub mod request;
pub mod session;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::hash_bytes;
pub use hashing::hash_canonical_json;
pub use identifiers::ProviderId;
pub use identifiers::RequesterId;
pub use identifiers::SubjectId;
pub use request::AccessDecision;
pub use request::AccessRequest;
pub use request::DecisionOutcome;
pub use session::AuthLevel;
pub use session::GateState;
pub use session::Identity;
pub use session::ResumeState;
pub use session::ResumeToken;
