// access-gate-core/src/core/hashing.rs
// ============================================================================
// Module: Canonical Hashing
// Description: RFC 8785 JSON canonicalization and digest helpers.
// Purpose: Seal persisted resumption state against client-side tampering.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Resumption state survives a redirect round-trip in durable client-side
//! storage, which makes it untrusted input on the way back in. The core
//! seals that state with a SHA-256 digest over its RFC 8785 (JCS) canonical
//! JSON form and verifies the digest before rehydrating.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical digests.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Deterministic SHA-256 content digest.
///
/// # Invariants
/// - `value` is the lowercase hex encoding of the digest bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashDigest {
    /// Lowercase hex-encoded digest bytes.
    value: String,
}

impl HashDigest {
    /// Returns the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Hashes a serializable value over its canonical JSON bytes.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<HashDigest, HashError> {
    let bytes =
        serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))?;
    Ok(hash_bytes(&bytes))
}

/// Hashes raw bytes with SHA-256.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> HashDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    HashDigest {
        value: hex_encode(&hasher.finalize()),
    }
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
