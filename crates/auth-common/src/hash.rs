//! One-way hashing of OTP codes and reset tokens
//!
//! Secrets compared through this hasher are never stored in plaintext; the
//! table column holds exactly one 64-hex-char SHA-256 digest.

use sha2::{Digest, Sha256};

/// Deterministic one-way hasher for short-lived secrets
///
/// The digest is unsalted to stay compatible with the stored format: the
/// column width is exactly one digest, so adding a per-record salt or a
/// keyed MAC requires a schema migration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretHasher;

impl SecretHasher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext secret to a 64-char lowercase hex digest
    #[must_use]
    pub fn hash(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compare a candidate secret against a stored digest
    #[must_use]
    pub fn matches(&self, candidate: &str, stored_digest: &str) -> bool {
        self.hash(candidate) == stored_digest
    }
}
