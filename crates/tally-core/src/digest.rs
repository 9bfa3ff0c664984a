//! One-way password digesting.
//!
//! SHA-256 over the plaintext, hex-encoded. Deterministic: the same input
//! always yields the same digest, which is what the store's uniqueness and
//! re-digest-on-update semantics assume.

use sha2::{Digest as _, Sha256};

/// Digest a plaintext password for storage. The plaintext is never persisted.
pub fn digest_password(plaintext: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(plaintext.as_bytes());
  hex::encode(hasher.finalize())
}
