//! Shared secret that authorizes certificate deletion.

use sha2::{Digest, Sha256};
use std::fmt;

/// Either a plain secret (compared by SHA-256 digest) or a bcrypt hash
/// produced by the `hash-password` binary.
#[derive(Clone)]
pub enum DeleteSecret {
    Plain(String),
    Bcrypt(String),
}

impl DeleteSecret {
    /// Reads `DELETE_PASSWORD_HASH`, falling back to `DELETE_PASSWORD`.
    pub fn from_env() -> Option<Self> {
        if let Ok(hash) = std::env::var("DELETE_PASSWORD_HASH") {
            if !hash.trim().is_empty() {
                return Some(DeleteSecret::Bcrypt(hash.trim().to_string()));
            }
        }

        std::env::var("DELETE_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty())
            .map(DeleteSecret::Plain)
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            DeleteSecret::Plain(expected) => {
                Sha256::digest(expected.as_bytes()) == Sha256::digest(candidate.as_bytes())
            }
            DeleteSecret::Bcrypt(hash) => bcrypt::verify(candidate, hash).unwrap_or_else(|e| {
                tracing::error!("Stored delete secret hash is unusable: {}", e);
                false
            }),
        }
    }
}

impl fmt::Debug for DeleteSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteSecret::Plain(_) => f.write_str("DeleteSecret::Plain(<redacted>)"),
            DeleteSecret::Bcrypt(_) => f.write_str("DeleteSecret::Bcrypt(<redacted>)"),
        }
    }
}
