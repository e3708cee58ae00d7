//! Salt material for persistent identifier generation.
//!
//! A salt is a per-service secret string mixed into the one-way hash.
//! It serializes as a plain string so registry persistence round-trips it
//! unchanged, but it never appears in `Debug` output or error messages.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ResolutionError, Result};

/// A non-blank salt string. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Salt(String);

impl Salt {
    /// Wrap a salt string, rejecting empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ResolutionError::Configuration(
                "salt must not be blank".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Raw salt bytes, as fed to the digest.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Expose the salt string. Callers own the responsibility of not logging it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Number of characters in the salt.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always false; blank salts are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short non-reversible fingerprint: hex of the first 4 bytes of SHA-256(salt).
    ///
    /// Safe to log; lets operators tell two salts apart without disclosing either.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt(<redacted> fp={})", self.fingerprint())
    }
}

impl TryFrom<String> for Salt {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Salt> for String {
    fn from(salt: Salt) -> Self {
        salt.0.clone()
    }
}
