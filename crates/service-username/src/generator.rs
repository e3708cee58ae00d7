//! Anonymous persistent identifier generation.
//!
//! A persistent id is a one-way, salted, deterministic digest of a
//! principal's subject and an optional service scope:
//!
//! ```text
//! SHA-256( [scope_id "!"] subject "!" salt )  →  base64url (no padding)
//! ```
//!
//! The output is 43 URL-safe characters (256 bits). The same
//! (salt, subject, scope) triple always yields the same id; a different
//! salt yields an unrelated one. Rotating the salt therefore re-keys
//! every id previously issued under it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::{Salt, SaltSource, DEFAULT_SALT_LENGTH};
use crate::error::Result;
use crate::principal::Principal;
use crate::service::Service;

/// Separator between digest inputs.
const SEPARATOR: &[u8] = b"!";

/// Generates persistent pseudonymous identifiers from a fixed salt.
///
/// Holds no mutable state and is safe to share across threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersistentIdGenerator {
    salt: Salt,
    /// Principal attribute to derive the id from instead of the principal id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
}

impl PersistentIdGenerator {
    /// Create a generator over an explicit salt.
    pub fn new(salt: Salt) -> Self {
        Self {
            salt,
            attribute: None,
        }
    }

    /// Create a generator with a fresh random salt of the default length.
    pub fn with_random_salt(source: &mut impl SaltSource) -> Result<Self> {
        Ok(Self::new(source.next_salt(DEFAULT_SALT_LENGTH)?))
    }

    /// Derive ids from the first value of `attribute` when the principal has it.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// A copy of this generator under a different salt, keeping the subject attribute.
    ///
    /// Every id issued under the old salt is invalidated for the new generator.
    pub fn rekeyed(&self, salt: Salt) -> Self {
        Self {
            salt,
            attribute: self.attribute.clone(),
        }
    }

    /// The configured salt.
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// The configured subject attribute, if any.
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Generate the persistent id of `principal` within `scope`.
    pub fn generate(&self, principal: &Principal, scope: &dyn Service) -> String {
        let subject = self
            .attribute
            .as_deref()
            .and_then(|name| principal.first_attribute(name))
            .unwrap_or(principal.id.as_str());
        self.generate_for(subject, scope.id())
    }

    /// Generate the persistent id of a raw subject string.
    ///
    /// A blank or absent scope id contributes nothing to the digest.
    pub fn generate_for(&self, subject: &str, scope_id: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        if let Some(scope) = scope_id.filter(|s| !s.trim().is_empty()) {
            hasher.update(scope.as_bytes());
            hasher.update(SEPARATOR);
        }
        hasher.update(subject.as_bytes());
        hasher.update(SEPARATOR);
        hasher.update(self.salt.as_bytes());
        let digest = hasher.finalize();
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, digest)
    }
}
