//! Cryptographic primitives for persistent identifiers.
//!
//! This module provides:
//! - The `Salt` secret newtype (redacted `Debug`, zeroized on drop)
//! - Injectable salt sources backed by a cryptographically secure RNG

pub mod random;
pub mod salt;

pub use random::{RngSaltSource, SaltSource, ThreadRngSaltSource, DEFAULT_SALT_LENGTH};
pub use salt::Salt;
