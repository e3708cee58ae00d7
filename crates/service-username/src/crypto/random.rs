//! Salt sources.
//!
//! Random salts are drawn from a cryptographically secure RNG via `rand`.
//! The source is a trait so callers (and tests) can inject their own
//! randomness instead of relying on the thread-local generator.

use rand::distributions::Alphanumeric;
use rand::Rng;
use rand_core::{CryptoRng, RngCore};

use crate::crypto::salt::Salt;
use crate::error::{ResolutionError, Result};

/// Length of salts generated for new anonymous strategies.
pub const DEFAULT_SALT_LENGTH: usize = 16;

/// Something that can produce fresh alphanumeric salts.
pub trait SaltSource {
    /// Produce a new salt of `len` alphanumeric characters.
    fn next_salt(&mut self, len: usize) -> Result<Salt>;
}

/// Salt source backed by `rand::thread_rng()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSaltSource;

impl SaltSource for ThreadRngSaltSource {
    fn next_salt(&mut self, len: usize) -> Result<Salt> {
        random_alphanumeric_salt(&mut rand::thread_rng(), len)
    }
}

/// Salt source backed by any caller-supplied cryptographic RNG.
#[derive(Debug, Clone)]
pub struct RngSaltSource<R> {
    rng: R,
}

impl<R: RngCore + CryptoRng> RngSaltSource<R> {
    /// Wrap an RNG.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore + CryptoRng> SaltSource for RngSaltSource<R> {
    fn next_salt(&mut self, len: usize) -> Result<Salt> {
        random_alphanumeric_salt(&mut self.rng, len)
    }
}

/// Draw `len` alphanumeric characters from `rng` and wrap them as a salt.
pub fn random_alphanumeric_salt<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    len: usize,
) -> Result<Salt> {
    if len == 0 {
        return Err(ResolutionError::Configuration(
            "salt length must be greater than zero".to_string(),
        ));
    }
    let value: String = rng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();
    Salt::new(value)
}
