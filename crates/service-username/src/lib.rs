//! service-username — decides which username each relying service sees.
//!
//! Provides interchangeable username resolution strategies for single
//! sign-on: the principal id as-is, a released principal attribute, or an
//! anonymous persistent identifier that is stable per service and
//! unlinkable across services. Registered service configurations can be
//! shared across threads and persisted as JSON.

pub mod crypto;
pub mod error;
pub mod generator;
pub mod principal;
pub mod registry;
pub mod service;
pub mod storage;
pub mod strategy;
pub mod time;

// Re-export primary types
pub use crypto::{RngSaltSource, Salt, SaltSource, ThreadRngSaltSource};
pub use error::{ResolutionError, Result};
pub use generator::PersistentIdGenerator;
pub use principal::Principal;
pub use registry::{RegisteredService, ServicePattern, ServiceRegistry};
pub use service::{NeutralScope, Service, WebService, NEUTRAL_SCOPE};
pub use storage::RegistryStore;
pub use strategy::{CaseCanonicalization, MissingAttributePolicy, UsernameStrategy};
