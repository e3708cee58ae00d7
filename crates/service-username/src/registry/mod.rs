//! Registered services and the in-memory registry.
//!
//! A `RegisteredService` binds a service-id pattern to the username
//! strategy used for every relying party it matches. The `ServiceRegistry`
//! shares those configurations across request handlers and swaps them
//! atomically on administrative change.

pub mod lookup;
pub mod registered;

pub use lookup::ServiceRegistry;
pub use registered::{RegisteredService, ServicePattern};
