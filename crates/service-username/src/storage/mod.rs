//! Storage layer for registered service configurations.
//!
//! # Directory layout
//!
//! By convention the default root is `~/.service-username/`:
//!
//! ```text
//! ~/.service-username/
//! └── services/
//!     └── {id}.json
//! ```
//!
//! # Modules
//!
//! - [`registry_store`] — CRUD for `RegisteredService` records.

pub mod registry_store;

pub use registry_store::{RegistryStore, StoredService};
