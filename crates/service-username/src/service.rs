//! Relying services as seen by username resolution.
//!
//! A service exposes an identifier and a match predicate. Two concrete
//! kinds exist here:
//!   - `WebService` — the relying party that asked for authentication
//!   - `NeutralScope` — the sentinel scope persistent ids are bound to when
//!     anonymizing. It has no identifier and matches nothing, so the id it
//!     produces depends only on the principal and the salt.

/// A relying service.
pub trait Service: std::fmt::Debug + Send + Sync {
    /// Service identifier (URL, entity id). `None` when undefined.
    fn id(&self) -> Option<&str>;

    /// Whether this service and `other` denote the same relying party.
    fn matches(&self, other: &dyn Service) -> bool;
}

/// A concrete relying party identified by URL or entity id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WebService {
    id: String,
}

impl WebService {
    /// Create a service from its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Service for WebService {
    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn matches(&self, other: &dyn Service) -> bool {
        other.id() == Some(self.id.as_str())
    }
}

/// Sentinel scope: undefined identifier, matches no service (itself included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NeutralScope;

/// The single neutral scope value.
pub const NEUTRAL_SCOPE: NeutralScope = NeutralScope;

impl Service for NeutralScope {
    fn id(&self) -> Option<&str> {
        None
    }

    fn matches(&self, _other: &dyn Service) -> bool {
        false
    }
}
