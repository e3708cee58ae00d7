//! Registered service configuration.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{ResolutionError, Result};
use crate::principal::Principal;
use crate::service::Service;
use crate::strategy::UsernameStrategy;

/// A case-insensitive regular expression that must match a whole service id.
///
/// Serializes as the source pattern; equality and hashing use the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServicePattern {
    source: String,
    regex: Regex,
}

impl ServicePattern {
    /// Compile a pattern.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let regex = RegexBuilder::new(&format!("^(?:{source})$"))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                ResolutionError::Configuration(format!("invalid service pattern '{source}': {e}"))
            })?;
        Ok(Self { source, regex })
    }

    /// The source pattern.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the whole id matches.
    pub fn is_match(&self, service_id: &str) -> bool {
        self.regex.is_match(service_id)
    }
}

impl PartialEq for ServicePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for ServicePattern {}

impl std::hash::Hash for ServicePattern {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl TryFrom<String> for ServicePattern {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ServicePattern> for String {
    fn from(pattern: ServicePattern) -> Self {
        pattern.source
    }
}

/// Per-service settings relevant to username resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisteredService {
    /// Numeric registry id.
    pub id: u64,
    /// Human-readable name.
    pub name: String,
    /// Which service ids this entry applies to.
    pub service_pattern: ServicePattern,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lower values are consulted first when several entries match.
    #[serde(default)]
    pub evaluation_order: i32,
    /// Strategy deciding the disclosed username.
    #[serde(default)]
    pub username_strategy: UsernameStrategy,
}

impl RegisteredService {
    /// Create a registered service.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Configuration` if `pattern` does not compile.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        pattern: &str,
        username_strategy: UsernameStrategy,
    ) -> Result<Self> {
        Ok(Self {
            id,
            name: name.into(),
            service_pattern: ServicePattern::new(pattern)?,
            description: None,
            evaluation_order: 0,
            username_strategy,
        })
    }

    /// Builder-style: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder-style: set the evaluation order.
    pub fn with_evaluation_order(mut self, order: i32) -> Self {
        self.evaluation_order = order;
        self
    }

    /// A copy of this configuration with a different strategy.
    pub fn with_strategy(&self, username_strategy: UsernameStrategy) -> Self {
        Self {
            username_strategy,
            ..self.clone()
        }
    }

    /// Whether this entry applies to `service`. Services without an id never match.
    pub fn matches(&self, service: &dyn Service) -> bool {
        service
            .id()
            .map(|id| self.service_pattern.is_match(id))
            .unwrap_or(false)
    }

    /// Resolve the username disclosed to `service` using this entry's strategy.
    pub fn resolve_username(&self, principal: &Principal, service: &dyn Service) -> Result<String> {
        self.username_strategy.resolve(principal, service, self)
    }
}
