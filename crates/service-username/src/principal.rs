//! The authenticated principal, as handed over by the authentication pipeline.
//!
//! A principal carries a stable identifier and the attributes that attribute
//! release has already decided may be seen. Attributes are multi-valued.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An authenticated subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable unique identifier.
    pub id: String,
    /// Released attributes, name to values.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Principal {
    /// Create a principal with no attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style: add a single-valued attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Return the first value of an attribute, if present and non-empty.
    pub fn first_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
