//! Strategy configuration types.

use serde::{Deserialize, Serialize};

use crate::crypto::{SaltSource, ThreadRngSaltSource};
use crate::error::Result;
use crate::generator::PersistentIdGenerator;

/// Case folding applied to a resolved username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCanonicalization {
    /// Leave the username unchanged.
    #[default]
    None,
    /// Fold to upper case.
    Upper,
    /// Fold to lower case.
    Lower,
}

impl CaseCanonicalization {
    /// Apply the folding.
    pub fn apply(self, username: String) -> String {
        match self {
            Self::None => username,
            Self::Upper => username.to_uppercase(),
            Self::Lower => username.to_lowercase(),
        }
    }

    /// Parse from a string.
    pub fn from_str_value(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "upper" => Some(Self::Upper),
            "lower" => Some(Self::Lower),
            _ => None,
        }
    }

    fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// What the attribute-based strategy does when the attribute is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAttributePolicy {
    /// Fail resolution with `MissingAttribute`.
    #[default]
    Fail,
    /// Disclose the principal id instead.
    UsePrincipalId,
}

/// How the username disclosed to a service is chosen.
///
/// Equality is structural: two strategies are equal iff they are the same
/// variant with equal configuration. Two anonymous strategies are equal iff
/// their generators (salt and subject attribute) are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UsernameStrategy {
    /// Disclose the principal id.
    Default {
        #[serde(default, skip_serializing_if = "CaseCanonicalization::is_none")]
        canonicalization: CaseCanonicalization,
    },
    /// Disclose the first value of a principal attribute.
    AttributeBased {
        attribute: String,
        #[serde(default)]
        on_missing: MissingAttributePolicy,
        #[serde(default, skip_serializing_if = "CaseCanonicalization::is_none")]
        canonicalization: CaseCanonicalization,
    },
    /// Disclose a persistent pseudonym.
    ///
    /// `generator` is optional only so that an incomplete stored
    /// configuration can be loaded; resolving with it absent fails.
    Anonymous {
        #[serde(default)]
        generator: Option<PersistentIdGenerator>,
    },
}

impl Default for UsernameStrategy {
    fn default() -> Self {
        Self::Default {
            canonicalization: CaseCanonicalization::None,
        }
    }
}

impl UsernameStrategy {
    /// Attribute-based strategy that fails when the attribute is missing.
    pub fn attribute(attribute: impl Into<String>) -> Self {
        Self::AttributeBased {
            attribute: attribute.into(),
            on_missing: MissingAttributePolicy::Fail,
            canonicalization: CaseCanonicalization::None,
        }
    }

    /// Anonymous strategy with a fresh 16-character salt from the thread RNG.
    pub fn anonymous() -> Result<Self> {
        Self::anonymous_with_source(&mut ThreadRngSaltSource)
    }

    /// Anonymous strategy with a fresh salt drawn from `source`.
    pub fn anonymous_with_source(source: &mut impl SaltSource) -> Result<Self> {
        Ok(Self::anonymous_with(PersistentIdGenerator::with_random_salt(
            source,
        )?))
    }

    /// Anonymous strategy over an explicit generator (shared or fixed salt).
    pub fn anonymous_with(generator: PersistentIdGenerator) -> Self {
        Self::Anonymous {
            generator: Some(generator),
        }
    }

    /// Set the missing-attribute policy. No-op for other variants.
    pub fn on_missing(mut self, policy: MissingAttributePolicy) -> Self {
        if let Self::AttributeBased { on_missing, .. } = &mut self {
            *on_missing = policy;
        }
        self
    }

    /// Set case canonicalization. No-op for the anonymous variant.
    pub fn with_canonicalization(mut self, mode: CaseCanonicalization) -> Self {
        match &mut self {
            Self::Default { canonicalization } | Self::AttributeBased { canonicalization, .. } => {
                *canonicalization = mode;
            }
            Self::Anonymous { .. } => {
                log::warn!("case canonicalization is not applied to anonymous identifiers");
            }
        }
        self
    }

    /// Short variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Default { .. } => "default",
            Self::AttributeBased { .. } => "attribute_based",
            Self::Anonymous { .. } => "anonymous",
        }
    }

    /// The anonymous generator, if this is a configured anonymous strategy.
    pub fn generator(&self) -> Option<&PersistentIdGenerator> {
        match self {
            Self::Anonymous { generator } => generator.as_ref(),
            _ => None,
        }
    }
}
