//! Strategy dispatch.
//!
//! Resolution is a pure function of the strategy configuration and the
//! principal. Nothing is cached and nothing is mutated, so one strategy
//! instance may serve any number of concurrent requests.

use crate::error::{ResolutionError, Result};
use crate::generator::PersistentIdGenerator;
use crate::principal::Principal;
use crate::registry::RegisteredService;
use crate::service::{Service, NEUTRAL_SCOPE};

use super::types::{MissingAttributePolicy, UsernameStrategy};

impl UsernameStrategy {
    /// Resolve the username disclosed to `service` for `principal`.
    ///
    /// # Errors
    ///
    /// - `ResolutionError::MissingAttribute` when an attribute-based strategy
    ///   with policy `Fail` cannot find its attribute.
    /// - `ResolutionError::Configuration` when an anonymous strategy has no
    ///   generator.
    ///
    /// On error nothing should be disclosed to the service.
    pub fn resolve(
        &self,
        principal: &Principal,
        service: &dyn Service,
        registered: &RegisteredService,
    ) -> Result<String> {
        let username = match self {
            Self::Default { canonicalization } => canonicalization.apply(principal.id.clone()),
            Self::AttributeBased {
                attribute,
                on_missing,
                canonicalization,
            } => {
                let value = resolve_attribute(principal, attribute, *on_missing)?;
                canonicalization.apply(value)
            }
            Self::Anonymous { generator } => anonymize(generator.as_ref(), principal)?,
        };

        log::debug!(
            "Resolved username [{}] for service [{}] via {} strategy of registered service {}",
            username,
            service.id().unwrap_or("<undefined>"),
            self.kind(),
            registered.id
        );
        Ok(username)
    }
}

fn resolve_attribute(
    principal: &Principal,
    attribute: &str,
    on_missing: MissingAttributePolicy,
) -> Result<String> {
    if let Some(value) = principal.first_attribute(attribute) {
        return Ok(value.to_string());
    }
    match on_missing {
        MissingAttributePolicy::Fail => Err(ResolutionError::MissingAttribute {
            attribute: attribute.to_string(),
        }),
        MissingAttributePolicy::UsePrincipalId => {
            log::debug!(
                "Principal [{}] has no attribute [{attribute}]; using principal id",
                principal.id
            );
            Ok(principal.id.clone())
        }
    }
}

/// Anonymous ids are always bound to the neutral scope. The real service is
/// deliberately not reachable from here, so the id only varies with the
/// principal and the per-service salt.
fn anonymize(generator: Option<&PersistentIdGenerator>, principal: &Principal) -> Result<String> {
    let generator = generator.ok_or_else(|| {
        ResolutionError::Configuration("No persistent id generator is defined".to_string())
    })?;
    let id = generator.generate(principal, &NEUTRAL_SCOPE);
    log::debug!("Resolved username [{id}] for anonymous access");
    log::trace!(
        "anonymous id derived under salt fingerprint {}",
        generator.salt().fingerprint()
    );
    Ok(id)
}
