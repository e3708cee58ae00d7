//! Edge case tests: unusual principals, attribute shapes, missing
//! configuration and malformed stored records.

use service_username::{
    CaseCanonicalization, MissingAttributePolicy, PersistentIdGenerator, Principal,
    RegisteredService, ResolutionError, Salt, UsernameStrategy, WebService, NEUTRAL_SCOPE,
};

fn registered(strategy: UsernameStrategy) -> RegisteredService {
    RegisteredService::new(1, "edge", ".*", strategy).unwrap()
}

fn fixed_generator() -> PersistentIdGenerator {
    PersistentIdGenerator::new(Salt::new("ABCDEF1234567890").unwrap())
}

#[test]
fn edge_empty_principal_id_still_hashes() {
    let reg = registered(UsernameStrategy::anonymous_with(fixed_generator()));
    let id = reg
        .resolve_username(&Principal::new(""), &NEUTRAL_SCOPE)
        .unwrap();
    assert_eq!(id.len(), 43);
}

#[test]
fn edge_unicode_principal() {
    let reg = registered(UsernameStrategy::anonymous_with(fixed_generator()));
    let a = reg
        .resolve_username(&Principal::new("zoë"), &NEUTRAL_SCOPE)
        .unwrap();
    let b = reg
        .resolve_username(&Principal::new("zoe"), &NEUTRAL_SCOPE)
        .unwrap();
    assert_ne!(a, b);
}

#[test]
fn edge_attribute_with_empty_value_list_is_missing() {
    let mut p = Principal::new("alice");
    p.attributes.insert("mail".into(), Vec::new());
    let reg = registered(UsernameStrategy::attribute("mail"));
    assert!(matches!(
        reg.resolve_username(&p, &NEUTRAL_SCOPE),
        Err(ResolutionError::MissingAttribute { .. })
    ));
}

#[test]
fn edge_attribute_lowercased() {
    let p = Principal::new("alice").with_attribute("mail", "Alice@Example.ORG");
    let reg = registered(
        UsernameStrategy::attribute("mail").with_canonicalization(CaseCanonicalization::Lower),
    );
    assert_eq!(
        reg.resolve_username(&p, &NEUTRAL_SCOPE).unwrap(),
        "alice@example.org"
    );
}

#[test]
fn edge_fallback_is_canonicalized_too() {
    let reg = registered(
        UsernameStrategy::attribute("mail")
            .on_missing(MissingAttributePolicy::UsePrincipalId)
            .with_canonicalization(CaseCanonicalization::Upper),
    );
    assert_eq!(
        reg.resolve_username(&Principal::new("alice"), &NEUTRAL_SCOPE)
            .unwrap(),
        "ALICE"
    );
}

#[test]
fn edge_canonicalization_ignored_for_anonymous() {
    let plain = UsernameStrategy::anonymous_with(fixed_generator());
    let attempted = plain.clone().with_canonicalization(CaseCanonicalization::Upper);
    assert_eq!(plain, attempted);
}

#[test]
fn edge_missing_generator_from_config_fails_every_time() {
    let strategy: UsernameStrategy = serde_json::from_str(r#"{"type":"anonymous"}"#).unwrap();
    let reg = registered(strategy);
    for svc in ["https://a.example.org", "https://b.example.org"] {
        let err = reg
            .resolve_username(&Principal::new("alice"), &WebService::new(svc))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Configuration(_)));
    }
}

#[test]
fn edge_blank_salt_in_config_rejected() {
    let result: Result<UsernameStrategy, _> =
        serde_json::from_str(r#"{"type":"anonymous","generator":{"salt":"  "}}"#);
    assert!(result.is_err());
}

#[test]
fn edge_unknown_strategy_type_rejected() {
    let result: Result<UsernameStrategy, _> = serde_json::from_str(r#"{"type":"reverse"}"#);
    assert!(result.is_err());
}

#[test]
fn edge_error_messages_do_not_leak_salt() {
    let err = ResolutionError::Configuration("No persistent id generator is defined".into());
    let salt = Salt::new("TOPSECRETSALT123").unwrap();
    let debug = format!("{:?} {:?}", err, fixed_generator().rekeyed(salt));
    assert!(!debug.contains("TOPSECRETSALT123"));
}
