//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Configure registered services with each strategy
//! 2. Persist them and load them back into a registry
//! 3. Resolve usernames for principals at relying services
//! 4. Rotate an anonymous salt and persist the rotated entry

use service_username::{
    PersistentIdGenerator, Principal, RegisteredService, RegistryStore, ResolutionError, Salt,
    ThreadRngSaltSource, UsernameStrategy, WebService, NEUTRAL_SCOPE,
};

const SALT: &str = "ABCDEF1234567890";

#[test]
fn scenario_fixed_salt_is_reproducible() {
    let generator = PersistentIdGenerator::new(Salt::new(SALT).unwrap());
    let x = generator.generate(&Principal::new("alice"), &NEUTRAL_SCOPE);
    let again = generator.generate(&Principal::new("alice"), &NEUTRAL_SCOPE);
    assert_eq!(x, again);

    // A separately constructed generator over the same salt agrees.
    let other = PersistentIdGenerator::new(Salt::new(SALT).unwrap());
    assert_eq!(other.generate(&Principal::new("alice"), &NEUTRAL_SCOPE), x);

    let y = generator.generate(&Principal::new("bob"), &NEUTRAL_SCOPE);
    assert_ne!(x, y);
}

#[test]
fn scenario_independent_default_salts_unlinkable() {
    let first = RegisteredService::new(1, "a", ".*", UsernameStrategy::anonymous().unwrap()).unwrap();
    let second = RegisteredService::new(2, "b", ".*", UsernameStrategy::anonymous().unwrap()).unwrap();
    let alice = Principal::new("alice");
    let svc = WebService::new("https://shared.example.org");
    assert_ne!(
        first.resolve_username(&alice, &svc).unwrap(),
        second.resolve_username(&alice, &svc).unwrap()
    );
}

#[test]
fn scenario_attribute_mail() {
    let reg = RegisteredService::new(1, "mail", ".*", UsernameStrategy::attribute("mail")).unwrap();
    let svc = WebService::new("https://lists.example.org");

    let alice = Principal::new("alice").with_attribute("mail", "alice@example.org");
    assert_eq!(reg.resolve_username(&alice, &svc).unwrap(), "alice@example.org");

    let bare = Principal::new("alice");
    assert!(matches!(
        reg.resolve_username(&bare, &svc),
        Err(ResolutionError::MissingAttribute { .. })
    ));
}

#[test]
fn full_workflow_configure_persist_resolve_rotate() {
    let dir = tempfile::tempdir().unwrap();

    // ── Step 1: Configure services ──────────────────────────────────────
    let intranet = RegisteredService::new(
        1,
        "intranet",
        r"https://intranet\.example\.org/.*",
        UsernameStrategy::default(),
    )
    .unwrap();
    let survey = RegisteredService::new(
        2,
        "survey",
        r"https://survey\.partner\.net/.*",
        UsernameStrategy::anonymous_with(PersistentIdGenerator::new(Salt::new(SALT).unwrap())),
    )
    .unwrap()
    .with_description("third-party survey tool");

    // ── Step 2: Persist and reload ──────────────────────────────────────
    let store = RegistryStore::new(dir.path()).unwrap();
    store.save(&intranet).unwrap();
    store.save(&survey).unwrap();
    assert_eq!(store.list().unwrap(), vec![1, 2]);

    let registry = store.load_registry().unwrap();
    assert_eq!(registry.get(2).unwrap().as_ref(), &survey);

    // ── Step 3: Resolve ─────────────────────────────────────────────────
    let alice = Principal::new("alice");
    let at_intranet = registry
        .resolve(&alice, &WebService::new("https://intranet.example.org/home"))
        .unwrap();
    assert_eq!(at_intranet, "alice");

    let at_survey = registry
        .resolve(&alice, &WebService::new("https://survey.partner.net/q/1"))
        .unwrap();
    assert_eq!(at_survey, "-K-X07LVSy_AKslMLtoRdyh5148ahpiy1lLx9-3esro");

    let unknown = registry.resolve(&alice, &WebService::new("https://unknown.example.com"));
    assert!(matches!(unknown, Err(ResolutionError::ServiceNotFound(_))));

    // ── Step 4: Rotate and persist ──────────────────────────────────────
    let rotated = registry.rotate_salt(2, &mut ThreadRngSaltSource).unwrap();
    store.save(&rotated).unwrap();

    let reloaded = store.load_registry().unwrap();
    let after = reloaded
        .resolve(&alice, &WebService::new("https://survey.partner.net/q/2"))
        .unwrap();
    assert_ne!(after, at_survey);
    assert_eq!(
        after,
        registry
            .resolve(&alice, &WebService::new("https://survey.partner.net/q/3"))
            .unwrap()
    );
}
