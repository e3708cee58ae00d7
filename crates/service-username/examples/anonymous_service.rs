//! Anonymous Service — register services with different username strategies
//! and see what each one is told about the same user.
//!
//! Run with:
//!   cargo run --example anonymous_service -p service-username

use service_username::{
    MissingAttributePolicy, Principal, RegisteredService, ServiceRegistry, ThreadRngSaltSource,
    UsernameStrategy, WebService,
};

fn main() -> service_username::Result<()> {
    // ── 1. Register three relying services ─────────────────────────────────
    //
    // Each anonymous service gets its own random salt, so the pseudonyms
    // they see for the same person cannot be correlated.
    let registry = ServiceRegistry::new();
    registry.insert(RegisteredService::new(
        1,
        "intranet",
        r"https://intranet\.example\.org/.*",
        UsernameStrategy::default(),
    )?);
    registry.insert(RegisteredService::new(
        2,
        "mailing-list",
        r"https://lists\.example\.org/.*",
        UsernameStrategy::attribute("mail").on_missing(MissingAttributePolicy::UsePrincipalId),
    )?);
    registry.insert(RegisteredService::new(
        3,
        "survey",
        r"https://survey\.partner\.net/.*",
        UsernameStrategy::anonymous()?,
    )?);
    registry.insert(RegisteredService::new(
        4,
        "forum",
        r"https://forum\.partner\.net/.*",
        UsernameStrategy::anonymous()?,
    )?);

    // ── 2. Resolve the same principal everywhere ───────────────────────────
    let alice = Principal::new("alice").with_attribute("mail", "alice@example.org");
    for url in [
        "https://intranet.example.org/home",
        "https://lists.example.org/subscribe",
        "https://survey.partner.net/q/1",
        "https://forum.partner.net/login",
    ] {
        let username = registry.resolve(&alice, &WebService::new(url))?;
        println!("{url:<40} -> {username}");
    }
    println!();

    // ── 3. Same service, new session: same pseudonym ───────────────────────
    let again = registry.resolve(&alice, &WebService::new("https://survey.partner.net/q/2"))?;
    println!("survey, second visit                     -> {again}");

    // ── 4. Rotate the survey salt: every pseudonym it knows changes ────────
    registry.rotate_salt(3, &mut ThreadRngSaltSource)?;
    let rotated = registry.resolve(&alice, &WebService::new("https://survey.partner.net/q/3"))?;
    println!("survey, after salt rotation              -> {rotated}");

    Ok(())
}
