//! Integration tests for the CLI binary.
//!
//! This test is registered as a [[test]] in the service-username-cli crate
//! so that CARGO_BIN_EXE_suid is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `suid` binary.
fn suid_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_suid"))
}

/// Run `suid` against a registry directory.
fn suid(registry: &Path, args: &[&str]) -> Output {
    suid_binary()
        .arg("--registry")
        .arg(registry)
        .args(args)
        .output()
        .expect("failed to execute suid")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn cli_responds_to_help() {
    let output = suid_binary()
        .arg("--help")
        .output()
        .expect("failed to execute suid --help");

    assert!(
        output.status.success(),
        "suid --help should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let out = stdout(&output);
    assert!(out.contains("Usage"), "got: {out}");
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = suid_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute suid");
    assert!(!output.status.success());
}

#[test]
fn cli_salt_prints_alphanumeric() {
    let output = suid_binary()
        .args(["salt", "--length", "24"])
        .output()
        .expect("failed to execute suid salt");
    assert!(output.status.success());
    let salt = stdout(&output);
    assert_eq!(salt.len(), 24);
    assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn cli_generate_known_answer() {
    let output = suid_binary()
        .args([
            "generate",
            "--salt",
            "ABCDEF1234567890",
            "--principal",
            "alice",
        ])
        .output()
        .expect("failed to execute suid generate");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "-K-X07LVSy_AKslMLtoRdyh5148ahpiy1lLx9-3esro");
}

#[test]
fn cli_generate_rejects_blank_salt() {
    let output = suid_binary()
        .args(["generate", "--salt", "", "--principal", "alice"])
        .output()
        .expect("failed to execute suid generate");
    assert!(!output.status.success());
}

#[test]
fn cli_service_lifecycle_and_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let reg = dir.path();

    let add = suid(
        reg,
        &[
            "service",
            "add",
            "--id",
            "1",
            "--name",
            "survey",
            "--pattern",
            r"https://survey\.partner\.net/.*",
            "--strategy",
            "anonymous",
            "--salt",
            "ABCDEF1234567890",
        ],
    );
    assert!(
        add.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&add.stderr)
    );
    assert!(!stdout(&add).contains("ABCDEF1234567890"));

    let add_mail = suid(
        reg,
        &[
            "service", "add", "--id", "2", "--name", "lists", "--pattern", ".*", "--strategy",
            "attribute", "--attribute", "mail", "--order", "10",
        ],
    );
    assert!(add_mail.status.success());

    // Duplicate id without --force fails.
    let dup = suid(
        reg,
        &["service", "add", "--id", "2", "--name", "x", "--pattern", ".*"],
    );
    assert!(!dup.status.success());

    let list = suid(reg, &["service", "list"]);
    assert!(list.status.success());
    let listing = stdout(&list);
    assert!(listing.contains("survey") && listing.contains("lists"));

    let anon = suid(
        reg,
        &[
            "resolve",
            "--service",
            "https://survey.partner.net/q/1",
            "--principal",
            "alice",
        ],
    );
    assert!(anon.status.success());
    assert_eq!(stdout(&anon), "-K-X07LVSy_AKslMLtoRdyh5148ahpiy1lLx9-3esro");

    let mail = suid(
        reg,
        &[
            "resolve",
            "--service",
            "https://lists.example.org",
            "--principal",
            "alice",
            "--attr",
            "mail=alice@example.org",
        ],
    );
    assert!(mail.status.success());
    assert_eq!(stdout(&mail), "alice@example.org");

    let missing = suid(
        reg,
        &[
            "resolve",
            "--service",
            "https://lists.example.org",
            "--principal",
            "alice",
        ],
    );
    assert!(!missing.status.success(), "missing attribute must abort");

    let rotate = suid(reg, &["service", "rotate-salt", "1"]);
    assert!(rotate.status.success());
    let after = suid(
        reg,
        &[
            "resolve",
            "--service",
            "https://survey.partner.net/q/1",
            "--principal",
            "alice",
        ],
    );
    assert!(after.status.success());
    assert_ne!(stdout(&after), "-K-X07LVSy_AKslMLtoRdyh5148ahpiy1lLx9-3esro");

    let remove = suid(reg, &["service", "remove", "1"]);
    assert!(remove.status.success());
    let gone = suid(reg, &["service", "show", "1"]);
    assert!(!gone.status.success());
}

#[test]
fn cli_service_add_rejects_inapplicable_flags() {
    let dir = tempfile::tempdir().unwrap();
    let reg = dir.path();

    let salted_default = suid(
        reg,
        &[
            "service", "add", "--id", "1", "--name", "x", "--pattern", ".*", "--salt",
            "ABCDEF1234567890",
        ],
    );
    assert!(!salted_default.status.success());
    assert!(String::from_utf8_lossy(&salted_default.stderr).contains("--salt"));

    let folded_anonymous = suid(
        reg,
        &[
            "service", "add", "--id", "1", "--name", "x", "--pattern", ".*", "--strategy",
            "anonymous", "--case", "upper",
        ],
    );
    assert!(!folded_anonymous.status.success());

    let list = suid(reg, &["service", "list"]);
    assert!(list.status.success());
    assert_eq!(stdout(&list), "No registered services.");
}
