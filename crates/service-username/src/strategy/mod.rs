//! Username resolution strategies.
//!
//! A registered service carries exactly one strategy deciding which
//! identifier is disclosed to it:
//! - `Default` — the principal id, unchanged
//! - `AttributeBased` — the value of a released principal attribute
//! - `Anonymous` — a salted persistent pseudonym, stable per service

pub mod resolve;
pub mod types;

pub use types::{CaseCanonicalization, MissingAttributePolicy, UsernameStrategy};
