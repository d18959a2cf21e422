//! FraudGuard Sample Generator
//!
//! Synthetic transaction candidates for demos and testing, drawn from two
//! deliberately separated statistical profiles.
//!
//! # Profiles
//!
//! - **ElevatedRisk**: upper numeric ranges, frequent risk flags, risky
//!   categorical options, high amounts
//! - **SuppressedRisk**: lower numeric ranges, rare risk flags, safe
//!   categorical options, small amounts
//!
//! Generation is a pure function of `(profile, schema, rng)`; feeding the
//! output into the ledger is the caller's decision.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod generator;
pub mod profile;

// Re-exports
pub use generator::{generate, SyntheticSample};
pub use profile::SampleProfile;
