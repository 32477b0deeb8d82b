//! In-crate test suites
//!
//! - `mocks`: scriptable provider used by the other suites
//! - `property`: proptest invariants
//! - `integration`: end-to-end pipeline runs against the mock provider
//! - `unit`: HTTP-level provider tests with wiremock

mod mocks;
mod unit;
