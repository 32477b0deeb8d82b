//! Unit tests
//!
//! Component tests that need more fixtures than an inline `#[cfg(test)]`
//! module comfortably holds.

mod providers;
