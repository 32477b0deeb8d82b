/// contentgen - structured content generation
///
/// Core library that sizes a generation request, calls a chat-completion
/// provider, and reconciles its reply into a validated document.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
