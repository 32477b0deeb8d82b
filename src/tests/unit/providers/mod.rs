//! LLM Provider Unit Tests
//!
//! Uses wiremock for HTTP mocking to test:
//! - API request formatting
//! - Response parsing (success and error cases)
//! - Rate limit error handling
//! - Timeout handling
//! - Invalid API key handling
