//! Shared test infrastructure for the integration suites
//!
//! - wiremock-based ingress and Key Vault mocks
//! - In-memory secret resolvers
//! - Raw TCP servers for malformed HTTP responses
//! - Hard timeouts so no test can hang

#![allow(dead_code, unused_imports)]

pub mod mocks;
pub mod resolvers;
pub mod timeout;

pub use mocks::{GatewayMocks, RawHttpServer};
pub use resolvers::{FailingResolver, StaticResolver};
pub use timeout::{with_timeout, TestTimeout};

/// Subscription key accepted by the gateway mocks.
pub const MASTER_KEY: &str = "ABC123-master-key";
