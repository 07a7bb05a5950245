//! # Gateway Conformance
//!
//! End-to-end conformance harness for authenticated gateway ingress paths.
//! A suite resolves credentials from a secret store, sends a fixed echo probe
//! through each configured ingress, and checks the HTTP status that comes back.
//!
//! ## Architecture
//!
//! ```text
//! ConformanceSuite → ConformanceCase → SecretResolver → Key Vault / Vault / env
//!                                    ↘ IngressClient  → gateway → echo backend
//! ```
//!
//! ## Core Components
//!
//! - **Secrets**: [`SecretResolver`] backends returning redacting [`SecretString`] values
//! - **Ingress**: [`IngressClient`] issuing `GET <endpoint>/echo?subscription-key=…&foo=bar`
//! - **Conformance**: [`ConformanceCase`] and [`ConformanceSuite`] producing one [`CaseResult`] per case
//! - **Config**: TOML plus `GATEWAY_CONFORMANCE_*` environment overrides
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gateway_conformance::{ConformanceConfig, ConformanceSuite, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConformanceConfig::load(None)?;
//!     let suite = ConformanceSuite::from_config(&config, config.build_resolver()?)?;
//!     let report = suite.run_all().await;
//!     assert!(report.all_passed());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod conformance;
pub mod errors;
pub mod ingress;
pub mod observability;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::ConformanceConfig;
pub use conformance::{CaseResult, ConformanceCase, ConformanceSuite, FailureKind, SuiteReport};
pub use errors::{Error, Result};
pub use ingress::{Endpoint, IngressClient, IngressRegistry};
pub use secrets::{SecretReference, SecretResolver, SecretString};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
