//! Secret resolution for conformance cases.
//!
//! Cases that exercise authenticated access pull their credential from a
//! remote secret store at run time rather than embedding it in configuration.
//! The [`SecretResolver`] trait is the seam; backends are:
//!
//! - **Azure Key Vault** ([`KeyVaultSecretResolver`]): REST API with a static
//!   bearer token or service principal client credentials
//! - **HashiCorp Vault** ([`VaultSecretResolver`]): KV v2 engine
//! - **Environment variables** ([`EnvSecretResolver`]): local development only
//!
//! # Example
//!
//! ```rust,ignore
//! use gateway_conformance::secrets::{EnvSecretResolver, SecretReference, SecretResolver};
//!
//! let resolver = EnvSecretResolver::new();
//! let secret = SecretReference::new("apim-master-subscription-key")?;
//! let resolved = resolver.resolve(&secret).await?;
//! ```
//!
//! # Security Considerations
//!
//! - Values are wrapped in [`SecretString`], which redacts on Debug, Display
//!   and Serialize and zeroizes on drop
//! - Errors carry secret names, never values
//! - Resolvers never cache: every call goes to the store

pub mod env;
pub mod error;
pub mod key_vault;
pub mod resolver;
pub mod types;
pub mod vault;

pub use env::EnvSecretResolver;
pub use error::{Result, SecretsError};
pub use key_vault::{KeyVaultConfig, KeyVaultCredential, KeyVaultSecretResolver};
pub use resolver::SecretResolver;
pub use types::{ResolvedSecret, SecretReference, SecretString, REDACTED};
pub use vault::{VaultConfig, VaultSecretResolver};
