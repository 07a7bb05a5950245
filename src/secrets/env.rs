//! Environment variable secret resolver.
//!
//! Intended for **local development only**: it lets the harness run against a
//! gateway without access to the real secret store.
//!
//! ```bash
//! export GATEWAY_CONFORMANCE_SECRET_APIM_MASTER_SUBSCRIPTION_KEY="..."
//! ```

use async_trait::async_trait;
use std::env;

use super::error::{Result, SecretsError};
use super::resolver::SecretResolver;
use super::types::{ResolvedSecret, SecretReference, SecretString};

/// Default environment variable prefix for secrets.
pub const DEFAULT_SECRET_PREFIX: &str = "GATEWAY_CONFORMANCE_SECRET_";

/// Resolves secrets from process environment variables.
///
/// `apim-master-subscription-key` is read from
/// `<prefix>APIM_MASTER_SUBSCRIPTION_KEY`.
#[derive(Debug, Clone)]
pub struct EnvSecretResolver {
    prefix: String,
}

impl Default for EnvSecretResolver {
    fn default() -> Self {
        Self { prefix: DEFAULT_SECRET_PREFIX.to_string() }
    }
}

impl EnvSecretResolver {
    /// Creates a resolver using [`DEFAULT_SECRET_PREFIX`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with a custom variable prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Converts a secret name to the environment variable name.
    pub fn env_var_for(&self, secret: &SecretReference) -> String {
        format!("{}{}", self.prefix, secret.as_str().to_uppercase().replace('-', "_"))
    }
}

#[async_trait]
impl SecretResolver for EnvSecretResolver {
    async fn resolve(&self, secret: &SecretReference) -> Result<ResolvedSecret> {
        let env_var = self.env_var_for(secret);

        match env::var(&env_var) {
            Ok(value) if !value.is_empty() => {
                tracing::debug!(secret = %secret, env_var = %env_var, "Resolved secret from environment");
                Ok(ResolvedSecret::new(secret.clone(), SecretString::new(value)))
            }
            _ => Err(SecretsError::not_found(secret.as_str())),
        }
    }

    fn backend(&self) -> &'static str {
        "env"
    }
}
