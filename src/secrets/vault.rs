//! HashiCorp Vault secret resolver.
//!
//! Reads secrets from a KV v2 engine. Each secret is expected to store its
//! credential under the `value` field:
//!
//! ```bash
//! vault kv put secret/apim-master-subscription-key value="..."
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv2;

use super::error::{Result, SecretsError};
use super::resolver::SecretResolver;
use super::types::{ResolvedSecret, SecretReference, SecretString};

/// Field holding the credential inside a KV v2 secret.
const VALUE_FIELD: &str = "value";

/// Connection settings for [`VaultSecretResolver`].
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address
    pub address: String,
    /// Vault authentication token
    pub token: Option<SecretString>,
    /// Vault namespace (for Enterprise)
    pub namespace: Option<String>,
    /// KV v2 mount path
    pub mount_path: String,
}

/// Resolves secrets from a HashiCorp Vault KV v2 engine.
pub struct VaultSecretResolver {
    client: VaultClient,
    mount_path: String,
}

impl std::fmt::Debug for VaultSecretResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretResolver")
            .field("mount_path", &self.mount_path)
            .field("client", &"[VaultClient]")
            .finish()
    }
}

impl VaultSecretResolver {
    /// Creates a Vault resolver. Connectivity is not checked until the first
    /// resolution so that store outages surface per case.
    ///
    /// # Errors
    ///
    /// [`SecretsError::ConfigError`] if the configuration is invalid.
    pub fn new(config: VaultConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(SecretsError::config_error("Vault address cannot be empty"));
        }

        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(namespace) = config.namespace {
            settings_builder.namespace(Some(namespace));
        }

        let settings = settings_builder.build().map_err(|e| {
            SecretsError::config_error(format!("Invalid Vault configuration: {}", e))
        })?;

        let client = VaultClient::new(settings).map_err(|e| {
            SecretsError::config_error(format!("Failed to create Vault client: {}", e))
        })?;

        Ok(Self { client, mount_path: config.mount_path })
    }
}

/// Map a Vault client error onto the resolver taxonomy.
fn map_client_error(secret: &SecretReference, error: ClientError) -> SecretsError {
    match error {
        ClientError::APIError { code: 404, .. } => SecretsError::not_found(secret.as_str()),
        ClientError::APIError { code: 403, .. } => SecretsError::access_denied(secret.as_str()),
        ClientError::APIError { code, .. } => {
            SecretsError::store_unavailable(format!("Vault returned status {}", code))
        }
        other => {
            tracing::error!(error = %other, secret = %secret, "Failed to read secret from Vault");
            SecretsError::store_unavailable("Vault request failed")
        }
    }
}

#[async_trait]
impl SecretResolver for VaultSecretResolver {
    async fn resolve(&self, secret: &SecretReference) -> Result<ResolvedSecret> {
        let data: HashMap<String, String> =
            kv2::read(&self.client, &self.mount_path, secret.as_str())
                .await
                .map_err(|e| map_client_error(secret, e))?;

        let value = data.get(VALUE_FIELD).cloned().ok_or_else(|| {
            SecretsError::store_unavailable(format!(
                "Vault secret '{}' has no '{}' field",
                secret, VALUE_FIELD
            ))
        })?;

        tracing::debug!(secret = %secret, mount_path = %self.mount_path, "Resolved secret from Vault");
        Ok(ResolvedSecret::new(secret.clone(), SecretString::new(value)))
    }

    fn backend(&self) -> &'static str {
        "vault"
    }
}
