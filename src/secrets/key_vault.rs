//! Azure Key Vault secret resolver backed by the REST API.
//!
//! A secret is read with `GET {vault}/secrets/{name}?api-version=7.4` using a
//! bearer token. The token is either configured statically or obtained through
//! the OAuth2 client credentials flow on every resolution; nothing is cached.
//!
//! # Status mapping
//!
//! | Store response          | Error                               |
//! |-------------------------|-------------------------------------|
//! | 404                     | [`SecretsError::NotFound`]          |
//! | 403                     | [`SecretsError::AccessDenied`]      |
//! | 401, 5xx, transport     | [`SecretsError::StoreUnavailable`]  |
//! | token endpoint failure  | [`SecretsError::StoreUnavailable`]  |

use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{Result, SecretsError};
use super::resolver::SecretResolver;
use super::types::{ResolvedSecret, SecretReference, SecretString};

/// Key Vault data-plane API version.
pub const SECRETS_API_VERSION: &str = "7.4";

/// Microsoft identity platform host used for client credentials.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// OAuth2 scope granting Key Vault data-plane access.
pub const DEFAULT_KEY_VAULT_SCOPE: &str = "https://vault.azure.net/.default";

/// How the resolver authenticates to Key Vault.
#[derive(Debug, Clone)]
pub enum KeyVaultCredential {
    /// A pre-issued bearer token, e.g. from `az account get-access-token`.
    StaticToken(SecretString),

    /// Service principal client credentials.
    ClientCredentials {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: SecretString,
        scope: String,
    },
}

/// Connection settings for [`KeyVaultSecretResolver`].
#[derive(Debug, Clone)]
pub struct KeyVaultConfig {
    /// Vault URI, e.g. `https://my-vault.vault.azure.net`
    pub vault_uri: String,

    /// Credential used for every request
    pub credential: KeyVaultCredential,

    /// Per-request timeout
    pub timeout: Duration,
}

/// Resolves secrets from Azure Key Vault.
pub struct KeyVaultSecretResolver {
    client: Client,
    vault_uri: String,
    credential: KeyVaultCredential,
}

impl std::fmt::Debug for KeyVaultSecretResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVaultSecretResolver")
            .field("vault_uri", &self.vault_uri)
            .field("client", &"[reqwest::Client]")
            .finish()
    }
}

#[derive(Deserialize)]
struct SecretBundle {
    value: String,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl KeyVaultSecretResolver {
    /// Creates a resolver. No network traffic happens until [`resolve`](SecretResolver::resolve).
    ///
    /// # Errors
    ///
    /// [`SecretsError::ConfigError`] if the vault URI is empty or the HTTP
    /// client cannot be built.
    pub fn new(config: KeyVaultConfig) -> Result<Self> {
        let vault_uri = config.vault_uri.trim().trim_end_matches('/').to_string();
        if vault_uri.is_empty() {
            return Err(SecretsError::config_error("Key Vault URI cannot be empty"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| {
                SecretsError::config_error(format!("Failed to build Key Vault HTTP client: {}", e))
            })?;

        Ok(Self { client, vault_uri, credential: config.credential })
    }

    pub fn vault_uri(&self) -> &str {
        &self.vault_uri
    }

    fn secret_url(&self, secret: &SecretReference) -> String {
        format!("{}/secrets/{}?api-version={}", self.vault_uri, secret.as_str(), SECRETS_API_VERSION)
    }

    async fn access_token(&self) -> Result<SecretString> {
        let (authority_host, tenant_id, client_id, client_secret, scope) = match &self.credential {
            KeyVaultCredential::StaticToken(token) => return Ok(token.clone()),
            KeyVaultCredential::ClientCredentials {
                authority_host,
                tenant_id,
                client_id,
                client_secret,
                scope,
            } => (authority_host, tenant_id, client_id, client_secret, scope),
        };

        let url =
            format!("{}/{}/oauth2/v2.0/token", authority_host.trim_end_matches('/'), tenant_id);
        let params = [
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.expose_secret()),
            ("scope", scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self.client.post(&url).form(&params).send().await.map_err(|e| {
            SecretsError::store_unavailable(format!("token request failed: {}", e.without_url()))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, tenant_id = %tenant_id, "Token endpoint rejected client credentials");
            return Err(SecretsError::store_unavailable(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|_| SecretsError::store_unavailable("malformed token endpoint response"))?;

        Ok(SecretString::new(payload.access_token))
    }
}

#[async_trait]
impl SecretResolver for KeyVaultSecretResolver {
    async fn resolve(&self, secret: &SecretReference) -> Result<ResolvedSecret> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(self.secret_url(secret))
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                SecretsError::store_unavailable(format!(
                    "request to Key Vault failed: {}",
                    e.without_url()
                ))
            })?;

        let status = response.status();
        debug!(secret = %secret, status = %status, vault_uri = %self.vault_uri, "Key Vault responded");

        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(SecretsError::not_found(secret.as_str())),
            StatusCode::FORBIDDEN => return Err(SecretsError::access_denied(secret.as_str())),
            StatusCode::UNAUTHORIZED => {
                return Err(SecretsError::store_unavailable(
                    "Key Vault rejected the harness credentials (401)",
                ))
            }
            other => {
                return Err(SecretsError::store_unavailable(format!(
                    "Key Vault returned unexpected status {}",
                    other.as_u16()
                )))
            }
        }

        // The payload carries the value, so decode errors are reported without detail.
        let bundle: SecretBundle = response
            .json()
            .await
            .map_err(|_| SecretsError::store_unavailable("malformed Key Vault secret response"))?;

        let mut resolved = ResolvedSecret::new(secret.clone(), SecretString::new(bundle.value));
        if let Some(version) =
            bundle.id.as_deref().and_then(|id| id.rsplit('/').next()).filter(|v| !v.is_empty())
        {
            resolved = resolved.with_version(version);
        }

        Ok(resolved)
    }

    fn backend(&self) -> &'static str {
        "key_vault"
    }
}
