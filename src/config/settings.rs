//! Configuration model for the conformance harness.
//!
//! Every section is deserialized from TOML and validated with `validator`
//! before any client or resolver is built.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::ingress::ClientConfig;
use crate::observability::LoggingConfig;
use crate::secrets::env::DEFAULT_SECRET_PREFIX;
use crate::secrets::{SecretReference, SecretString};

/// Selector of the API gateway ingress.
pub const API_MANAGEMENT_INGRESS: &str = "api-management";

/// Selector of the reverse proxy chained in front of the gateway.
pub const APPLICATION_GATEWAY_INGRESS: &str = "application-gateway";

/// Secret holding the gateway's master subscription key.
pub const MASTER_SUBSCRIPTION_KEY_SECRET: &str = "apim-master-subscription-key";

/// Name of the case registered when the configuration declares none.
pub const CANONICAL_CASE_NAME: &str = "echo with subscription key in query parameter";

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ConformanceConfig {
    /// Ingresses the cases can select, in declaration order
    #[validate(length(min = 1, message = "At least one ingress must be configured"), nested)]
    pub ingresses: Vec<IngressConfig>,

    /// Where case credentials are resolved from
    pub secret_store: SecretStoreConfig,

    /// Transport settings shared by every ingress client
    #[serde(default)]
    #[validate(nested)]
    pub http: HttpConfig,

    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scripted cases. Empty means the canonical case only.
    #[serde(default)]
    #[validate(nested)]
    pub cases: Vec<CaseConfig>,
}

/// One named ingress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IngressConfig {
    #[validate(length(min = 1, message = "Ingress name cannot be empty"))]
    pub name: String,

    /// Base URL, e.g. `https://contoso.azure-api.net`
    #[validate(url(message = "Ingress URL must be a valid URL"))]
    pub url: String,
}

/// Secret store backend selection
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretStoreConfig {
    /// Azure Key Vault over its REST API
    KeyVault {
        vault_uri: String,
        /// Pre-acquired access token; takes precedence over client credentials
        #[serde(default)]
        bearer_token: Option<SecretString>,
        #[serde(default)]
        tenant_id: Option<String>,
        #[serde(default)]
        client_id: Option<String>,
        #[serde(default)]
        client_secret: Option<SecretString>,
        #[serde(default = "default_authority_host")]
        authority_host: String,
    },
    /// HashiCorp Vault KV v2
    Vault {
        address: String,
        #[serde(default)]
        token: Option<SecretString>,
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default = "default_mount_path")]
        mount_path: String,
    },
    /// Process environment, for local runs
    Env {
        #[serde(default = "default_env_prefix")]
        prefix: String,
    },
}

impl std::fmt::Debug for SecretStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyVault { vault_uri, bearer_token, client_secret, .. } => f
                .debug_struct("KeyVault")
                .field("vault_uri", vault_uri)
                .field("bearer_token", &bearer_token.is_some())
                .field("client_secret", &client_secret.is_some())
                .finish_non_exhaustive(),
            Self::Vault { address, mount_path, .. } => f
                .debug_struct("Vault")
                .field("address", address)
                .field("mount_path", mount_path)
                .finish_non_exhaustive(),
            Self::Env { prefix } => f.debug_struct("Env").field("prefix", prefix).finish(),
        }
    }
}

impl SecretStoreConfig {
    /// Backend name as reported by the resolver built from this section.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyVault { .. } => "key_vault",
            Self::Vault { .. } => "vault",
            Self::Env { .. } => "env",
        }
    }

    pub(crate) fn check(&self) -> Result<(), ValidationError> {
        match self {
            Self::KeyVault { vault_uri, .. } => require_url(vault_uri, "Key Vault URI"),
            Self::Vault { address, mount_path, .. } => {
                require_url(address, "Vault address")?;
                if mount_path.trim().is_empty() {
                    return Err(invalid("secret_store", "Vault mount path cannot be empty"));
                }
                Ok(())
            }
            Self::Env { prefix } if prefix.is_empty() => {
                Err(invalid("secret_store", "Environment secret prefix cannot be empty"))
            }
            Self::Env { .. } => Ok(()),
        }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Overrides the default `User-Agent`
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: default_timeout_seconds(), user_agent: None }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig { timeout: self.timeout(), ..ClientConfig::default() };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}

/// A scripted case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CaseConfig {
    #[validate(length(min = 1, message = "Case name cannot be empty"))]
    pub name: String,

    /// Secret sent as the subscription key; omitted for anonymous probes
    #[serde(default)]
    pub secret: Option<SecretReference>,

    /// Ingress selectors, probed in order
    #[serde(default)]
    pub ingresses: Vec<String>,

    #[validate(range(min = 100, max = 599, message = "Expected status must be between 100 and 599"))]
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
}

impl CaseConfig {
    /// Authenticated echo through the gateway and the proxy in front of it.
    pub fn canonical() -> Self {
        Self {
            name: CANONICAL_CASE_NAME.to_string(),
            secret: SecretReference::new(MASTER_SUBSCRIPTION_KEY_SECRET).ok(),
            ingresses: vec![
                API_MANAGEMENT_INGRESS.to_string(),
                APPLICATION_GATEWAY_INGRESS.to_string(),
            ],
            expected_status: default_expected_status(),
        }
    }
}

fn default_authority_host() -> String {
    crate::secrets::key_vault::DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_mount_path() -> String {
    "secret".to_string()
}

fn default_env_prefix() -> String {
    DEFAULT_SECRET_PREFIX.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_expected_status() -> u16 {
    200
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn require_url(value: &str, what: &'static str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(ValidationError::new("secret_store")
            .with_message(format!("{} must be an http(s) URL", what).into())),
    }
}
