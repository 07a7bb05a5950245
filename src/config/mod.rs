//! # Configuration Management
//!
//! Loads the harness configuration from a TOML file, or synthesises the
//! canonical two-ingress setup from environment variables when no file is
//! given. Environment overrides are applied on top in both cases.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `GATEWAY_CONFORMANCE_INGRESS_<NAME>_URL` | Base URL of ingress `<name>` |
//! | `GATEWAY_CONFORMANCE_KEY_VAULT_URI` | Key Vault URI |
//! | `AZURE_KEYVAULT_BEARER_TOKEN` | Static Key Vault access token |
//! | `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET` | Service principal |
//! | `VAULT_ADDR`, `VAULT_TOKEN` | HashiCorp Vault address and token |
//! | `GATEWAY_CONFORMANCE_HTTP_TIMEOUT_SECONDS` | Per-request timeout |
//!
//! `<NAME>` is the ingress name upper-cased with `-` replaced by `_`, so
//! `api-management` is read from `GATEWAY_CONFORMANCE_INGRESS_API_MANAGEMENT_URL`.

pub mod settings;

use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::conformance::ConformanceCase;
use crate::errors::{Error, Result};
use crate::ingress::{ClientConfig, Endpoint, IngressRegistry};
use crate::secrets::{
    EnvSecretResolver, KeyVaultConfig, KeyVaultCredential, KeyVaultSecretResolver, SecretResolver,
    SecretString, VaultConfig, VaultSecretResolver,
};

pub use settings::{
    CaseConfig, ConformanceConfig, HttpConfig, IngressConfig, SecretStoreConfig,
    API_MANAGEMENT_INGRESS, APPLICATION_GATEWAY_INGRESS, CANONICAL_CASE_NAME,
    MASTER_SUBSCRIPTION_KEY_SECRET,
};

/// Prefix shared by every harness environment variable.
pub const ENV_PREFIX: &str = "GATEWAY_CONFORMANCE_";

pub const KEY_VAULT_URI_VAR: &str = "GATEWAY_CONFORMANCE_KEY_VAULT_URI";
pub const HTTP_TIMEOUT_VAR: &str = "GATEWAY_CONFORMANCE_HTTP_TIMEOUT_SECONDS";
pub const KEY_VAULT_BEARER_TOKEN_VAR: &str = "AZURE_KEYVAULT_BEARER_TOKEN";
pub const AZURE_TENANT_ID_VAR: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET_VAR: &str = "AZURE_CLIENT_SECRET";
pub const VAULT_ADDR_VAR: &str = "VAULT_ADDR";
pub const VAULT_TOKEN_VAR: &str = "VAULT_TOKEN";

/// Environment variable overriding the base URL of ingress `name`.
pub fn ingress_url_var(name: &str) -> String {
    format!("{}INGRESS_{}_URL", ENV_PREFIX, name.to_uppercase().replace('-', "_"))
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

impl ConformanceConfig {
    /// Load from `path` if given, otherwise from the process environment,
    /// then apply overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, process_env)
    }

    /// [`load`](Self::load) with an explicit variable lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_lookup(&lookup)?,
        };
        config.apply_overrides(&lookup)?;
        config.validate()?;

        debug!(
            ingresses = config.ingresses.len(),
            cases = config.cases.len(),
            secret_store = config.secret_store.kind(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML file. Overrides are not applied.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, format!("Failed to read {}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// The canonical setup: the gateway and the proxy in front of it, with
    /// credentials from Key Vault when its URI is set, Vault when `VAULT_ADDR`
    /// is set, and the environment otherwise.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ingresses = [API_MANAGEMENT_INGRESS, APPLICATION_GATEWAY_INGRESS]
            .into_iter()
            .map(|name| {
                let var = ingress_url_var(name);
                lookup(&var)
                    .map(|url| IngressConfig { name: name.to_string(), url })
                    .ok_or_else(|| {
                        Error::config(format!("{} is not set and no config file was given", var))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let secret_store = if let Some(vault_uri) = lookup(KEY_VAULT_URI_VAR) {
            SecretStoreConfig::KeyVault {
                vault_uri,
                bearer_token: None,
                tenant_id: None,
                client_id: None,
                client_secret: None,
                authority_host: crate::secrets::key_vault::DEFAULT_AUTHORITY_HOST.to_string(),
            }
        } else if let Some(address) = lookup(VAULT_ADDR_VAR) {
            SecretStoreConfig::Vault {
                address,
                token: None,
                namespace: None,
                mount_path: "secret".to_string(),
            }
        } else {
            SecretStoreConfig::Env {
                prefix: crate::secrets::env::DEFAULT_SECRET_PREFIX.to_string(),
            }
        };

        Ok(Self {
            ingresses,
            secret_store,
            http: HttpConfig::default(),
            logging: Default::default(),
            cases: Vec::new(),
        })
    }

    /// Apply environment overrides. Credentials only fill fields that the
    /// file left unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for ingress in &mut self.ingresses {
            if let Some(url) = lookup(&ingress_url_var(&ingress.name)) {
                ingress.url = url;
            }
        }

        match &mut self.secret_store {
            SecretStoreConfig::KeyVault {
                vault_uri,
                bearer_token,
                tenant_id,
                client_id,
                client_secret,
                ..
            } => {
                if let Some(uri) = lookup(KEY_VAULT_URI_VAR) {
                    *vault_uri = uri;
                }
                if bearer_token.is_none() {
                    *bearer_token = lookup(KEY_VAULT_BEARER_TOKEN_VAR).map(SecretString::new);
                }
                if tenant_id.is_none() {
                    *tenant_id = lookup(AZURE_TENANT_ID_VAR);
                }
                if client_id.is_none() {
                    *client_id = lookup(AZURE_CLIENT_ID_VAR);
                }
                if client_secret.is_none() {
                    *client_secret = lookup(AZURE_CLIENT_SECRET_VAR).map(SecretString::new);
                }
            }
            SecretStoreConfig::Vault { address, token, .. } => {
                if let Some(addr) = lookup(VAULT_ADDR_VAR) {
                    *address = addr;
                }
                if token.is_none() {
                    *token = lookup(VAULT_TOKEN_VAR).map(SecretString::new);
                }
            }
            SecretStoreConfig::Env { .. } => {}
        }

        if let Some(timeout) = lookup(HTTP_TIMEOUT_VAR) {
            self.http.timeout_seconds = timeout.trim().parse().map_err(|e| {
                Error::config(format!("Invalid {}: {}", HTTP_TIMEOUT_VAR, e))
            })?;
        }

        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        for (i, ingress) in self.ingresses.iter().enumerate() {
            if self.ingresses[..i].iter().any(|other| other.name == ingress.name) {
                return Err(Error::validation(format!(
                    "Ingress '{}' is declared more than once",
                    ingress.name
                )));
            }
        }

        self.secret_store.check().map_err(|e| {
            Error::validation(e.message.map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        self.http.client_config()
    }

    /// One client per configured ingress, in declaration order.
    pub fn build_ingresses(&self) -> Result<IngressRegistry> {
        let endpoints = self
            .ingresses
            .iter()
            .map(|ingress| Endpoint::parse(ingress.name.clone(), &ingress.url))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(IngressRegistry::from_endpoints(endpoints, &self.client_config())?)
    }

    /// The resolver for the configured secret store. No network traffic
    /// happens until the first case resolves a secret.
    pub fn build_resolver(&self) -> Result<Arc<dyn SecretResolver>> {
        let resolver: Arc<dyn SecretResolver> = match &self.secret_store {
            SecretStoreConfig::KeyVault {
                vault_uri,
                bearer_token,
                tenant_id,
                client_id,
                client_secret,
                authority_host,
            } => {
                let credential = match (bearer_token, tenant_id, client_id, client_secret) {
                    (Some(token), _, _, _) => KeyVaultCredential::StaticToken(token.clone()),
                    (None, Some(tenant_id), Some(client_id), Some(client_secret)) => {
                        KeyVaultCredential::ClientCredentials {
                            authority_host: authority_host.clone(),
                            tenant_id: tenant_id.clone(),
                            client_id: client_id.clone(),
                            client_secret: client_secret.clone(),
                            scope: crate::secrets::key_vault::DEFAULT_KEY_VAULT_SCOPE.to_string(),
                        }
                    }
                    _ => {
                        return Err(Error::config(format!(
                            "Key Vault credentials missing: set {} or {}, {} and {}",
                            KEY_VAULT_BEARER_TOKEN_VAR,
                            AZURE_TENANT_ID_VAR,
                            AZURE_CLIENT_ID_VAR,
                            AZURE_CLIENT_SECRET_VAR
                        )))
                    }
                };

                Arc::new(KeyVaultSecretResolver::new(KeyVaultConfig {
                    vault_uri: vault_uri.clone(),
                    credential,
                    timeout: self.http.timeout(),
                })?)
            }
            SecretStoreConfig::Vault { address, token, namespace, mount_path } => {
                Arc::new(VaultSecretResolver::new(VaultConfig {
                    address: address.clone(),
                    token: token.clone(),
                    namespace: namespace.clone(),
                    mount_path: mount_path.clone(),
                })?)
            }
            SecretStoreConfig::Env { prefix } => Arc::new(EnvSecretResolver::with_prefix(prefix)),
        };

        debug!(backend = resolver.backend(), "Secret resolver built");
        Ok(resolver)
    }

    /// Cases to register, in declaration order. The canonical case is used
    /// when none are declared.
    pub fn cases(&self) -> Vec<ConformanceCase> {
        if self.cases.is_empty() {
            return vec![ConformanceCase::from(&CaseConfig::canonical())];
        }
        self.cases.iter().map(ConformanceCase::from).collect()
    }
}

impl From<&CaseConfig> for ConformanceCase {
    fn from(config: &CaseConfig) -> Self {
        let case = ConformanceCase::new(config.name.clone())
            .through_all(config.ingresses.iter().cloned())
            .expect_status(config.expected_status);

        match &config.secret {
            Some(secret) => case.with_secret(secret.clone()),
            None => case,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    const TOML: &str = r#"
[[ingresses]]
name = "api-management"
url = "https://contoso.azure-api.net"

[[ingresses]]
name = "application-gateway"
url = "https://agw.contoso.com"

[secret_store]
kind = "key_vault"
vault_uri = "https://contoso-kv.vault.azure.net"

[http]
timeout_seconds = 10

[[cases]]
name = "echo without key is rejected"
ingresses = ["api-management"]
expected_status = 401

[[cases]]
name = "echo with key"
secret = "apim-master-subscription-key"
ingresses = ["api-management", "application-gateway"]
"#;

    #[test]
    fn test_ingress_url_var() {
        assert_eq!(
            ingress_url_var("api-management"),
            "GATEWAY_CONFORMANCE_INGRESS_API_MANAGEMENT_URL"
        );
    }

    #[test]
    fn test_parse_toml() {
        let config = ConformanceConfig::from_toml_str(TOML).unwrap();
        config.validate().unwrap();

        assert_eq!(config.ingresses.len(), 2);
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.secret_store.kind(), "key_vault");

        let cases = config.cases();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].expected_status(), 401);
        assert!(cases[0].secret().is_none());
        assert_eq!(cases[1].expected_status(), 200);
        assert_eq!(cases[1].secret().unwrap().as_str(), "apim-master-subscription-key");
    }

    #[test]
    fn test_invalid_secret_name_rejected_at_parse() {
        let toml = TOML.replace("apim-master-subscription-key", "bad name!");
        assert!(matches!(ConformanceConfig::from_toml_str(&toml), Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = ConformanceConfig::from_toml_str(TOML).unwrap();
        config
            .apply_overrides(lookup(&[
                ("GATEWAY_CONFORMANCE_INGRESS_API_MANAGEMENT_URL", "http://127.0.0.1:9000"),
                ("GATEWAY_CONFORMANCE_KEY_VAULT_URI", "https://other-kv.vault.azure.net"),
                ("AZURE_KEYVAULT_BEARER_TOKEN", "tok"),
                ("GATEWAY_CONFORMANCE_HTTP_TIMEOUT_SECONDS", "5"),
            ]))
            .unwrap();

        assert_eq!(config.ingresses[0].url, "http://127.0.0.1:9000");
        assert_eq!(config.ingresses[1].url, "https://agw.contoso.com");
        assert_eq!(config.http.timeout_seconds, 5);
        match &config.secret_store {
            SecretStoreConfig::KeyVault { vault_uri, bearer_token, .. } => {
                assert_eq!(vault_uri, "https://other-kv.vault.azure.net");
                assert_eq!(bearer_token.as_ref().unwrap().expose_secret(), "tok");
            }
            other => panic!("unexpected store {:?}", other),
        }
        assert_eq!(config.build_resolver().unwrap().backend(), "key_vault");
    }

    #[test]
    fn test_invalid_timeout_override() {
        let mut config = ConformanceConfig::from_toml_str(TOML).unwrap();
        let err = config
            .apply_overrides(lookup(&[("GATEWAY_CONFORMANCE_HTTP_TIMEOUT_SECONDS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("GATEWAY_CONFORMANCE_HTTP_TIMEOUT_SECONDS"));
    }

    #[test]
    fn test_key_vault_without_credentials() {
        let config = ConformanceConfig::from_toml_str(TOML).unwrap();
        let err = config.build_resolver().err().expect("expected build_resolver to fail");
        assert!(err.to_string().contains("AZURE_KEYVAULT_BEARER_TOKEN"));
    }

    #[test]
    fn test_canonical_from_env() {
        let config = ConformanceConfig::load_with(
            None,
            lookup(&[
                ("GATEWAY_CONFORMANCE_INGRESS_API_MANAGEMENT_URL", "https://apim.example"),
                ("GATEWAY_CONFORMANCE_INGRESS_APPLICATION_GATEWAY_URL", "https://agw.example"),
            ]),
        )
        .unwrap();

        assert_eq!(config.secret_store.kind(), "env");
        let cases = config.cases();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name(), CANONICAL_CASE_NAME);
        assert_eq!(cases[0].ingresses(), ["api-management", "application-gateway"]);

        let registry = config.build_ingresses().unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["api-management", "application-gateway"]);
    }

    #[test]
    fn test_canonical_requires_ingress_urls() {
        let err = ConformanceConfig::load_with(None, lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("GATEWAY_CONFORMANCE_INGRESS_API_MANAGEMENT_URL"));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ConformanceConfig::from_toml_str(TOML).unwrap();
        config.ingresses[1].name = "api-management".into();
        assert!(matches!(config.validate(), Err(Error::Validation(_))));

        let mut config = ConformanceConfig::from_toml_str(TOML).unwrap();
        config.ingresses.clear();
        assert!(config.validate().is_err());

        let mut config = ConformanceConfig::from_toml_str(TOML).unwrap();
        config.ingresses[0].url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let toml = format!("unexpected = true\n{}", TOML);
        assert!(ConformanceConfig::from_toml_str(&toml).is_err());
    }
}
