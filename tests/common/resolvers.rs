//! In-memory secret resolvers

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use gateway_conformance::secrets::{
    ResolvedSecret, Result, SecretReference, SecretResolver, SecretString, SecretsError,
};

/// Resolves from a fixed map and counts calls.
#[derive(Debug, Default)]
pub struct StaticResolver {
    secrets: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: &str, value: &str) -> Self {
        self.secrets.insert(name.to_string(), value.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretResolver for StaticResolver {
    async fn resolve(&self, secret: &SecretReference) -> Result<ResolvedSecret> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .get(secret.as_str())
            .map(|value| ResolvedSecret::new(secret.clone(), SecretString::new(value.clone())))
            .ok_or_else(|| SecretsError::not_found(secret.as_str()))
    }

    fn backend(&self) -> &'static str {
        "static"
    }
}

/// Always fails with the error produced by `make`.
pub struct FailingResolver {
    make: fn(&SecretReference) -> SecretsError,
}

impl FailingResolver {
    pub fn new(make: fn(&SecretReference) -> SecretsError) -> Self {
        Self { make }
    }

    pub fn unavailable() -> Self {
        Self::new(|_| SecretsError::store_unavailable("connection refused"))
    }

    pub fn denied() -> Self {
        Self::new(|secret| SecretsError::access_denied(secret.as_str()))
    }
}

#[async_trait]
impl SecretResolver for FailingResolver {
    async fn resolve(&self, secret: &SecretReference) -> Result<ResolvedSecret> {
        Err((self.make)(secret))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
