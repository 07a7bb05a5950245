//! Core secret resolver trait.

use async_trait::async_trait;
use std::sync::Arc;

use super::error::Result;
use super::types::{ResolvedSecret, SecretReference};

/// Fetches the current value of a named secret from a remote store.
///
/// # Contract
///
/// - One round trip to the store per call. Implementations MUST NOT cache;
///   secrets may rotate between runs and callers decide what to share.
/// - No retries. Transient failures surface to the caller.
/// - Implementations MUST NOT log secret values.
///
/// # Errors
///
/// - [`SecretsError::NotFound`](super::SecretsError::NotFound) if the store has no such secret
/// - [`SecretsError::StoreUnavailable`](super::SecretsError::StoreUnavailable) if the store is
///   unreachable or rejects the harness's credentials
/// - [`SecretsError::AccessDenied`](super::SecretsError::AccessDenied) if the identity lacks
///   permission on the secret
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolve `secret` to its current value.
    async fn resolve(&self, secret: &SecretReference) -> Result<ResolvedSecret>;

    /// Short backend name used in log fields.
    fn backend(&self) -> &'static str;
}

#[async_trait]
impl<T: SecretResolver + ?Sized> SecretResolver for Arc<T> {
    async fn resolve(&self, secret: &SecretReference) -> Result<ResolvedSecret> {
        (**self).resolve(secret).await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
