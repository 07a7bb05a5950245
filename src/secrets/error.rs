//! Error types for secret resolution.

use thiserror::Error;

/// Result type for secrets operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while resolving a secret.
///
/// Messages carry secret *names* at most, never values.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// The store holds no secret under that name.
    #[error("Secret not found: {name}")]
    NotFound { name: String },

    /// The store could not be reached, or rejected the harness's own credentials.
    #[error("Secret store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// The caller's identity is authenticated but may not read the secret.
    #[error("Access denied to secret: {name}")]
    AccessDenied { name: String },

    /// Invalid secret name format.
    #[error("Invalid secret name: {name} - {reason}")]
    InvalidName { name: String, reason: String },

    /// Resolver configuration error.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl SecretsError {
    /// Create a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a store unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable { message: message.into() }
    }

    /// Create an access denied error.
    pub fn access_denied(name: impl Into<String>) -> Self {
        Self::AccessDenied { name: name.into() }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into(), reason: reason.into() }
    }

    /// Create a config error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    /// Stable failure-kind name surfaced in case results.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "SecretNotFoundError",
            Self::StoreUnavailable { .. } => "SecretStoreUnavailableError",
            Self::AccessDenied { .. } => "SecretAccessDeniedError",
            Self::InvalidName { .. } => "InvalidSecretNameError",
            Self::ConfigError { .. } => "SecretStoreConfigurationError",
        }
    }
}
