//! # Error Handling
//!
//! Crate-level error type for configuration and suite construction. Errors
//! raised while a case runs never reach this type: they are folded into the
//! case's [`CaseResult`](crate::conformance::CaseResult).

use crate::ingress::IngressError;
use crate::secrets::SecretsError;

/// Custom result type for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the conformance harness
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Secret resolver construction errors
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    /// Ingress construction errors
    #[error(transparent)]
    Ingress(#[from] IngressError),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        // Display quotes the offending line, which may hold a credential.
        Self::Config(format!("invalid TOML: {}", error.message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::config("missing ingress").to_string(), "Configuration error: missing ingress");

        let err: Error = SecretsError::config_error("empty vault uri").into();
        assert_eq!(err.to_string(), "Configuration error: empty vault uri");

        let err: Error = IngressError::invalid_endpoint("gw", "no host").into();
        assert!(err.to_string().contains("'gw'"));
    }
}
