//! Error types for ingress requests.

use thiserror::Error;

/// Result type for ingress operations.
pub type Result<T> = std::result::Result<T, IngressError>;

/// Errors raised while issuing a request through an ingress.
///
/// Messages never contain request URLs: a target may carry a credential in
/// its query string.
#[derive(Error, Debug)]
pub enum IngressError {
    /// Connection failure or timeout.
    #[error("Network error on ingress '{ingress}': {message}")]
    Network { ingress: String, message: String },

    /// The transport returned something that is not a valid HTTP response.
    #[error("Invalid response from ingress '{ingress}': {message}")]
    InvalidResponse { ingress: String, message: String },

    /// The request could not be constructed.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Invalid endpoint configuration.
    #[error("Invalid endpoint '{name}': {reason}")]
    InvalidEndpoint { name: String, reason: String },
}

impl IngressError {
    /// Create a network error.
    pub fn network(ingress: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network { ingress: ingress.into(), message: message.into() }
    }

    /// Create an invalid response error.
    pub fn invalid_response(ingress: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse { ingress: ingress.into(), message: message.into() }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    /// Create an invalid endpoint error.
    pub fn invalid_endpoint(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint { name: name.into(), reason: reason.into() }
    }

    /// Stable failure-kind name surfaced in case results.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "NetworkError",
            Self::InvalidResponse { .. } => "InvalidResponseError",
            Self::InvalidRequest { .. } => "InvalidRequestError",
            Self::InvalidEndpoint { .. } => "InvalidEndpointError",
        }
    }
}
