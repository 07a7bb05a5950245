//! Named ingress base URLs.

use serde::Serialize;
use std::fmt;
use url::Url;

use super::error::{IngressError, Result};

/// Immutable base URL of one ingress, addressed by its selector name.
///
/// The base keeps the exact text it was configured with, minus trailing `/`,
/// so target URLs are built byte-for-byte from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    name: String,
    base_url: String,
}

impl Endpoint {
    /// Parse and validate an endpoint.
    ///
    /// The URL must be absolute `http` or `https` with a host and may carry a
    /// path prefix, but no query string or fragment.
    pub fn parse(name: impl Into<String>, base_url: &str) -> Result<Self> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(IngressError::invalid_endpoint(name, "ingress name cannot be empty"));
        }

        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| {
            IngressError::invalid_endpoint(&name, format!("'{}' is not a valid URL: {}", base_url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(IngressError::invalid_endpoint(
                &name,
                format!("unsupported scheme '{}', expected http or https", parsed.scheme()),
            ));
        }

        if parsed.host_str().is_none() {
            return Err(IngressError::invalid_endpoint(&name, "URL has no host"));
        }

        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(IngressError::invalid_endpoint(
                &name,
                "base URL cannot carry a query string or fragment",
            ));
        }

        Ok(Self { name, base_url: trimmed.to_string() })
    }

    /// Selector name, e.g. `api-management`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base URL without trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.base_url)
    }
}
