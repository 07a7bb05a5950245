//! Request targets and query string construction.

use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

use super::endpoint::Endpoint;
use super::error::{IngressError, Result};
use crate::secrets::REDACTED;

/// Query parameter carrying the API gateway subscription key.
pub const SUBSCRIPTION_KEY_PARAM: &str = "subscription-key";

/// Query parameters whose values are credentials and must never be logged.
const SENSITIVE_QUERY_KEYS: &[&str] = &[SUBSCRIPTION_KEY_PARAM];

/// One GET request against an ingress, built fresh per call.
///
/// Query parameters keep their insertion order in the target URL. Values are
/// zeroed on drop since they may hold credentials.
#[derive(Clone)]
pub struct RequestSpec {
    endpoint: Endpoint,
    path: String,
    query: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(endpoint: Endpoint, path: impl Into<String>) -> Self {
        Self { endpoint, path: path.into(), query: Vec::new() }
    }

    /// Append a query parameter after the ones already present.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append parameters in the given order.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parameter keys in order. Values are not exposed.
    pub fn query_keys(&self) -> impl Iterator<Item = &str> {
        self.query.iter().map(|(k, _)| k.as_str())
    }

    /// The exact URL the request is sent to.
    ///
    /// # Errors
    ///
    /// [`IngressError::InvalidRequest`] when the relative path is an absolute
    /// URL, carries a fragment, or already has a query string while
    /// parameters were also supplied.
    pub fn target(&self) -> Result<String> {
        self.build_target(false)
    }

    /// The target with credential values replaced by `[REDACTED]`, for logs.
    pub fn redacted_target(&self) -> Result<String> {
        self.build_target(true)
    }

    fn build_target(&self, redact: bool) -> Result<String> {
        let path = self.path.trim_start_matches('/');

        if path.contains("://") {
            return Err(IngressError::invalid_request(
                "relative path must not be an absolute URL",
            ));
        }

        if path.contains('#') {
            return Err(IngressError::invalid_request("relative path must not carry a fragment"));
        }

        let mut target = format!("{}/{}", self.endpoint.base_url(), path);
        if self.query.is_empty() {
            return Ok(target);
        }

        if path.contains('?') {
            return Err(IngressError::invalid_request(
                "relative path already has a query string; pass parameters separately",
            ));
        }

        target.push('?');
        target.push_str(&encode_query(&self.query, redact));
        Ok(target)
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("endpoint", &self.endpoint.name())
            .field("path", &self.path)
            .field("query_keys", &self.query_keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Drop for RequestSpec {
    fn drop(&mut self) {
        for (_, value) in self.query.iter_mut() {
            value.zeroize();
        }
    }
}

/// Whether a query parameter carries a credential.
pub fn is_sensitive_param(key: &str) -> bool {
    SENSITIVE_QUERY_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Percent-encode `pairs` as `k=v` joined by `&`, preserving order.
fn encode_query(pairs: &[(String, String)], redact: bool) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            let value = if redact && is_sensitive_param(key) {
                Cow::Borrowed(REDACTED)
            } else {
                urlencoding::encode(value)
            };
            format!("{}={}", urlencoding::encode(key), value)
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::parse("api-management", "https://gw.example").unwrap()
    }

    #[test]
    fn test_target_preserves_parameter_order() {
        let spec = RequestSpec::new(endpoint(), "echo")
            .with_param(SUBSCRIPTION_KEY_PARAM, "ABC123")
            .with_param("foo", "bar");
        assert_eq!(spec.target().unwrap(), "https://gw.example/echo?subscription-key=ABC123&foo=bar");

        let reversed = RequestSpec::new(endpoint(), "echo")
            .with_param("foo", "bar")
            .with_param(SUBSCRIPTION_KEY_PARAM, "ABC123");
        assert_eq!(
            reversed.target().unwrap(),
            "https://gw.example/echo?foo=bar&subscription-key=ABC123"
        );
    }

    #[test]
    fn test_target_without_parameters_has_no_question_mark() {
        let spec = RequestSpec::new(endpoint(), "/echo");
        assert_eq!(spec.target().unwrap(), "https://gw.example/echo");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let spec = RequestSpec::new(endpoint(), "echo").with_param("q", "a b&c=d/é");
        assert_eq!(spec.target().unwrap(), "https://gw.example/echo?q=a%20b%26c%3Dd%2F%C3%A9");
    }

    #[test]
    fn test_existing_query_with_parameters_is_rejected() {
        let spec = RequestSpec::new(endpoint(), "echo?x=1").with_param("foo", "bar");
        assert!(matches!(spec.target(), Err(IngressError::InvalidRequest { .. })));

        // A pre-built query string alone is passed through untouched.
        let spec = RequestSpec::new(endpoint(), "echo?x=1");
        assert_eq!(spec.target().unwrap(), "https://gw.example/echo?x=1");
    }

    #[test]
    fn test_absolute_path_is_rejected() {
        let spec = RequestSpec::new(endpoint(), "https://other.example/echo");
        assert!(matches!(spec.target(), Err(IngressError::InvalidRequest { .. })));
    }

    #[test]
    fn test_redacted_target_and_debug_hide_credentials() {
        let spec = RequestSpec::new(endpoint(), "echo")
            .with_param(SUBSCRIPTION_KEY_PARAM, "ABC123")
            .with_param("foo", "bar");

        let redacted = spec.redacted_target().unwrap();
        assert_eq!(redacted, "https://gw.example/echo?subscription-key=[REDACTED]&foo=bar");
        assert!(!format!("{:?}", spec).contains("ABC123"));
    }
}
