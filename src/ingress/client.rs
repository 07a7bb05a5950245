//! HTTP client bound to one ingress endpoint.

use reqwest::{redirect, Client};
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::endpoint::Endpoint;
use super::error::{IngressError, Result};
use super::request::RequestSpec;
use super::response::ResponseOutcome;

/// Transport settings shared by every ingress client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout, covering connect, headers and body.
    pub timeout: Duration,

    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("{}/{}", crate::APP_NAME, crate::VERSION),
        }
    }
}

/// Issues GET requests through one ingress.
///
/// Redirects are not followed and nothing is retried: the status the ingress
/// returns is the status the case sees.
#[derive(Debug, Clone)]
pub struct IngressClient {
    client: Client,
    endpoint: Endpoint,
}

impl IngressClient {
    /// Create a client for `endpoint`.
    pub fn new(endpoint: Endpoint, config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| {
                IngressError::invalid_endpoint(
                    endpoint.name(),
                    format!("failed to build HTTP client: {}", e),
                )
            })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Selector name of the bound ingress.
    pub fn name(&self) -> &str {
        self.endpoint.name()
    }

    /// Build the [`RequestSpec`] for `relative_path` and `query` on this ingress.
    pub fn request<K, V>(&self, relative_path: &str, query: &[(K, V)]) -> RequestSpec
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        RequestSpec::new(self.endpoint.clone(), relative_path)
            .with_params(query.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
    }

    /// Issue `GET <endpoint>/<relative_path>?<query>`.
    ///
    /// # Errors
    ///
    /// - [`IngressError::InvalidRequest`] if the target cannot be built
    /// - [`IngressError::Network`] on connection failure or timeout
    /// - [`IngressError::InvalidResponse`] if the response is malformed
    pub async fn get<K, V>(&self, relative_path: &str, query: &[(K, V)]) -> Result<ResponseOutcome>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.send(&self.request(relative_path, query)).await
    }

    /// Issue the GET described by `request`.
    pub async fn send(&self, request: &RequestSpec) -> Result<ResponseOutcome> {
        let target = request.target()?;
        let redacted = request.redacted_target()?;

        debug!(ingress = %self.name(), target = %redacted, "GET");
        let started = Instant::now();

        let response =
            self.client.get(&target).send().await.map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            IngressError::invalid_response(
                self.name(),
                format!("failed to read response body: {}", e.without_url()),
            )
        })?;

        debug!(
            ingress = %self.name(),
            status = status.as_u16(),
            body_bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Response received"
        );

        Ok(ResponseOutcome::new(status, headers, body))
    }

    fn map_transport_error(&self, error: reqwest::Error) -> IngressError {
        // The URL may carry a credential; it never leaves this function.
        let error = error.without_url();

        if error.is_builder() {
            return IngressError::invalid_request(error.to_string());
        }

        if is_malformed_response(&error) || error.is_decode() || error.is_body() {
            warn!(ingress = %self.name(), error = %error, "Malformed response from ingress");
            return IngressError::invalid_response(self.name(), describe(&error));
        }

        let reason = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {}", describe(&error))
        } else {
            describe(&error)
        };
        warn!(ingress = %self.name(), error = %reason, "Request to ingress failed");
        IngressError::network(self.name(), reason)
    }
}

/// Whether the error chain contains an HTTP parse failure.
fn is_malformed_response(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(err) = source {
        if let Some(hyper_err) = err.downcast_ref::<hyper::Error>() {
            if hyper_err.is_parse() || hyper_err.is_parse_status() || hyper_err.is_incomplete_message()
            {
                return true;
            }
        }
        source = err.source();
    }
    false
}

/// Render an error and its sources on one line.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}
