//! A single scripted conformance scenario.

use http::StatusCode;
use tracing::{debug, info, warn, Instrument};

use super::result::{CaseResult, FailureKind, IngressObservation};
use crate::case_span;
use crate::ingress::{Endpoint, IngressClient, IngressRegistry, RequestSpec, SUBSCRIPTION_KEY_PARAM};
use crate::secrets::{ResolvedSecret, SecretReference, SecretResolver};

/// Path of the backend echo operation, relative to each ingress.
pub const ECHO_PATH: &str = "echo";

/// Marker parameter sent with every probe so the echo response is recognisable.
pub const PROBE_PARAM: (&str, &str) = ("foo", "bar");

/// Collaborators a case runs against.
#[derive(Clone, Copy)]
pub struct CaseContext<'a> {
    pub resolver: &'a dyn SecretResolver,
    pub ingresses: &'a IngressRegistry,
}

/// One request/response expectation over one or more ingresses.
///
/// ```rust,ignore
/// let case = ConformanceCase::new("echo with subscription key in query")
///     .with_secret(SecretReference::new("apim-master-subscription-key")?)
///     .through("api-management")
///     .through("application-gateway")
///     .expect_status(200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceCase {
    name: String,
    secret: Option<SecretReference>,
    ingresses: Vec<String>,
    expected_status: u16,
}

impl ConformanceCase {
    /// A case expecting `200 OK` with no secret and no ingress selected yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secret: None,
            ingresses: Vec::new(),
            expected_status: StatusCode::OK.as_u16(),
        }
    }

    /// Resolve `secret` and send it as the subscription key.
    pub fn with_secret(mut self, secret: SecretReference) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Append an ingress selector. Ingresses are probed in the order added.
    pub fn through(mut self, ingress: impl Into<String>) -> Self {
        self.ingresses.push(ingress.into());
        self
    }

    /// Append several ingress selectors.
    pub fn through_all<I, S>(mut self, ingresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingresses.extend(ingresses.into_iter().map(Into::into));
        self
    }

    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret(&self) -> Option<&SecretReference> {
        self.secret.as_ref()
    }

    pub fn ingresses(&self) -> &[String] {
        &self.ingresses
    }

    pub fn expected_status(&self) -> u16 {
        self.expected_status
    }

    /// The echo probe for `endpoint`: `echo?subscription-key=<value>&foo=bar`
    /// when a secret was resolved, `echo?foo=bar` otherwise.
    pub fn request_for(&self, endpoint: &Endpoint, secret: Option<&ResolvedSecret>) -> RequestSpec {
        let request = RequestSpec::new(endpoint.clone(), ECHO_PATH);
        let request = match secret {
            Some(secret) => {
                request.with_param(SUBSCRIPTION_KEY_PARAM, secret.value().expose_secret())
            }
            None => request,
        };
        request.with_param(PROBE_PARAM.0, PROBE_PARAM.1)
    }

    /// Run the scenario. Never fails: every error becomes a failed result.
    pub async fn run(&self, ctx: &CaseContext<'_>) -> CaseResult {
        let span = case_span!(self.name, self.ingresses.len());
        let result = self.execute(ctx).instrument(span.clone()).await;

        span.in_scope(|| match result.kind() {
            None => info!(case = %self.name, "Case passed"),
            Some(kind) => warn!(
                case = %self.name,
                kind = %kind,
                message = result.message().unwrap_or_default(),
                "Case failed"
            ),
        });

        result
    }

    async fn execute(&self, ctx: &CaseContext<'_>) -> CaseResult {
        let clients = match self.select_ingresses(ctx.ingresses) {
            Ok(clients) => clients,
            Err(message) => {
                return CaseResult::failed(&self.name, FailureKind::InvalidCaseConfiguration, message)
            }
        };

        let secret = match &self.secret {
            None => None,
            Some(reference) => match ctx.resolver.resolve(reference).await {
                Ok(resolved) => {
                    debug!(
                        secret = %reference,
                        backend = ctx.resolver.backend(),
                        version = resolved.version().unwrap_or("unknown"),
                        "Secret resolved"
                    );
                    Some(resolved)
                }
                Err(error) => {
                    let kind = FailureKind::from(&error);
                    warn!(
                        secret = %reference,
                        backend = ctx.resolver.backend(),
                        error = %error,
                        "Secret resolution failed"
                    );
                    return CaseResult::failed(
                        &self.name,
                        kind,
                        format!("secret resolution failed: {}", kind),
                    );
                }
            },
        };

        let mut observations = Vec::with_capacity(clients.len());
        for client in clients {
            let request = self.request_for(client.endpoint(), secret.as_ref());

            let outcome = match client.send(&request).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    let kind = FailureKind::from(&error);
                    warn!(ingress = %client.name(), error = %error, "Ingress request failed");
                    return CaseResult::failed(
                        &self.name,
                        kind,
                        format!("ingress '{}' request failed: {}", client.name(), kind),
                    )
                    .with_observations(observations);
                }
            };

            let status = outcome.status_code();
            observations.push(IngressObservation { ingress: client.name().to_string(), status });

            if status != self.expected_status {
                return CaseResult::failed(
                    &self.name,
                    FailureKind::StatusMismatch,
                    format!(
                        "ingress '{}' expected {}, got {}",
                        client.name(),
                        self.expected_status,
                        status
                    ),
                )
                .with_observations(observations);
            }
        }

        CaseResult::passed(&self.name, observations)
    }

    fn select_ingresses<'r>(
        &self,
        registry: &'r IngressRegistry,
    ) -> Result<Vec<&'r IngressClient>, String> {
        if self.ingresses.is_empty() {
            return Err("case selects no ingress".to_string());
        }

        self.ingresses
            .iter()
            .map(|name| {
                registry.get(name).ok_or_else(|| format!("unknown ingress selector '{}'", name))
            })
            .collect()
    }
}
