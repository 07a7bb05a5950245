//! Case outcomes and suite aggregation.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::ingress::IngressError;
use crate::secrets::SecretsError;

/// Why a case failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    SecretNotFound,
    SecretStoreUnavailable,
    SecretAccessDenied,
    Network,
    InvalidResponse,
    InvalidRequest,
    InvalidCaseConfiguration,
    StatusMismatch,
    Cancelled,
}

impl FailureKind {
    /// Stable name used in messages and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecretNotFound => "SecretNotFoundError",
            Self::SecretStoreUnavailable => "SecretStoreUnavailableError",
            Self::SecretAccessDenied => "SecretAccessDeniedError",
            Self::Network => "NetworkError",
            Self::InvalidResponse => "InvalidResponseError",
            Self::InvalidRequest => "InvalidRequestError",
            Self::InvalidCaseConfiguration => "InvalidCaseConfigurationError",
            Self::StatusMismatch => "StatusMismatch",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FailureKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl From<&SecretsError> for FailureKind {
    fn from(error: &SecretsError) -> Self {
        match error {
            SecretsError::NotFound { .. } => Self::SecretNotFound,
            SecretsError::AccessDenied { .. } => Self::SecretAccessDenied,
            SecretsError::InvalidName { .. } => Self::InvalidCaseConfiguration,
            SecretsError::StoreUnavailable { .. } | SecretsError::ConfigError { .. } => {
                Self::SecretStoreUnavailable
            }
        }
    }
}

impl From<&IngressError> for FailureKind {
    fn from(error: &IngressError) -> Self {
        match error {
            IngressError::Network { .. } => Self::Network,
            IngressError::InvalidResponse { .. } => Self::InvalidResponse,
            IngressError::InvalidRequest { .. } => Self::InvalidRequest,
            IngressError::InvalidEndpoint { .. } => Self::InvalidCaseConfiguration,
        }
    }
}

/// Status observed on one ingress before the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngressObservation {
    pub ingress: String,
    pub status: u16,
}

/// Outcome of one conformance case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    name: String,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    observations: Vec<IngressObservation>,
}

impl CaseResult {
    /// A passing result.
    pub fn passed(name: impl Into<String>, observations: Vec<IngressObservation>) -> Self {
        Self { name: name.into(), passed: true, kind: None, message: None, observations }
    }

    /// A failing result.
    pub fn failed(name: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            kind: Some(kind),
            message: Some(message.into()),
            observations: Vec::new(),
        }
    }

    /// A result for a case aborted by the suite deadline.
    pub fn cancelled(name: impl Into<String>) -> Self {
        Self::failed(name, FailureKind::Cancelled, "cancelled: suite deadline exceeded")
    }

    /// Attach the observations gathered before the failure.
    pub fn with_observations(mut self, observations: Vec<IngressObservation>) -> Self {
        self.observations = observations;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_passed(&self) -> bool {
        self.passed
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn observations(&self) -> &[IngressObservation] {
        &self.observations
    }
}

/// Pass/fail counts plus the first failure, for quick diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub first_failure: Option<String>,
}

/// Ordered results of one suite run, one per registered case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    results: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn new(results: Vec<CaseResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    /// True iff every case passed. An empty report counts as passed.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(CaseResult::is_passed)
    }

    pub fn summary(&self) -> SuiteSummary {
        let passed = self.results.iter().filter(|r| r.is_passed()).count();
        let first_failure = self.results.iter().find(|r| !r.is_passed()).map(|r| {
            format!("{}: {}", r.name(), r.message().unwrap_or("failed"))
        });

        SuiteSummary {
            total: self.results.len(),
            passed,
            failed: self.results.len() - passed,
            first_failure,
        }
    }
}
