//! Structured response returned by an ingress.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// Status, headers and body of one ingress response. Immutable once returned.
///
/// Header lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ResponseOutcome {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self { status, headers, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of header `name` if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
