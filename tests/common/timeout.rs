//! Hard timeout utilities for integration tests
//!
//! Every network-facing test awaits under a hard timeout.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for a whole suite run (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Quick timeout for single requests (5 seconds)
pub const QUICK_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout configuration for tests
#[derive(Debug, Clone)]
pub struct TestTimeout {
    pub duration: Duration,
    /// Human-readable label for error messages
    pub label: String,
}

impl TestTimeout {
    pub fn new(duration: Duration, label: impl Into<String>) -> Self {
        Self { duration, label: label.into() }
    }

    pub fn default_with_label(label: impl Into<String>) -> Self {
        Self::new(DEFAULT_TIMEOUT, label)
    }

    pub fn quick(label: impl Into<String>) -> Self {
        Self::new(QUICK_TIMEOUT, label)
    }
}

/// Await `fut`, panicking with the label if it exceeds the timeout.
pub async fn with_timeout<F, T>(timeout_cfg: TestTimeout, fut: F) -> T
where
    F: Future<Output = T>,
{
    match timeout(timeout_cfg.duration, fut).await {
        Ok(result) => result,
        Err(_elapsed) => panic!(
            "TIMEOUT: '{}' exceeded {:?} - test is likely stuck",
            timeout_cfg.label, timeout_cfg.duration
        ),
    }
}
