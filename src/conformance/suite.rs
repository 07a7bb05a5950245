//! Ordered execution of registered conformance cases.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn, Instrument};

use super::case::{CaseContext, ConformanceCase};
use super::result::{CaseResult, SuiteReport};
use crate::config::ConformanceConfig;
use crate::errors::Result;
use crate::ingress::IngressRegistry;
use crate::secrets::SecretResolver;

/// Runs cases one after another in registration order.
///
/// Each run yields exactly one [`CaseResult`] per registered case, so results
/// map 1:1 onto cases and are reproducible. Running never fails; the caller
/// turns the report into a process exit status.
pub struct ConformanceSuite {
    resolver: Arc<dyn SecretResolver>,
    ingresses: IngressRegistry,
    cases: Vec<ConformanceCase>,
}

impl std::fmt::Debug for ConformanceSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConformanceSuite")
            .field("resolver", &self.resolver.backend())
            .field("ingresses", &self.ingresses.names().collect::<Vec<_>>())
            .field("cases", &self.cases.len())
            .finish()
    }
}

impl ConformanceSuite {
    /// An empty suite over the given collaborators.
    pub fn new(resolver: Arc<dyn SecretResolver>, ingresses: IngressRegistry) -> Self {
        Self { resolver, ingresses, cases: Vec::new() }
    }

    /// Build ingress clients and register the cases declared by `config`.
    ///
    /// The resolver is passed in rather than built here so tests can supply
    /// fakes; see [`ConformanceConfig::build_resolver`].
    pub fn from_config(
        config: &ConformanceConfig,
        resolver: Arc<dyn SecretResolver>,
    ) -> Result<Self> {
        let ingresses = config.build_ingresses()?;
        let mut suite = Self::new(resolver, ingresses);
        for case in config.cases() {
            suite.register(case);
        }
        Ok(suite)
    }

    pub fn register(&mut self, case: ConformanceCase) {
        self.cases.push(case);
    }

    pub fn cases(&self) -> &[ConformanceCase] {
        &self.cases
    }

    pub fn ingresses(&self) -> &IngressRegistry {
        &self.ingresses
    }

    fn context(&self) -> CaseContext<'_> {
        CaseContext { resolver: self.resolver.as_ref(), ingresses: &self.ingresses }
    }

    /// Run every case sequentially.
    pub async fn run_all(&self) -> SuiteReport {
        let span = tracing::info_span!(
            "suite_run",
            run_id = %uuid::Uuid::new_v4(),
            cases = self.cases.len(),
            backend = self.resolver.backend()
        );

        async {
            let ctx = self.context();
            let mut results = Vec::with_capacity(self.cases.len());
            for case in &self.cases {
                results.push(case.run(&ctx).await);
            }
            Self::finish(results)
        }
        .instrument(span)
        .await
    }

    /// Run every case sequentially, giving up once `budget` has elapsed.
    ///
    /// The case in flight at the deadline and every case after it are
    /// reported as `Cancelled`. Results completed before the deadline are kept.
    pub async fn run_all_with_deadline(&self, budget: Duration) -> SuiteReport {
        // A budget past the end of the clock can never expire.
        let Some(deadline) = Instant::now().checked_add(budget) else {
            return self.run_all().await;
        };

        let span = tracing::info_span!(
            "suite_run",
            run_id = %uuid::Uuid::new_v4(),
            cases = self.cases.len(),
            backend = self.resolver.backend(),
            deadline_ms = budget.as_millis() as u64
        );

        async {
            let ctx = self.context();
            let mut results = Vec::with_capacity(self.cases.len());
            let mut expired = false;

            for case in &self.cases {
                if expired {
                    results.push(CaseResult::cancelled(case.name()));
                    continue;
                }

                match tokio::time::timeout_at(deadline, case.run(&ctx)).await {
                    Ok(result) => results.push(result),
                    Err(_) => {
                        warn!(case = %case.name(), "Suite deadline exceeded, cancelling remaining cases");
                        expired = true;
                        results.push(CaseResult::cancelled(case.name()));
                    }
                }
            }

            Self::finish(results)
        }
        .instrument(span)
        .await
    }

    fn finish(results: Vec<CaseResult>) -> SuiteReport {
        let report = SuiteReport::new(results);
        let summary = report.summary();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            first_failure = summary.first_failure.as_deref().unwrap_or(""),
            "Suite finished"
        );
        report
    }
}
