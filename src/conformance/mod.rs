//! # Conformance Cases and Suites
//!
//! A [`ConformanceCase`] resolves an optional credential, sends the echo probe
//! through each selected ingress in order, and compares every status against
//! its expectation. A [`ConformanceSuite`] runs registered cases sequentially
//! and returns one [`CaseResult`] per case.
//!
//! ```text
//! ConformanceSuite ─▶ ConformanceCase ─▶ SecretResolver ─▶ secret store
//!                                    └─▶ IngressClient ─▶ gateway ─▶ echo
//! ```

pub mod case;
pub mod report;
pub mod result;
pub mod suite;

pub use case::{CaseContext, ConformanceCase, ECHO_PATH};
pub use report::{render, ReportFormat};
pub use result::{CaseResult, FailureKind, IngressObservation, SuiteReport, SuiteSummary};
pub use suite::ConformanceSuite;
