//! # Observability
//!
//! Structured logging for suite runs. Every case runs inside a
//! `conformance_case` span (see [`case_span!`](crate::case_span)) nested in a
//! `suite_run` span, so log lines can be grouped per run and per case.
//!
//! Secret values never reach a log line: requests are logged through their
//! redacted target and resolved secrets only by name and version.

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
