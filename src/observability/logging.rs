//! # Structured Logging
//!
//! Subscriber setup and span macros using the tracing ecosystem.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level(), json: false }
    }
}

impl LoggingConfig {
    /// Filter directive to use, honouring `RUST_LOG` first and `verbose` second.
    pub fn filter(&self, verbose: bool) -> EnvFilter {
        let fallback = if verbose { "debug" } else { self.level.as_str() };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Install the global subscriber. Logs go to stderr so reports on stdout stay
/// machine-readable.
pub fn init_logging(config: &LoggingConfig, verbose: bool) {
    let builder = FmtSubscriber::builder()
        .with_env_filter(config.filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }
}

/// Create a tracing span for one conformance case.
///
/// ```rust,ignore
/// let span = case_span!("echo with key", 2);
/// let span = case_span!("echo with key", 2, secret = %"apim-master-subscription-key");
/// ```
#[macro_export]
macro_rules! case_span {
    ($name:expr, $ingresses:expr) => {
        tracing::info_span!(
            "conformance_case",
            case = %$name,
            ingresses = $ingresses,
            case_id = %uuid::Uuid::new_v4()
        )
    };
    ($name:expr, $ingresses:expr, $($field:tt)*) => {
        tracing::info_span!(
            "conformance_case",
            case = %$name,
            ingresses = $ingresses,
            case_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_defaults() {
        let config: LoggingConfig = toml::from_str("").unwrap();
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }

    #[test]
    fn test_verbose_overrides_configured_level() {
        let config = LoggingConfig { level: "warn".into(), json: false };
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(config.filter(false).to_string(), "warn");
            assert_eq!(config.filter(true).to_string(), "debug");
        }
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_case_span_fields() {
        let span = crate::case_span!("echo", 2usize);
        span.in_scope(|| tracing::info!("inside case"));
        assert!(logs_contain("conformance_case"));
        assert!(logs_contain("inside case"));
    }
}
