//! Logging and Prometheus metrics setup.

use std::str::FromStr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::{AppError, ConfigError};

/// Prometheus handle for on-demand scrape output (e.g. GET /metrics).
pub type PrometheusHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Counter of lookups, labelled by `operation` and `outcome`.
pub const LOOKUPS_TOTAL: &str = "ens_lookups_total";
/// Histogram of lookup latency in seconds, labelled by `operation`.
pub const LOOKUP_DURATION_SECONDS: &str = "ens_lookup_duration_seconds";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT".to_string(),
                message: format!("expected 'pretty' or 'json', got '{other}'"),
            }),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Output goes to stderr
/// so that command output on stdout stays clean.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }
}

/// Install the global metrics recorder and return a handle for rendering.
///
/// Uses `PrometheusBuilder` without an HTTP listener; the application
/// exposes metrics via GET /metrics using `handle.render()`.
///
/// # Errors
/// Returns an error if a recorder is already installed or building fails.
pub fn init_metrics() -> Result<PrometheusHandle, AppError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Internal(format!("metrics recorder: {e}")))
}

/// Records outcome and latency of one lookup operation.
pub fn record_lookup(operation: &'static str, started: Instant, error: Option<&AppError>) {
    let outcome = match error {
        None => "success",
        Some(e) if e.is_not_found() => "not_found",
        Some(_) => "error",
    };
    metrics::counter!(LOOKUPS_TOTAL, "operation" => operation, "outcome" => outcome).increment(1);
    metrics::histogram!(LOOKUP_DURATION_SECONDS, "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}
