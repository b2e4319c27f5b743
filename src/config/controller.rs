//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use std::time::Duration;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How often a healthy managed resource is re-observed (seconds)
    pub poll_interval_secs: u64,
    /// Requeue after a Create or Delete call while the cloud converges (seconds)
    pub short_requeue_secs: u64,
    /// Fibonacci backoff floor for failed reconciliations (seconds)
    pub error_backoff_min_secs: u64,
    /// Fibonacci backoff ceiling for failed reconciliations (seconds)
    pub error_backoff_max_secs: u64,
    /// Exponential backoff starting value for watch stream errors (milliseconds)
    pub backoff_start_ms: u64,
    /// Exponential backoff maximum value for watch stream errors (milliseconds)
    pub backoff_max_ms: u64,
    /// Watch stream restart delay after unknown errors (seconds)
    pub watch_restart_delay_secs: u64,
    /// Watch stream restart delay after stream ends (seconds)
    pub watch_restart_delay_after_end_secs: u64,
    /// Timeout for every cloud API request (seconds)
    pub cloud_request_timeout_secs: u64,
    /// Maximum concurrent reconciliations per kind
    pub max_concurrent_reconciliations: u16,
    /// HTTP port for `/metrics`, `/healthz` and `/readyz`
    pub metrics_port: u16,
    /// Log format (json, text)
    pub log_format: LogFormat,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            short_requeue_secs: DEFAULT_SHORT_REQUEUE_SECS,
            error_backoff_min_secs: DEFAULT_ERROR_BACKOFF_MIN_SECS,
            error_backoff_max_secs: DEFAULT_ERROR_BACKOFF_MAX_SECS,
            backoff_start_ms: DEFAULT_BACKOFF_START_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
            watch_restart_delay_after_end_secs: DEFAULT_WATCH_RESTART_DELAY_AFTER_END_SECS,
            cloud_request_timeout_secs: DEFAULT_CLOUD_REQUEST_TIMEOUT_SECS,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            metrics_port: DEFAULT_METRICS_PORT,
            log_format: LogFormat::Text,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            poll_interval_secs: env_var_or_default("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS),
            short_requeue_secs: env_var_or_default("SHORT_REQUEUE_SECS", DEFAULT_SHORT_REQUEUE_SECS),
            error_backoff_min_secs: env_var_or_default(
                "ERROR_BACKOFF_MIN_SECS",
                DEFAULT_ERROR_BACKOFF_MIN_SECS,
            ),
            error_backoff_max_secs: env_var_or_default(
                "ERROR_BACKOFF_MAX_SECS",
                DEFAULT_ERROR_BACKOFF_MAX_SECS,
            ),
            backoff_start_ms: env_var_or_default("BACKOFF_START_MS", DEFAULT_BACKOFF_START_MS),
            backoff_max_ms: env_var_or_default("BACKOFF_MAX_MS", DEFAULT_BACKOFF_MAX_MS),
            watch_restart_delay_secs: env_var_or_default(
                "WATCH_RESTART_DELAY_SECS",
                DEFAULT_WATCH_RESTART_DELAY_SECS,
            ),
            watch_restart_delay_after_end_secs: env_var_or_default(
                "WATCH_RESTART_DELAY_AFTER_END_SECS",
                DEFAULT_WATCH_RESTART_DELAY_AFTER_END_SECS,
            ),
            cloud_request_timeout_secs: env_var_or_default(
                "CLOUD_REQUEST_TIMEOUT_SECS",
                DEFAULT_CLOUD_REQUEST_TIMEOUT_SECS,
            ),
            max_concurrent_reconciliations: env_var_or_default(
                "MAX_CONCURRENT_RECONCILIATIONS",
                DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            ),
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            log_format: LogFormat::parse(&env_var_or_default_str("LOG_FORMAT", "text")),
        }
    }

    /// Get poll interval duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Get the short requeue duration used while the cloud converges
    pub fn short_requeue(&self) -> Duration {
        Duration::from_secs(self.short_requeue_secs)
    }

    /// Get cloud request timeout duration
    pub fn cloud_request_timeout(&self) -> Duration {
        Duration::from_secs(self.cloud_request_timeout_secs)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
