//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default interval between reconciliations of a healthy resource (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Requeue interval after Create/Delete while the cloud catches up (seconds)
pub const DEFAULT_SHORT_REQUEUE_SECS: u64 = 10;

/// Default Fibonacci backoff floor for failed reconciliations (seconds)
pub const DEFAULT_ERROR_BACKOFF_MIN_SECS: u64 = 5;

/// Default Fibonacci backoff ceiling for failed reconciliations (seconds)
pub const DEFAULT_ERROR_BACKOFF_MAX_SECS: u64 = 300;

/// Default exponential backoff starting value for watch stream errors (milliseconds)
pub const DEFAULT_BACKOFF_START_MS: u64 = 1000;

/// Default exponential backoff maximum value for watch stream errors (milliseconds)
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 30_000;

/// Default delay before restarting watch stream after unknown errors (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Default delay before restarting watch stream after it ends (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_AFTER_END_SECS: u64 = 1;

/// Timeout applied to every cloud API request (seconds)
pub const DEFAULT_CLOUD_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default maximum concurrent reconciliations per kind
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;

/// Annotation carrying the cloud-assigned identifier of a managed resource
pub const EXTERNAL_NAME_ANNOTATION: &str = "crossplane.io/external-name";

/// Finalizer placed on every managed resource until its cloud resource is gone
pub const MANAGED_RESOURCE_FINALIZER: &str = "finalizer.managedresource.crossplane.io";

/// Finalizer holding a ProviderConfig while managed resources use it
pub const PROVIDER_CONFIG_IN_USE_FINALIZER: &str = "in-use.crossplane.io";

/// Field manager used for server-side patches
pub const FIELD_MANAGER: &str = "alibaba-provider";

/// Label on ProviderConfigUsage objects naming the ProviderConfig in use
pub const PROVIDER_CONFIG_LABEL: &str = "alibaba.crossplane.io/provider-config";

/// ProviderConfig used when a managed resource does not name one
pub const DEFAULT_PROVIDER_CONFIG_NAME: &str = "default";

/// Connection detail keys shared by the database kinds
pub const CONNECTION_USERNAME_KEY: &str = "username";
pub const CONNECTION_PASSWORD_KEY: &str = "password";
pub const CONNECTION_ENDPOINT_KEY: &str = "endpoint";
pub const CONNECTION_PORT_KEY: &str = "port";

/// Type of the connection Secrets written for managed resources
pub const CONNECTION_SECRET_TYPE: &str = "connection.crossplane.io/v1alpha1";
