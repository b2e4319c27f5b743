//! # Error Policy
//!
//! Error handling and backoff logic for the controller watch loops.
//! This module handles reconciliation errors and watch stream errors.

use crate::controller::backoff::BackoffTable;
use crate::controller::reconciler::Context;
use crate::controller::ReconcileError;
use crate::crd::Managed;
use crate::observability;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Instrument};

/// Fallback delay when the backoff table cannot be locked (seconds)
const DEFAULT_BACKOFF_SECS: u64 = 60;

/// Handle reconciliation errors with Fibonacci backoff
///
/// Backoff state is tracked per resource so one failing resource does not
/// slow down the others of its kind. It is dropped by the next successful pass.
pub fn handle_reconciliation_error<R: Managed>(obj: Arc<R>, error: &ReconcileError, ctx: Arc<Context<R>>) -> Action {
    backoff_action(&R::kind(&()), &obj.name_any(), error, &ctx.backoff)
}

/// Record a failed reconciliation of `name` and pick its retry delay
pub fn backoff_action(kind: &str, name: &str, error: &ReconcileError, backoff: &BackoffTable) -> Action {
    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.kind = %kind,
        resource.name = %name,
        reason = error.reason(),
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {} {}: {}", kind, name, error);
    observability::increment_reconciliation_errors(kind);

    let (backoff_seconds, error_count) = backoff.record_error(name).unwrap_or_else(|| {
        warn!("Backoff table lock poisoned, using default backoff");
        (DEFAULT_BACKOFF_SECS, 0)
    });

    let next_trigger_time =
        chrono::Utc::now() + chrono::Duration::seconds(i64::try_from(backoff_seconds).unwrap_or(i64::MAX));
    info!(
        "Retrying with Fibonacci backoff: {}s (error count: {}, next retry: {})",
        backoff_seconds,
        error_count,
        next_trigger_time.to_rfc3339()
    );

    observability::increment_requeues("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}

/// How the watch loop reacts to a watch stream error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorClass {
    /// 401: RBAC revoked or token expired
    Unauthorized,
    /// 410: resource version expired
    Expired,
    /// 429: API server storage reinitializing
    Throttled,
    /// 404: object deleted or CRD missing
    NotFound,
    Other,
}

impl WatchErrorClass {
    /// Classify a debug-formatted controller error
    ///
    /// 404 is checked before 401: a plain-text 404 body surfaces as a serde
    /// error whose chain also mentions `WatchFailed`.
    #[must_use]
    pub fn classify(error_string: &str) -> Self {
        let is_not_found = error_string.contains("ObjectNotFound")
            || error_string.contains("404")
            || error_string.contains("not found");
        let is_401 = (error_string.contains("401") || error_string.contains("Unauthorized")) && !is_not_found;
        let is_410 = error_string.contains("410")
            || error_string.contains("too old resource version")
            || error_string.contains("Expired")
            || error_string.contains("Gone");
        let is_429 = error_string.contains("429")
            || error_string.contains("storage is (re)initializing")
            || error_string.contains("TooManyRequests");

        if is_401 {
            Self::Unauthorized
        } else if is_410 {
            Self::Expired
        } else if is_429 {
            Self::Throttled
        } else if is_not_found {
            Self::NotFound
        } else {
            Self::Other
        }
    }
}

/// Handle watch stream errors with appropriate classification and backoff
///
/// Returns `None` to filter out the error (allow restart) or `Some(())` to continue.
pub async fn handle_watch_stream_error(
    kind: &str,
    error_string: &str,
    backoff: &Arc<AtomicU64>,
    max_backoff_ms: u64,
    watch_restart_delay_secs: u64,
) -> Option<()> {
    let error_span = tracing::span!(
        tracing::Level::WARN,
        "controller.watch.error",
        resource.kind = kind,
        error = %error_string
    );

    async move {
        match WatchErrorClass::classify(error_string) {
            WatchErrorClass::Unauthorized => {
                error!("Watch of {} failed with 401 Unauthorized; RBAC may have been revoked or the token expired", kind);
                error!("Verify the provider ClusterRole still grants list/watch on {} and restart the pod if RBAC changed", kind);
                warn!(
                    "Waiting {}s before retrying watch (RBAC may need time to propagate)...",
                    watch_restart_delay_secs
                );
                tokio::time::sleep(Duration::from_secs(watch_restart_delay_secs)).await;
                None
            }
            WatchErrorClass::Expired => {
                warn!(error_type = "410", "Watch resource version expired, watch will restart");
                None
            }
            WatchErrorClass::Throttled => {
                let current_backoff = backoff.load(Ordering::Relaxed);
                warn!(
                    "API server storage reinitializing (429), backing off for {}ms before restart...",
                    current_backoff
                );
                tokio::time::sleep(Duration::from_millis(current_backoff)).await;
                backoff.store(current_backoff.saturating_mul(2).min(max_backoff_ms), Ordering::Relaxed);
                None
            }
            WatchErrorClass::NotFound => {
                warn!(
                    "{} not found (404); the object was deleted or the CRD is missing. Error: {}",
                    kind, error_string
                );
                Some(())
            }
            WatchErrorClass::Other => {
                error!("Controller stream error: {}", error_string);
                tokio::time::sleep(Duration::from_secs(watch_restart_delay_secs)).await;
                None
            }
        }
    }
    .instrument(error_span)
    .await
}
