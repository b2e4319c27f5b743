//! # Watch Loop
//!
//! Runs a kube-runtime `Controller` and restarts it when the watch stream
//! ends or fails, until shutdown is requested. Every managed resource kind
//! gets one loop, and so does ProviderConfig.

use crate::config::ControllerConfig;
use crate::controller::reconciler::{reconcile, Context};
use crate::controller::server::ServerState;
use crate::crd::Managed;
use crate::runtime::error_policy::{handle_reconciliation_error, handle_watch_stream_error};
use futures::{Stream, StreamExt};
use kube::api::Api;
use kube_runtime::{controller, watcher, Controller};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};

/// Run the controller watch loop for kind `R`
///
/// # Errors
///
/// Never fails today; the `Result` leaves room for startup checks.
pub async fn run_watch_loop<R: Managed>(
    api: Api<R>,
    ctx: Arc<Context<R>>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let kind = R::kind(&()).into_owned();
    let config = ctx.config.clone();
    run_controller_loop(&kind, &config, server_state, || {
        let controller_config =
            controller::Config::default().concurrency(ctx.config.max_concurrent_reconciliations);
        Controller::new(api.clone(), watcher::Config::default().any_semantic())
            .with_config(controller_config)
            .shutdown_on_signal()
            .run(reconcile, handle_reconciliation_error, Arc::clone(&ctx))
    })
    .await
}

/// Drive the stream built by `start` until shutdown, rebuilding it whenever it ends
///
/// # Errors
///
/// Never fails today; the `Result` leaves room for startup checks.
pub async fn run_controller_loop<F, S, T, E>(
    kind: &str,
    config: &ControllerConfig,
    server_state: Arc<ServerState>,
    start: F,
) -> Result<(), anyhow::Error>
where
    F: Fn() -> S + Send,
    S: Stream<Item = Result<T, E>> + Send,
    T: Send,
    E: std::fmt::Debug + Send,
{
    let backoff_start_ms = config.backoff_start_ms;
    let backoff_max_ms = config.backoff_max_ms;
    let watch_restart_delay_secs = config.watch_restart_delay_secs;
    let backoff_duration_ms = Arc::new(AtomicU64::new(backoff_start_ms));

    loop {
        if !server_state.is_ready() {
            info!(resource.kind = %kind, "Shutdown requested, exiting watch loop");
            break;
        }

        let watch_span = tracing::span!(
            tracing::Level::INFO,
            "controller.watch",
            resource.kind = %kind,
            operation = "watch_loop"
        );
        info!(resource.kind = %kind, "Starting controller watch loop...");

        let backoff = Arc::clone(&backoff_duration_ms);
        start()
            .filter_map(move |x| {
                let backoff = Arc::clone(&backoff);
                async move {
                    match &x {
                        Ok(_) => {
                            backoff.store(backoff_start_ms, Ordering::Relaxed);
                            debug!("watch.event.success");
                            Some(x)
                        }
                        Err(e) => {
                            let error_string = format!("{e:?}");
                            handle_watch_stream_error(
                                kind,
                                &error_string,
                                &backoff,
                                backoff_max_ms,
                                watch_restart_delay_secs,
                            )
                            .await
                            .map(|()| x)
                        }
                    }
                }
            })
            .for_each(|_| futures::future::ready(()))
            .instrument(watch_span)
            .await;

        if !server_state.is_ready() {
            info!(resource.kind = %kind, "Shutdown requested, exiting watch loop");
            break;
        }

        let delay_secs = config.watch_restart_delay_after_end_secs;
        warn!(
            resource.kind = %kind,
            "Controller watch stream ended, restarting in {} seconds...",
            delay_secs
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
    }

    info!(resource.kind = %kind, "Controller stopped gracefully");
    Ok(())
}
