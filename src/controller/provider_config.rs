//! # ProviderConfig Controller
//!
//! Keeps a ProviderConfig alive while managed resources still use it. Each
//! pass counts the `ProviderConfigUsage` records labelled with the config
//! name, writes the count to `status.users` and holds the in-use finalizer
//! until the count drops to zero. Usage changes requeue the config they name,
//! so deletion proceeds as soon as the last user is gone.

use super::backoff::BackoffTable;
use super::reconciler::{add_finalizer, has_finalizer, remove_finalizer};
use super::registry::ControllerDeps;
use super::usage::UsageTracker;
use super::ReconcileError;
use crate::config::ControllerConfig;
use crate::constants::{FIELD_MANAGER, PROVIDER_CONFIG_IN_USE_FINALIZER};
use crate::crd::{ProviderConfig, ProviderConfigUsage};
use crate::observability;
use crate::runtime::error_policy::backoff_action;
use crate::runtime::watch_loop::run_controller_loop;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::controller::Action;
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Instrument};

const KIND: &str = "ProviderConfig";

/// What a pass does to one ProviderConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStep {
    /// Live config: record users, adding the finalizer first when missing
    Track { add_finalizer: bool },
    /// Deletion requested while users remain
    Block,
    /// Deletion requested and nothing uses the config any more
    Release,
    /// Deletion requested and the finalizer is already gone
    Ignore,
}

/// Decide the step for a config from its deletion state, finalizer and user count
#[must_use]
pub fn next_step(deleting: bool, holds_finalizer: bool, users: usize) -> ConfigStep {
    match (deleting, holds_finalizer) {
        (false, holds) => ConfigStep::Track { add_finalizer: !holds },
        (true, false) => ConfigStep::Ignore,
        (true, true) if users > 0 => ConfigStep::Block,
        (true, true) => ConfigStep::Release,
    }
}

/// The config a usage record points at
#[must_use]
pub fn config_of_usage(usage: ProviderConfigUsage) -> Option<ObjectRef<ProviderConfig>> {
    let name = usage.spec.provider_config_ref.name;
    (!name.is_empty()).then(|| ObjectRef::new(&name))
}

/// `status.users` differs from the counted users
#[must_use]
pub fn users_outdated(pc: &ProviderConfig, users: i64) -> bool {
    pc.status.as_ref().is_none_or(|s| s.users != users)
}

/// Shared state of the ProviderConfig controller
pub struct ConfigContext {
    pub client: Client,
    pub usage: Arc<dyn UsageTracker>,
    pub config: ControllerConfig,
    pub backoff: BackoffTable,
}

impl std::fmt::Debug for ConfigContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigContext").finish_non_exhaustive()
    }
}

impl ConfigContext {
    pub fn new(client: Client, usage: Arc<dyn UsageTracker>, config: ControllerConfig) -> Self {
        let backoff = BackoffTable::new(config.error_backoff_min_secs, config.error_backoff_max_secs);
        Self {
            client,
            usage,
            config,
            backoff,
        }
    }
}

/// Reconcile one ProviderConfig
///
/// # Errors
///
/// Listing usages or patching the config failed.
pub async fn reconcile_provider_config(
    pc: Arc<ProviderConfig>,
    ctx: Arc<ConfigContext>,
) -> Result<Action, ReconcileError> {
    let name = pc.name_any();
    let span = tracing::info_span!("reconcile", resource.kind = KIND, resource.name = %name);
    let start = Instant::now();
    observability::increment_reconciliations(KIND);

    let result = reconcile_config(pc.as_ref(), ctx.as_ref()).instrument(span).await;
    observability::observe_reconciliation_duration(KIND, start.elapsed().as_secs_f64());
    if result.is_ok() {
        ctx.backoff.forget(&name);
    }
    result
}

async fn reconcile_config(pc: &ProviderConfig, ctx: &ConfigContext) -> Result<Action, ReconcileError> {
    let api: Api<ProviderConfig> = Api::all(ctx.client.clone());
    let name = pc.name_any();
    let users = ctx.usage.users(&name).await?;
    let deleting = pc.meta().deletion_timestamp.is_some();

    match next_step(deleting, has_finalizer(pc, PROVIDER_CONFIG_IN_USE_FINALIZER), users) {
        ConfigStep::Track { add_finalizer: add } => {
            let mut pc = pc.clone();
            if add {
                add_finalizer(&api, &mut pc, PROVIDER_CONFIG_IN_USE_FINALIZER).await?;
            }
            record_users(&api, &pc, users).await?;
            Ok(Action::requeue(ctx.config.poll_interval()))
        }
        ConfigStep::Block => {
            record_users(&api, pc, users).await?;
            info!(users, "ProviderConfig is still in use, deletion blocked");
            observability::increment_requeues("in-use");
            Ok(Action::requeue(ctx.config.short_requeue()))
        }
        ConfigStep::Release => {
            remove_finalizer(&api, pc, PROVIDER_CONFIG_IN_USE_FINALIZER).await?;
            info!("ProviderConfig no longer in use, released");
            Ok(Action::await_change())
        }
        ConfigStep::Ignore => Ok(Action::await_change()),
    }
}

async fn record_users(api: &Api<ProviderConfig>, pc: &ProviderConfig, users: usize) -> Result<(), ReconcileError> {
    let users = i64::try_from(users).unwrap_or(i64::MAX);
    if !users_outdated(pc, users) {
        return Ok(());
    }
    let patch = serde_json::json!({ "status": { "users": users } });
    api.patch_status(&pc.name_any(), &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

/// Error policy of the ProviderConfig controller
pub fn handle_provider_config_error(pc: Arc<ProviderConfig>, error: &ReconcileError, ctx: Arc<ConfigContext>) -> Action {
    backoff_action(KIND, &pc.name_any(), error, &ctx.backoff)
}

/// Run the ProviderConfig controller until shutdown
///
/// # Errors
///
/// Never fails today; see [`run_controller_loop`].
pub async fn run_provider_config_controller(deps: ControllerDeps) -> anyhow::Result<()> {
    let ctx = Arc::new(ConfigContext::new(deps.client.clone(), deps.usage, deps.config.clone()));
    let configs: Api<ProviderConfig> = Api::all(deps.client.clone());
    let usages: Api<ProviderConfigUsage> = Api::all(deps.client);
    let kind = ProviderConfig::kind(&()).into_owned();

    run_controller_loop(&kind, &deps.config, deps.server_state, || {
        Controller::new(configs.clone(), watcher::Config::default().any_semantic())
            .watches(usages.clone(), watcher::Config::default().any_semantic(), config_of_usage)
            .shutdown_on_signal()
            .run(reconcile_provider_config, handle_provider_config_error, Arc::clone(&ctx))
    })
    .await
}
