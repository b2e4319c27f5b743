//! # Kind Registry
//!
//! The table of managed resource kinds this provider serves. The controller
//! binary starts one watch loop per selected entry; `crdgen` prints the CRD
//! of every entry.

use super::connector::Connector;
use super::engine::{ClientSettings, Lifecycle};
use super::kinds::{
    BucketLifecycle, ClbLifecycle, FileSystemLifecycle, LogtailLifecycle, MachineGroupLifecycle,
    MountTargetLifecycle, ProjectLifecycle, RdsLifecycle, RedisLifecycle, StoreIndexLifecycle, StoreLifecycle,
};
use super::reconciler::Context;
use super::server::ServerState;
use super::usage::UsageTracker;
use crate::config::ControllerConfig;
use crate::provider::{ConfigStore, CredentialResolver};
use crate::runtime::watch_loop::run_watch_loop;
use futures::future::BoxFuture;
use futures::FutureExt;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::CustomResourceExt;
use kube::{Api, Client};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown managed resource kind {0}")]
    UnknownKind(String),
}

/// Everything a kind's controller needs from the process
#[derive(Clone)]
pub struct ControllerDeps {
    pub client: Client,
    pub config: ControllerConfig,
    pub usage: Arc<dyn UsageTracker>,
    pub store: Arc<dyn ConfigStore>,
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for ControllerDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerDeps")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// One managed resource kind
#[derive(Clone, Copy)]
pub struct KindRegistration {
    pub kind: &'static str,
    pub group: &'static str,
    pub crd: fn() -> CustomResourceDefinition,
    pub run: fn(ControllerDeps) -> BoxFuture<'static, anyhow::Result<()>>,
}

impl std::fmt::Debug for KindRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindRegistration")
            .field("kind", &self.kind)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

fn run_kind<L>(deps: ControllerDeps) -> BoxFuture<'static, anyhow::Result<()>>
where
    L: Lifecycle,
{
    async move {
        let settings = ClientSettings {
            timeout: deps.config.cloud_request_timeout(),
        };
        let connector = Connector::<L>::new(CredentialResolver::new(deps.store), deps.usage, settings);
        let ctx = Arc::new(Context::new(
            deps.client.clone(),
            Arc::new(connector),
            L::NAME_ADDRESSED,
            deps.config,
        ));
        let api: Api<L::Resource> = Api::all(deps.client);
        run_watch_loop(api, ctx, deps.server_state).await
    }
    .boxed()
}

/// Registration for the kind reconciled by `L`
#[must_use]
pub fn registration<L>() -> KindRegistration
where
    L: Lifecycle,
    L::Resource: CustomResourceExt,
{
    KindRegistration {
        kind: L::KIND,
        group: <L::Resource as CustomResourceExt>::crd_name().split_once('.').map_or("", |(_, g)| g),
        crd: <L::Resource as CustomResourceExt>::crd,
        run: run_kind::<L>,
    }
}

/// All kinds, in a fixed order
#[derive(Debug, Clone)]
pub struct KindRegistry {
    kinds: Vec<KindRegistration>,
}

impl KindRegistry {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            kinds: vec![
                registration::<RdsLifecycle>(),
                registration::<RedisLifecycle>(),
                registration::<BucketLifecycle>(),
                registration::<ClbLifecycle>(),
                registration::<FileSystemLifecycle>(),
                registration::<MountTargetLifecycle>(),
                registration::<ProjectLifecycle>(),
                registration::<StoreLifecycle>(),
                registration::<StoreIndexLifecycle>(),
                registration::<MachineGroupLifecycle>(),
                registration::<LogtailLifecycle>(),
            ],
        }
    }

    /// Look a kind up by name, ignoring case
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownKind`] when no kind has that name.
    pub fn get(&self, name: &str) -> Result<&KindRegistration, RegistryError> {
        self.kinds
            .iter()
            .find(|k| k.kind.eq_ignore_ascii_case(name))
            .ok_or_else(|| RegistryError::UnknownKind(name.to_string()))
    }

    /// The named kinds, or every kind when `names` is empty
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownKind`] for the first unknown name.
    pub fn select(&self, names: &[String]) -> Result<Vec<&KindRegistration>, RegistryError> {
        if names.is_empty() {
            return Ok(self.kinds.iter().collect());
        }
        names.iter().map(|n| self.get(n.trim())).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KindRegistration> {
        self.kinds.iter()
    }
}
