//! # Managed Resource Reconciler
//!
//! Generic reconcile function shared by every managed resource kind.
//!
//! [`run_pass`] drives one Connect, Observe, Create / Update / Delete pass over
//! the [`ExternalConnector`] contract and knows nothing about Kubernetes.
//! [`reconcile`] wraps it with the Kubernetes side: finalizer, external-name
//! annotation, status, connection Secret and requeue.

use super::backoff::BackoffTable;
use super::conditions::{self, ReadyState};
use super::managed::{ConnectionDetails, ExternalConnector};
use super::ReconcileError;
use crate::config::ControllerConfig;
use crate::constants::{
    CONNECTION_SECRET_TYPE, EXTERNAL_NAME_ANNOTATION, FIELD_MANAGER, MANAGED_RESOURCE_FINALIZER,
};
use crate::crd::{DeletionPolicy, Managed, SecretReference};
use crate::observability;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::controller::Action;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// What one pass did to the cloud resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The resource exists; nothing was changed unless it was stale
    Observed { up_to_date: bool },
    Created,
    Updated,
    /// Delete was requested; the resource may still be going away
    Deleted,
    /// The object is being deleted and the cloud resource no longer exists
    Gone,
    /// The object is being deleted with `deletionPolicy: Orphan`
    Orphaned,
}

impl PassOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Observed { .. } => "observed",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Gone => "gone",
            Self::Orphaned => "orphaned",
        }
    }

    /// The finalizer can be released
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(self, Self::Gone | Self::Orphaned)
    }

    fn publishes_details(self) -> bool {
        matches!(self, Self::Observed { .. } | Self::Created | Self::Updated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    pub outcome: PassOutcome,
    pub connection_details: ConnectionDetails,
}

impl Pass {
    fn bare(outcome: PassOutcome) -> Self {
        Self {
            outcome,
            connection_details: ConnectionDetails::new(),
        }
    }
}

/// Run one reconciliation pass against the cloud
///
/// `mr` is updated in place (observation, conditions, external name); the
/// caller persists it.
///
/// # Errors
///
/// Any error of Connect or of the external client step that ran.
pub async fn run_pass<R: Managed>(
    connector: &dyn ExternalConnector<R>,
    mr: &mut R,
) -> Result<Pass, ReconcileError> {
    let deleting = mr.is_being_deleted();
    if deleting && mr.resource_spec().deletion_policy == DeletionPolicy::Orphan {
        return Ok(Pass::bare(PassOutcome::Orphaned));
    }

    let client = connector.connect(mr).await?;
    let observation = client.observe(mr).await?;

    if deleting {
        if !observation.resource_exists {
            return Ok(Pass::bare(PassOutcome::Gone));
        }
        conditions::set_condition(
            &mut mr.managed_status_mut().conditions,
            conditions::ready(ReadyState::Deleting),
        );
        client.delete(mr).await?;
        return Ok(Pass::bare(PassOutcome::Deleted));
    }

    if !observation.resource_exists {
        conditions::set_condition(
            &mut mr.managed_status_mut().conditions,
            conditions::ready(ReadyState::Creating),
        );
        let creation = client.create(mr).await?;
        return Ok(Pass {
            outcome: PassOutcome::Created,
            connection_details: creation.connection_details,
        });
    }

    let mut connection_details = observation.connection_details;
    if observation.resource_up_to_date {
        return Ok(Pass {
            outcome: PassOutcome::Observed { up_to_date: true },
            connection_details,
        });
    }

    let update = client.update(mr).await?;
    connection_details.extend(update.connection_details);
    Ok(Pass {
        outcome: PassOutcome::Updated,
        connection_details,
    })
}

/// Shared state of one kind's controller
pub struct Context<R: Managed> {
    pub client: Client,
    pub connector: Arc<dyn ExternalConnector<R>>,
    /// The cloud name is `metadata.name` unless annotated otherwise
    pub name_addressed: bool,
    pub config: ControllerConfig,
    /// Per-resource error backoff
    pub backoff: BackoffTable,
}

impl<R: Managed> std::fmt::Debug for Context<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("kind", &R::kind(&()))
            .field("name_addressed", &self.name_addressed)
            .finish_non_exhaustive()
    }
}

impl<R: Managed> Context<R> {
    pub fn new(
        client: Client,
        connector: Arc<dyn ExternalConnector<R>>,
        name_addressed: bool,
        config: ControllerConfig,
    ) -> Self {
        let backoff = BackoffTable::new(config.error_backoff_min_secs, config.error_backoff_max_secs);
        Self {
            client,
            connector,
            name_addressed,
            config,
            backoff,
        }
    }
}

/// Reconcile one managed resource
///
/// Errors are returned to the controller's error policy after a best-effort
/// `Synced=False` status patch.
///
/// # Errors
///
/// Any [`ReconcileError`] of the pass or of persisting its results.
pub async fn reconcile<R: Managed>(obj: Arc<R>, ctx: Arc<Context<R>>) -> Result<Action, ReconcileError> {
    let kind = R::kind(&());
    let name = obj.name_any();
    let span = tracing::info_span!("reconcile", resource.kind = %kind, resource.name = %name);
    let start = Instant::now();
    observability::increment_reconciliations(&kind);

    let result = reconcile_managed(obj.as_ref(), ctx.as_ref())
        .instrument(span.clone())
        .await;
    observability::observe_reconciliation_duration(&kind, start.elapsed().as_secs_f64());

    match result {
        Ok(action) => {
            ctx.backoff.forget(&name);
            Ok(action)
        }
        Err(e) => {
            let api: Api<R> = Api::all(ctx.client.clone());
            if let Err(patch_err) = patch_synced_error(&api, obj.as_ref(), &e).instrument(span).await {
                warn!(
                    resource.kind = %kind,
                    resource.name = %name,
                    error = %patch_err,
                    "Cannot record reconcile error in status"
                );
            }
            Err(e)
        }
    }
}

async fn reconcile_managed<R: Managed>(obj: &R, ctx: &Context<R>) -> Result<Action, ReconcileError> {
    let api: Api<R> = Api::all(ctx.client.clone());
    let name = obj.name_any();
    let mut mr = obj.clone();

    if !has_finalizer(&mr, MANAGED_RESOURCE_FINALIZER) {
        if mr.is_being_deleted() {
            return Ok(Action::await_change());
        }
        add_finalizer(&api, &mut mr, MANAGED_RESOURCE_FINALIZER).await?;
    }

    let annotated = mr.external_name().map(str::to_string);
    if ctx.name_addressed && annotated.is_none() {
        mr.set_external_name(&name);
    }

    let pass = run_pass(ctx.connector.as_ref(), &mut mr).await?;
    debug!(outcome = pass.outcome.as_str(), "Reconcile pass finished");

    if pass.outcome.is_final() {
        remove_finalizer(&api, &mr, MANAGED_RESOURCE_FINALIZER).await?;
        info!(outcome = pass.outcome.as_str(), "Released managed resource");
        return Ok(Action::await_change());
    }

    let external_name = mr.external_name().map(str::to_string);
    if external_name != annotated {
        if let Some(external_name) = external_name {
            patch_external_name(&api, &name, &external_name).await?;
        }
    }

    // The Secret goes first: a generated password is only in this pass, and
    // the status patch records that it was generated
    if pass.outcome.publishes_details() && !pass.connection_details.is_empty() {
        if let Some(secret_ref) = &mr.resource_spec().write_connection_secret_to_ref {
            publish_connection_details(&ctx.client, &mr, secret_ref, &pass.connection_details).await?;
        }
    }

    conditions::set_condition(
        &mut mr.managed_status_mut().conditions,
        conditions::reconcile_success(),
    );
    let patch = serde_json::json!({ "status": mr.managed_status() });
    api.patch_status(&name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
        .await?;

    let requeue_after = match pass.outcome {
        PassOutcome::Created | PassOutcome::Deleted => ctx.config.short_requeue(),
        _ => ctx.config.poll_interval(),
    };
    observability::increment_requeues(pass.outcome.as_str());
    Ok(Action::requeue(requeue_after))
}

pub(crate) fn has_finalizer<K: Resource>(obj: &K, finalizer: &str) -> bool {
    obj.finalizers().iter().any(|f| f == finalizer)
}

pub(crate) async fn add_finalizer<K>(api: &Api<K>, obj: &mut K, finalizer: &str) -> Result<(), ReconcileError>
where
    K: Resource + Clone + DeserializeOwned + std::fmt::Debug,
{
    let mut finalizers = obj.finalizers().to_vec();
    finalizers.push(finalizer.to_string());
    let patch = serde_json::json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&obj.name_any(), &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
        .await?;
    obj.meta_mut().finalizers = Some(finalizers);
    Ok(())
}

pub(crate) async fn remove_finalizer<K>(api: &Api<K>, obj: &K, finalizer: &str) -> Result<(), ReconcileError>
where
    K: Resource + Clone + DeserializeOwned + std::fmt::Debug,
{
    let finalizers: Vec<&String> = obj.finalizers().iter().filter(|f| *f != finalizer).collect();
    let patch = serde_json::json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&obj.name_any(), &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

async fn patch_external_name<R: Managed>(
    api: &Api<R>,
    name: &str,
    external_name: &str,
) -> Result<(), ReconcileError> {
    let annotations = BTreeMap::from([(EXTERNAL_NAME_ANNOTATION, external_name)]);
    let patch = serde_json::json!({ "metadata": { "annotations": annotations } });
    api.patch(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
        .await?;
    debug!(external_name, "Recorded external name");
    Ok(())
}

async fn patch_synced_error<R: Managed>(
    api: &Api<R>,
    obj: &R,
    error: &ReconcileError,
) -> Result<(), kube::Error> {
    let mut conditions = obj.conditions().to_vec();
    conditions::set_condition(&mut conditions, conditions::reconcile_error(error.to_string()));
    let patch = serde_json::json!({ "status": { "conditions": conditions } });
    api.patch_status(&obj.name_any(), &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

/// Merge connection details into the connection Secret, creating it when absent
///
/// Keys are only ever added or overwritten.
async fn publish_connection_details<R: Managed>(
    client: &Client,
    owner: &R,
    secret_ref: &SecretReference,
    details: &ConnectionDetails,
) -> Result<(), ReconcileError> {
    let api: Api<Secret> = Api::namespaced(client.clone(), &secret_ref.namespace);
    let data: BTreeMap<String, ByteString> = details
        .iter()
        .map(|(k, v)| (k.clone(), ByteString(v.clone())))
        .collect();

    if api.get_opt(&secret_ref.name).await?.is_some() {
        let patch = serde_json::json!({ "data": data });
        api.patch(&secret_ref.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await?;
    } else {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(secret_ref.name.clone()),
                namespace: Some(secret_ref.namespace.clone()),
                owner_references: owner.controller_owner_ref(&()).map(|o| vec![o]),
                ..ObjectMeta::default()
            },
            type_: Some(CONNECTION_SECRET_TYPE.to_string()),
            data: Some(data),
            ..Secret::default()
        };
        api.create(&PostParams::default(), &secret).await?;
    }
    debug!(
        secret.namespace = %secret_ref.namespace,
        secret.name = %secret_ref.name,
        keys = details.len(),
        "Published connection details"
    );
    Ok(())
}
