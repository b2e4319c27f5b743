//! # ProviderConfig Usage
//!
//! Every Connect records that the managed resource uses its ProviderConfig.
//! The record is a `ProviderConfigUsage` named after the managed resource
//! UID, labelled with the ProviderConfig name and owned by the managed
//! resource, so Kubernetes garbage-collects it with the resource. The
//! ProviderConfig controller counts these records by label.

use super::ReconcileError;
use crate::constants::{FIELD_MANAGER, PROVIDER_CONFIG_LABEL};
use crate::crd::{
    Managed, ProviderConfigReference, ProviderConfigUsage, ProviderConfigUsageSpec, TypedReference,
};
use async_trait::async_trait;
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::debug;

/// Records ProviderConfig usage
#[async_trait]
pub trait UsageTracker: Send + Sync {
    async fn track(&self, usage: ProviderConfigUsage) -> Result<(), ReconcileError>;

    /// Number of usage records naming `provider_config`
    async fn users(&self, provider_config: &str) -> Result<usize, ReconcileError>;
}

/// Label selector matching the usage records of one ProviderConfig
#[must_use]
pub fn users_selector(provider_config: &str) -> String {
    format!("{PROVIDER_CONFIG_LABEL}={provider_config}")
}

/// Build the usage record for a managed resource
///
/// # Errors
///
/// [`ReconcileError::MissingMetadata`] when the resource has no UID yet.
pub fn usage_for<R: Managed>(mr: &R) -> Result<ProviderConfigUsage, ReconcileError> {
    let uid = mr
        .meta()
        .uid
        .clone()
        .ok_or(ReconcileError::MissingMetadata("uid"))?;
    let provider_config = mr.provider_config_name().to_string();

    let mut usage = ProviderConfigUsage::new(
        &uid,
        ProviderConfigUsageSpec {
            provider_config_ref: ProviderConfigReference {
                name: provider_config.clone(),
            },
            resource_ref: TypedReference {
                api_version: R::api_version(&()).into_owned(),
                kind: R::kind(&()).into_owned(),
                name: mr.name_any(),
                uid: Some(uid.clone()),
            },
        },
    );
    usage.metadata.labels = Some(BTreeMap::from([(
        PROVIDER_CONFIG_LABEL.to_string(),
        provider_config,
    )]));
    usage.metadata.owner_references = mr.owner_ref(&()).map(|owner| vec![owner]);
    Ok(usage)
}

/// [`UsageTracker`] that server-side applies the record
#[derive(Clone)]
pub struct KubeUsageTracker {
    client: Client,
}

impl std::fmt::Debug for KubeUsageTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeUsageTracker").finish_non_exhaustive()
    }
}

impl KubeUsageTracker {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UsageTracker for KubeUsageTracker {
    async fn track(&self, usage: ProviderConfigUsage) -> Result<(), ReconcileError> {
        let api: Api<ProviderConfigUsage> = Api::all(self.client.clone());
        let name = usage.name_any();
        api.patch(
            &name,
            &PatchParams::apply(FIELD_MANAGER).force(),
            &Patch::Apply(&usage),
        )
        .await
        .map_err(|e| ReconcileError::TrackUsage(e.to_string()))?;
        debug!(
            usage = %name,
            provider_config = %usage.spec.provider_config_ref.name,
            "Tracked ProviderConfig usage"
        );
        Ok(())
    }

    async fn users(&self, provider_config: &str) -> Result<usize, ReconcileError> {
        let api: Api<ProviderConfigUsage> = Api::all(self.client.clone());
        let usages = api
            .list_metadata(&ListParams::default().labels(&users_selector(provider_config)))
            .await?;
        Ok(usages.items.len())
    }
}
