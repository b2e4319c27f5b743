//! # Managed Resource Commons
//!
//! Spec and status fragments shared by every managed resource kind, and the
//! [`Managed`] trait the generic controller uses to reach them.

use crate::constants::{DEFAULT_PROVIDER_CONFIG_NAME, EXTERNAL_NAME_ANNOTATION};
use kube::Resource;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Fields every managed resource spec carries next to `forProvider`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    /// ProviderConfig whose credentials and region are used to reach the cloud
    #[serde(default)]
    pub provider_config_ref: ProviderConfigReference,
    /// Secret the connection details are written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,
    /// What happens to the cloud resource when this object is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// Reference to a cluster-scoped ProviderConfig
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ProviderConfigReference {
    pub name: String,
}

impl Default for ProviderConfigReference {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROVIDER_CONFIG_NAME.to_string(),
        }
    }
}

/// Namespaced reference to a Kubernetes Secret
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct SecretReference {
    pub name: String,
    pub namespace: String,
}

/// Deletion policy of a managed resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum DeletionPolicy {
    /// Delete the cloud resource together with the managed resource
    #[default]
    Delete,
    /// Leave the cloud resource in place
    Orphan,
}

/// Status of a managed resource: the last observation plus conditions
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedStatus<O: Default> {
    /// Last observed state of the cloud resource
    #[serde(default)]
    pub at_provider: O,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (Ready, Synced)
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

/// A Kubernetes object that represents one cloud resource
///
/// Implemented for every kind in [`crate::crd`] by [`impl_managed!`].
pub trait Managed:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Shape of `status.atProvider`
    type Observation: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    fn resource_spec(&self) -> &ResourceSpec;

    fn managed_status(&self) -> Option<&ManagedStatus<Self::Observation>>;

    fn managed_status_mut(&mut self) -> &mut ManagedStatus<Self::Observation>;

    /// Observation recorded by the last successful Observe, or the default
    fn at_provider(&self) -> Self::Observation {
        self.managed_status()
            .map(|s| s.at_provider.clone())
            .unwrap_or_default()
    }

    fn conditions(&self) -> &[Condition] {
        self.managed_status()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    /// The `crossplane.io/external-name` annotation, if set and non-empty
    fn external_name(&self) -> Option<&str> {
        self.meta()
            .annotations
            .as_ref()
            .and_then(|a| a.get(EXTERNAL_NAME_ANNOTATION))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn set_external_name(&mut self, name: &str) {
        self.meta_mut()
            .annotations
            .get_or_insert_with(Default::default)
            .insert(EXTERNAL_NAME_ANNOTATION.to_string(), name.to_string());
    }

    fn provider_config_name(&self) -> &str {
        &self.resource_spec().provider_config_ref.name
    }

    fn is_being_deleted(&self) -> bool {
        self.meta().deletion_timestamp.is_some()
    }
}

/// Implements [`Managed`] for a derived custom resource whose spec flattens
/// [`ResourceSpec`] into a `resource_spec` field.
macro_rules! impl_managed {
    ($kind:ty, $observation:ty) => {
        impl $crate::crd::Managed for $kind {
            type Observation = $observation;

            fn resource_spec(&self) -> &$crate::crd::ResourceSpec {
                &self.spec.resource_spec
            }

            fn managed_status(&self) -> Option<&$crate::crd::ManagedStatus<$observation>> {
                self.status.as_ref()
            }

            fn managed_status_mut(&mut self) -> &mut $crate::crd::ManagedStatus<$observation> {
                self.status.get_or_insert_with(Default::default)
            }
        }
    };
}

pub(crate) use impl_managed;
