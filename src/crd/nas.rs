//! # NAS
//!
//! Network Attached Storage file systems and their mount targets.

use super::{impl_managed, ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A NAS file system
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "nas.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "NASFileSystem",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "NASFileSystemStatus",
    printcolumn = r#"{"name":"ID", "type":"string", "jsonPath":".status.atProvider.fileSystemID"}"#,
    printcolumn = r#"{"name":"STATUS", "type":"string", "jsonPath":".status.atProvider.status"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NASFileSystemSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    pub for_provider: NASFileSystemParameters,
}

/// Desired state of a NAS file system. None of these fields can change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NASFileSystemParameters {
    /// standard or extreme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system_type: Option<String>,
    /// Performance or Capacity
    pub storage_type: String,
    /// NFS or SMB
    pub protocol_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_type: Option<String>,
    #[serde(default, rename = "zoneID", skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, rename = "vpcID", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(default, rename = "vSwitchID", skip_serializing_if = "Option::is_none")]
    pub vswitch_id: Option<String>,
    /// Capacity in GiB, required for extreme file systems
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypt_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Observed state of a NAS file system
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NASFileSystemObservation {
    #[serde(default, rename = "fileSystemID")]
    pub file_system_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub file_system_type: String,
    #[serde(default)]
    pub storage_type: String,
    #[serde(default)]
    pub protocol_type: String,
    #[serde(default)]
    pub create_time: String,
}

pub type NASFileSystemStatus = ManagedStatus<NASFileSystemObservation>;

impl_managed!(NASFileSystem, NASFileSystemObservation);

/// A mount target of a NAS file system
///
/// Its external name is `<fileSystemID>-<mountTargetDomain>`.
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "nas.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "NASMountTarget",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "NASMountTargetStatus",
    printcolumn = r#"{"name":"DOMAIN", "type":"string", "jsonPath":".status.atProvider.mountTargetDomain"}"#,
    printcolumn = r#"{"name":"STATUS", "type":"string", "jsonPath":".status.atProvider.status"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct NASMountTargetSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    pub for_provider: NASMountTargetParameters,
}

/// Desired state of a mount target
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NASMountTargetParameters {
    #[serde(rename = "fileSystemID")]
    pub file_system_id: String,
    /// Permission group, `DEFAULT_VPC_GROUP_NAME` for VPC mount targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_group_name: Option<String>,
    /// Vpc or Classic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(default, rename = "vpcID", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(default, rename = "vSwitchID", skip_serializing_if = "Option::is_none")]
    pub vswitch_id: Option<String>,
    #[serde(default, rename = "securityGroupID", skip_serializing_if = "Option::is_none")]
    pub security_group_id: Option<String>,
}

/// Observed state of a mount target
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NASMountTargetObservation {
    #[serde(default)]
    pub mount_target_domain: String,
    #[serde(default, rename = "fileSystemID")]
    pub file_system_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub network_type: String,
    #[serde(default)]
    pub access_group_name: String,
    #[serde(default, rename = "vpcID")]
    pub vpc_id: String,
    #[serde(default, rename = "vSwitchID")]
    pub vswitch_id: String,
}

pub type NASMountTargetStatus = ManagedStatus<NASMountTargetObservation>;

impl_managed!(NASMountTarget, NASMountTargetObservation);
