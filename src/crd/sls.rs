//! # Log Service
//!
//! SLS projects, log stores, store indexes, machine groups and logtail
//! configs. All of them are addressed by name: the external name defaults to
//! `metadata.name`.

use super::{impl_managed, ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An SLS project
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "sls.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "Project",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "ProjectStatus",
    printcolumn = r#"{"name":"STATUS", "type":"string", "jsonPath":".status.atProvider.status"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    #[serde(default)]
    pub for_provider: ProjectParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParameters {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectObservation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub create_time: String,
    #[serde(default)]
    pub last_modify_time: String,
}

pub type ProjectStatus = ManagedStatus<ProjectObservation>;

impl_managed!(Project, ProjectObservation);

/// An SLS log store inside a project
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "sls.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "Store",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "StoreStatus",
    printcolumn = r#"{"name":"PROJECT", "type":"string", "jsonPath":".spec.forProvider.projectName"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct StoreSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    pub for_provider: StoreParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreParameters {
    pub project_name: String,
    /// Data retention in days
    pub ttl: i32,
    pub shard_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_split: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_split_shard: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_tracking: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreObservation {
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub last_modify_time: i64,
}

pub type StoreStatus = ManagedStatus<StoreObservation>;

impl_managed!(Store, StoreObservation);

/// The index configuration of a log store
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "sls.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "StoreIndex",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "StoreIndexStatus",
    printcolumn = r#"{"name":"PROJECT", "type":"string", "jsonPath":".spec.forProvider.projectName"}"#,
    printcolumn = r#"{"name":"STORE", "type":"string", "jsonPath":".spec.forProvider.logstoreName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct StoreIndexSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    pub for_provider: StoreIndexParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreIndexParameters {
    pub project_name: String,
    pub logstore_name: String,
    /// Full text index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<IndexLine>,
    /// Field indexes keyed by field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<BTreeMap<String, IndexKey>>,
}

/// Full text index settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexLine {
    pub token: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub chn: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_keys: Vec<String>,
}

/// Field index settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexKey {
    /// text, long, double or json
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub chn: bool,
    #[serde(default)]
    pub doc_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreIndexObservation {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub logstore_name: String,
}

pub type StoreIndexStatus = ManagedStatus<StoreIndexObservation>;

impl_managed!(StoreIndex, StoreIndexObservation);

/// A machine group collecting logs for a project
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "sls.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "MachineGroup",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "MachineGroupStatus",
    printcolumn = r#"{"name":"PROJECT", "type":"string", "jsonPath":".spec.forProvider.project"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MachineGroupSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    pub for_provider: MachineGroupParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineGroupParameters {
    pub project: String,
    /// ip or userdefined
    #[serde(rename = "machineIDType")]
    pub machine_id_type: String,
    #[serde(default, rename = "machineIDList")]
    pub machine_id_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<MachineGroupAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineGroupAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineGroupObservation {
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub last_modify_time: i64,
}

pub type MachineGroupStatus = ManagedStatus<MachineGroupObservation>;

impl_managed!(MachineGroup, MachineGroupObservation);

/// A logtail collection config
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "sls.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "Logtail",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "LogtailStatus",
    printcolumn = r#"{"name":"PROJECT", "type":"string", "jsonPath":".spec.forProvider.projectName"}"#,
    printcolumn = r#"{"name":"INPUT", "type":"string", "jsonPath":".spec.forProvider.inputType"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LogtailSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    pub for_provider: LogtailParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogtailParameters {
    pub project_name: String,
    /// file or plugin
    pub input_type: String,
    pub input_detail: LogtailInputDetail,
    pub output_detail: LogtailOutputDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_sample: Option<String>,
}

/// Where and how logtail reads logs
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogtailInputDetail {
    /// common_reg_log, json_log, delimiter_log, apsara_log
    pub log_type: String,
    #[serde(default)]
    pub log_path: String,
    #[serde(default)]
    pub file_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_storage: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_unmatch: Option<bool>,
}

/// Where logtail ships logs
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogtailOutputDetail {
    pub logstore_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogtailObservation {
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub last_modify_time: i64,
}

pub type LogtailStatus = ManagedStatus<LogtailObservation>;

impl_managed!(Logtail, LogtailObservation);
