//! # OSS Bucket
//!
//! Object Storage Service bucket managed resource. Buckets are addressed by
//! name, so the external name defaults to `metadata.name`.

use super::{impl_managed, ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "oss.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "Bucket",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "BucketStatus",
    printcolumn = r#"{"name":"LOCATION", "type":"string", "jsonPath":".status.atProvider.location"}"#,
    printcolumn = r#"{"name":"ACL", "type":"string", "jsonPath":".spec.forProvider.acl"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    #[serde(default)]
    pub for_provider: BucketParameters,
}

/// Desired state of a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BucketParameters {
    /// private, public-read or public-read-write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
    /// Standard, IA, Archive or ColdArchive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// LRS or ZRS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_redundancy_type: Option<String>,
}

/// Observed state of a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BucketObservation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub extranet_endpoint: String,
    #[serde(default)]
    pub intranet_endpoint: String,
    #[serde(default)]
    pub storage_class: String,
    #[serde(default)]
    pub acl: String,
}

pub type BucketStatus = ManagedStatus<BucketObservation>;

impl_managed!(Bucket, BucketObservation);
