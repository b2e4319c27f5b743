//! # Redis Instance
//!
//! ApsaraDB for Redis (KVStore) instance managed resource.

use super::{impl_managed, ManagedStatus, PublicConnection, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ApsaraDB for Redis instance
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "redis.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "RedisInstance",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "RedisInstanceStatus",
    printcolumn = r#"{"name":"STATUS", "type":"string", "jsonPath":".status.atProvider.instanceStatus"}"#,
    printcolumn = r#"{"name":"VERSION", "type":"string", "jsonPath":".spec.forProvider.engineVersion"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RedisInstanceSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    pub for_provider: RedisInstanceParameters,
}

/// Desired state of a Redis instance
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedisInstanceParameters {
    /// Redis or Memcache
    #[serde(default = "default_instance_type")]
    pub instance_type: String,
    pub engine_version: String,
    /// Instance type, e.g. `redis.master.small.default`
    pub instance_class: String,
    #[serde(default, rename = "securityIPList")]
    pub security_ip_list: String,
    /// Name of the account bootstrapped once the instance is running
    pub master_username: String,
    /// PostPaid or PrePaid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(default, rename = "vpcID", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(default, rename = "vSwitchID", skip_serializing_if = "Option::is_none")]
    pub vswitch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_connection: Option<PublicConnection>,
}

fn default_instance_type() -> String {
    "Redis".to_string()
}

/// Observed state of a Redis instance
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedisInstanceObservation {
    #[serde(default)]
    pub instance_status: String,
    #[serde(default, rename = "instanceID")]
    pub instance_id: String,
    #[serde(default)]
    pub account_ready: bool,
    #[serde(default)]
    pub connection_ready: bool,
}

pub type RedisInstanceStatus = ManagedStatus<RedisInstanceObservation>;

impl_managed!(RedisInstance, RedisInstanceObservation);
