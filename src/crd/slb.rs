//! # Classic Load Balancer
//!
//! Server Load Balancer (CLB) instance managed resource.

use super::{impl_managed, ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "slb.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "CLB",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "CLBStatus",
    printcolumn = r#"{"name":"ADDRESS", "type":"string", "jsonPath":".status.atProvider.address"}"#,
    printcolumn = r#"{"name":"STATUS", "type":"string", "jsonPath":".status.atProvider.loadBalancerStatus"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CLBSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    #[serde(default)]
    pub for_provider: CLBParameters,
}

/// Desired state of a CLB instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CLBParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_name: Option<String>,
    /// internet or intranet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    /// ipv4 or ipv6
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_ip_version: Option<String>,
    /// paybybandwidth or paybytraffic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internet_charge_type: Option<String>,
    /// Peak bandwidth in Mbit/s for pay-by-bandwidth instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<i32>,
    /// Instance specification, e.g. `slb.s1.small`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_spec: Option<String>,
    #[serde(default, rename = "vpcID", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(default, rename = "vSwitchID", skip_serializing_if = "Option::is_none")]
    pub vswitch_id: Option<String>,
    #[serde(default, rename = "masterZoneID", skip_serializing_if = "Option::is_none")]
    pub master_zone_id: Option<String>,
    #[serde(default, rename = "slaveZoneID", skip_serializing_if = "Option::is_none")]
    pub slave_zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<String>,
    /// Private IP to assign to an intranet instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, rename = "resourceGroupID", skip_serializing_if = "Option::is_none")]
    pub resource_group_id: Option<String>,
}

/// Observed state of a CLB instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CLBObservation {
    #[serde(default)]
    pub address: String,
    #[serde(default, rename = "loadBalancerID")]
    pub load_balancer_id: String,
    #[serde(default)]
    pub load_balancer_status: String,
    #[serde(default)]
    pub network_type: String,
    #[serde(default, rename = "vpcID")]
    pub vpc_id: String,
    #[serde(default, rename = "vSwitchID")]
    pub vswitch_id: String,
    #[serde(default)]
    pub create_time: String,
}

pub type CLBStatus = ManagedStatus<CLBObservation>;

impl_managed!(CLB, CLBObservation);
