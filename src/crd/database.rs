//! # RDS Instance
//!
//! ApsaraDB RDS instance managed resource.

use super::{impl_managed, ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ApsaraDB RDS database instance
///
/// # Example
///
/// ```yaml
/// apiVersion: database.alibaba.crossplane.io/v1alpha1
/// kind: RDSInstance
/// metadata:
///   name: example-postgres
/// spec:
///   forProvider:
///     engine: PostgreSQL
///     engineVersion: "10.0"
///     dbInstanceClass: rds.pg.s1.small
///     dbInstanceStorageInGB: 20
///     securityIPList: 0.0.0.0/0
///     masterUsername: test
///   writeConnectionSecretToRef:
///     name: example-postgres-conn
///     namespace: default
/// ```
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "database.alibaba.crossplane.io",
    version = "v1alpha1",
    kind = "RDSInstance",
    category = "crossplane",
    category = "managed",
    category = "alibaba",
    status = "RDSInstanceStatus",
    printcolumn = r#"{"name":"STATUS", "type":"string", "jsonPath":".status.atProvider.dbInstanceStatus"}"#,
    printcolumn = r#"{"name":"ENGINE", "type":"string", "jsonPath":".spec.forProvider.engine"}"#,
    printcolumn = r#"{"name":"VERSION", "type":"string", "jsonPath":".spec.forProvider.engineVersion"}"#,
    printcolumn = r#"{"name":"AGE", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RDSInstanceSpec {
    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
    pub for_provider: RDSInstanceParameters,
}

/// Desired state of an RDS instance
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RDSInstanceParameters {
    /// Database engine, e.g. MySQL or PostgreSQL
    pub engine: String,
    pub engine_version: String,
    /// Instance type, e.g. `rds.mysql.t1.small`
    #[serde(default, rename = "dbInstanceClass")]
    pub db_instance_class: String,
    #[serde(default, rename = "dbInstanceStorageInGB")]
    pub db_instance_storage_in_gb: i32,
    /// Comma separated list of IPs or CIDR blocks allowed to connect
    #[serde(default, rename = "securityIPList")]
    pub security_ip_list: String,
    /// Name of the account bootstrapped once the instance is running
    pub master_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_instance_storage_type: Option<String>,
    /// Postpaid or Prepaid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    /// Classic or VPC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_network_type: Option<String>,
    #[serde(default, rename = "vpcID", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(default, rename = "vSwitchID", skip_serializing_if = "Option::is_none")]
    pub vswitch_id: Option<String>,
    /// Allocate an Internet endpoint once the instance is running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_connection: Option<PublicConnection>,
}

/// Internet-facing connection string requested for a database instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicConnection {
    /// Prefix of the public connection string, e.g. `mydb` for `mydb.mysql.rds.aliyuncs.com`
    pub connection_string_prefix: String,
    /// Port of the public connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

/// Observed state of an RDS instance
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RDSInstanceObservation {
    #[serde(default, rename = "dbInstanceStatus")]
    pub db_instance_status: String,
    #[serde(default, rename = "dbInstanceID")]
    pub db_instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    /// The master account has been created
    #[serde(default)]
    pub account_ready: bool,
    /// The requested public connection has been allocated
    #[serde(default)]
    pub connection_ready: bool,
}

pub type RDSInstanceStatus = ManagedStatus<RDSInstanceObservation>;

impl_managed!(RDSInstance, RDSInstanceObservation);
