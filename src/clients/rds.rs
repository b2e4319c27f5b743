//! # RDS Client
//!
//! ApsaraDB RDS, API version 2014-08-15.

use super::rpc::{RpcClient, RpcParams};
use super::{ClientError, CloudError};
use crate::provider::Credentials;
use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::time::Duration;

pub const SERVICE: &str = "rds";
const API_VERSION: &str = "2014-08-15";

pub const ERR_INSTANCE_NOT_FOUND: &str = "InvalidDBInstanceId.NotFound";

/// An RDS instance as returned by `DescribeDBInstanceAttribute`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DBInstance {
    #[serde(rename = "DBInstanceId")]
    pub db_instance_id: String,
    #[serde(rename = "DBInstanceStatus", default)]
    pub db_instance_status: String,
    #[serde(default)]
    pub engine: String,
    #[serde(default)]
    pub engine_version: String,
    #[serde(rename = "DBInstanceClass", default)]
    pub db_instance_class: String,
    #[serde(rename = "DBInstanceStorage", default)]
    pub db_instance_storage: i32,
    #[serde(default)]
    pub connection_string: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub creation_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeResponse {
    items: DescribeItems,
}

#[derive(Debug, Deserialize)]
struct DescribeItems {
    #[serde(rename = "DBInstanceAttribute", default)]
    attributes: Vec<DBInstance>,
}

/// Parameters of `CreateDBInstance`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateDBInstanceRequest {
    pub engine: String,
    pub engine_version: String,
    pub db_instance_class: String,
    pub db_instance_storage: i32,
    pub security_ip_list: String,
    pub pay_type: String,
    pub db_instance_storage_type: Option<String>,
    pub zone_id: Option<String>,
    pub instance_network_type: Option<String>,
    pub vpc_id: Option<String>,
    pub vswitch_id: Option<String>,
    /// Idempotency token
    pub client_token: Option<String>,
}

/// Answer of `CreateDBInstance`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatedDBInstance {
    #[serde(rename = "DBInstanceId")]
    pub db_instance_id: String,
    #[serde(default)]
    pub connection_string: String,
    #[serde(default)]
    pub port: String,
}

/// RDS operations used by the RDSInstance lifecycle
#[async_trait]
pub trait RdsApi: Send + Sync {
    async fn describe_db_instance(&self, id: &str) -> Result<DBInstance, ClientError>;

    async fn create_db_instance(
        &self,
        request: &CreateDBInstanceRequest,
    ) -> Result<CreatedDBInstance, ClientError>;

    async fn delete_db_instance(&self, id: &str) -> Result<(), ClientError>;

    async fn create_account(&self, id: &str, username: &str, password: &str) -> Result<(), ClientError>;

    async fn allocate_public_connection(
        &self,
        id: &str,
        prefix: &str,
        port: Option<&str>,
    ) -> Result<(), ClientError>;

    async fn modify_db_instance_spec(
        &self,
        id: &str,
        class: Option<&str>,
        storage: Option<i32>,
    ) -> Result<(), ClientError>;
}

/// reqwest-backed [`RdsApi`]
#[derive(Debug)]
pub struct RdsClient {
    rpc: RpcClient,
}

impl RdsClient {
    /// # Errors
    ///
    /// See [`RpcClient::new`].
    pub fn new(
        endpoint: &str,
        region: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            rpc: RpcClient::new(SERVICE, API_VERSION, endpoint, region, credentials, timeout)?,
        })
    }
}

#[async_trait]
impl RdsApi for RdsClient {
    async fn describe_db_instance(&self, id: &str) -> Result<DBInstance, ClientError> {
        let resp: DescribeResponse = self
            .rpc
            .call(
                "DescribeDBInstanceAttribute",
                RpcParams::new().with("DBInstanceId", id),
            )
            .await?;
        resp.items
            .attributes
            .into_iter()
            .next()
            .ok_or_else(|| CloudError::not_found(ERR_INSTANCE_NOT_FOUND, id).into())
    }

    async fn create_db_instance(
        &self,
        request: &CreateDBInstanceRequest,
    ) -> Result<CreatedDBInstance, ClientError> {
        let params = RpcParams::new()
            .with("Engine", &request.engine)
            .with("EngineVersion", &request.engine_version)
            .with("DBInstanceClass", &request.db_instance_class)
            .with("DBInstanceStorage", request.db_instance_storage.to_string())
            .with("DBInstanceNetType", "Intranet")
            .with("SecurityIPList", &request.security_ip_list)
            .with("PayType", &request.pay_type)
            .with_opt("DBInstanceStorageType", request.db_instance_storage_type.as_ref())
            .with_opt("ZoneId", request.zone_id.as_ref())
            .with_opt("InstanceNetworkType", request.instance_network_type.as_ref())
            .with_opt("VPCId", request.vpc_id.as_ref())
            .with_opt("VSwitchId", request.vswitch_id.as_ref())
            .with_opt("ClientToken", request.client_token.as_ref());
        self.rpc.call("CreateDBInstance", params).await
    }

    async fn delete_db_instance(&self, id: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call("DeleteDBInstance", RpcParams::new().with("DBInstanceId", id))
            .await?;
        Ok(())
    }

    async fn create_account(&self, id: &str, username: &str, password: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "CreateAccount",
                RpcParams::new()
                    .with("DBInstanceId", id)
                    .with("AccountName", username)
                    .with("AccountPassword", password)
                    .with("AccountType", "Super"),
            )
            .await?;
        Ok(())
    }

    async fn allocate_public_connection(
        &self,
        id: &str,
        prefix: &str,
        port: Option<&str>,
    ) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "AllocateInstancePublicConnection",
                RpcParams::new()
                    .with("DBInstanceId", id)
                    .with("ConnectionStringPrefix", prefix)
                    .with_opt("Port", port),
            )
            .await?;
        Ok(())
    }

    async fn modify_db_instance_spec(
        &self,
        id: &str,
        class: Option<&str>,
        storage: Option<i32>,
    ) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "ModifyDBInstanceSpec",
                RpcParams::new()
                    .with("DBInstanceId", id)
                    .with("PayType", "Postpaid")
                    .with_opt("DBInstanceClass", class)
                    .with_opt("DBInstanceStorage", storage),
            )
            .await?;
        Ok(())
    }
}
