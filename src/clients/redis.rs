//! # KVStore (Redis) Client
//!
//! ApsaraDB for Redis, API version 2015-01-01.

use super::rpc::{RpcClient, RpcParams};
use super::{ClientError, CloudError};
use crate::provider::Credentials;
use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::time::Duration;

pub const SERVICE: &str = "r-kvstore";
const API_VERSION: &str = "2015-01-01";

pub const ERR_INSTANCE_NOT_FOUND: &str = "InvalidInstanceId.NotFound";

/// A Redis instance as returned by `DescribeInstanceAttribute`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RedisInstance {
    pub instance_id: String,
    #[serde(default)]
    pub instance_status: String,
    #[serde(default)]
    pub instance_class: String,
    #[serde(default)]
    pub engine_version: String,
    #[serde(default)]
    pub connection_domain: String,
    #[serde(default)]
    pub port: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeResponse {
    instances: DescribeInstances,
}

#[derive(Debug, Deserialize)]
struct DescribeInstances {
    #[serde(rename = "DBInstanceAttribute", default)]
    attributes: Vec<RedisInstance>,
}

/// Parameters of `CreateInstance`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateInstanceRequest {
    pub instance_name: String,
    pub instance_type: String,
    pub engine_version: String,
    pub instance_class: String,
    pub charge_type: Option<String>,
    pub zone_id: Option<String>,
    pub network_type: Option<String>,
    pub vpc_id: Option<String>,
    pub vswitch_id: Option<String>,
    pub port: Option<i32>,
    pub token: Option<String>,
}

/// Answer of `CreateInstance`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatedInstance {
    pub instance_id: String,
    #[serde(default)]
    pub connection_domain: String,
    #[serde(default)]
    pub port: i64,
}

/// KVStore operations used by the RedisInstance lifecycle
#[async_trait]
pub trait RedisApi: Send + Sync {
    async fn describe_instance(&self, id: &str) -> Result<RedisInstance, ClientError>;

    async fn create_instance(&self, request: &CreateInstanceRequest) -> Result<CreatedInstance, ClientError>;

    async fn delete_instance(&self, id: &str) -> Result<(), ClientError>;

    async fn create_account(&self, id: &str, username: &str, password: &str) -> Result<(), ClientError>;

    async fn modify_security_ips(&self, id: &str, security_ips: &str) -> Result<(), ClientError>;

    async fn allocate_public_connection(
        &self,
        id: &str,
        prefix: &str,
        port: Option<&str>,
    ) -> Result<(), ClientError>;

    async fn modify_instance_spec(&self, id: &str, instance_class: &str) -> Result<(), ClientError>;
}

/// reqwest-backed [`RedisApi`]
#[derive(Debug)]
pub struct RedisClient {
    rpc: RpcClient,
}

impl RedisClient {
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
impl RedisApi for RedisClient {
    async fn describe_instance(&self, id: &str) -> Result<RedisInstance, ClientError> {
        let resp: DescribeResponse = self
            .rpc
            .call(
                "DescribeInstanceAttribute",
                RpcParams::new().with("InstanceId", id),
            )
            .await?;
        resp.instances
            .attributes
            .into_iter()
            .next()
            .ok_or_else(|| CloudError::not_found(ERR_INSTANCE_NOT_FOUND, id).into())
    }

    async fn create_instance(&self, request: &CreateInstanceRequest) -> Result<CreatedInstance, ClientError> {
        let params = RpcParams::new()
            .with("InstanceName", &request.instance_name)
            .with("InstanceType", &request.instance_type)
            .with("EngineVersion", &request.engine_version)
            .with("InstanceClass", &request.instance_class)
            .with_opt("ChargeType", request.charge_type.as_ref())
            .with_opt("ZoneId", request.zone_id.as_ref())
            .with_opt("NetworkType", request.network_type.as_ref())
            .with_opt("VpcId", request.vpc_id.as_ref())
            .with_opt("VSwitchId", request.vswitch_id.as_ref())
            .with_opt("Port", request.port)
            .with_opt("Token", request.token.as_ref());
        self.rpc.call("CreateInstance", params).await
    }

    async fn delete_instance(&self, id: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call("DeleteInstance", RpcParams::new().with("InstanceId", id))
            .await?;
        Ok(())
    }

    async fn create_account(&self, id: &str, username: &str, password: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "CreateAccount",
                RpcParams::new()
                    .with("InstanceId", id)
                    .with("AccountName", username)
                    .with("AccountPassword", password)
                    .with("AccountPrivilege", "RoleReadWrite"),
            )
            .await?;
        Ok(())
    }

    async fn modify_security_ips(&self, id: &str, security_ips: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "ModifySecurityIps",
                RpcParams::new()
                    .with("InstanceId", id)
                    .with("SecurityIps", security_ips),
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
                    .with("InstanceId", id)
                    .with("ConnectionStringPrefix", prefix)
                    .with_opt("Port", port),
            )
            .await?;
        Ok(())
    }

    async fn modify_instance_spec(&self, id: &str, instance_class: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "ModifyInstanceSpec",
                RpcParams::new()
                    .with("InstanceId", id)
                    .with("InstanceClass", instance_class),
            )
            .await?;
        Ok(())
    }
}
