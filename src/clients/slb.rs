//! # SLB Client
//!
//! Classic load balancers, API version 2014-05-15. The endpoint is global;
//! the region travels as `RegionId`.

use super::rpc::{RpcClient, RpcParams};
use super::ClientError;
use crate::provider::Credentials;
use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::time::Duration;

pub const SERVICE: &str = "slb";
const API_VERSION: &str = "2014-05-15";

pub const ERR_LOAD_BALANCER_NOT_FOUND: &str = "InvalidLoadBalancerId.NotFound";

/// A load balancer as returned by `DescribeLoadBalancerAttribute`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancer {
    pub load_balancer_id: String,
    #[serde(default)]
    pub load_balancer_name: String,
    #[serde(default)]
    pub load_balancer_status: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub address_type: String,
    #[serde(rename = "AddressIPVersion", default)]
    pub address_ip_version: String,
    #[serde(default)]
    pub network_type: String,
    #[serde(default)]
    pub vpc_id: String,
    #[serde(rename = "VSwitchId", default)]
    pub vswitch_id: String,
    #[serde(default)]
    pub bandwidth: i32,
    #[serde(default)]
    pub load_balancer_spec: String,
    #[serde(default)]
    pub internet_charge_type: String,
    #[serde(default)]
    pub create_time: String,
}

/// Parameters of `CreateLoadBalancer`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateLoadBalancerRequest {
    pub load_balancer_name: Option<String>,
    pub address_type: Option<String>,
    pub address_ip_version: Option<String>,
    pub internet_charge_type: Option<String>,
    pub bandwidth: Option<i32>,
    pub load_balancer_spec: Option<String>,
    pub vpc_id: Option<String>,
    pub vswitch_id: Option<String>,
    pub master_zone_id: Option<String>,
    pub slave_zone_id: Option<String>,
    pub pay_type: Option<String>,
    pub address: Option<String>,
    pub resource_group_id: Option<String>,
    pub client_token: Option<String>,
}

/// Answer of `CreateLoadBalancer`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatedLoadBalancer {
    pub load_balancer_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub network_type: String,
}

/// SLB operations used by the CLB lifecycle
#[async_trait]
pub trait SlbApi: Send + Sync {
    async fn describe_load_balancer(&self, id: &str) -> Result<LoadBalancer, ClientError>;

    async fn create_load_balancer(
        &self,
        request: &CreateLoadBalancerRequest,
    ) -> Result<CreatedLoadBalancer, ClientError>;

    async fn delete_load_balancer(&self, id: &str) -> Result<(), ClientError>;

    async fn modify_instance_spec(&self, id: &str, spec: &str) -> Result<(), ClientError>;

    async fn modify_internet_spec(
        &self,
        id: &str,
        bandwidth: Option<i32>,
        internet_charge_type: Option<&str>,
    ) -> Result<(), ClientError>;
}

/// reqwest-backed [`SlbApi`]
#[derive(Debug)]
pub struct SlbClient {
    rpc: RpcClient,
}

impl SlbClient {
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
impl SlbApi for SlbClient {
    async fn describe_load_balancer(&self, id: &str) -> Result<LoadBalancer, ClientError> {
        self.rpc
            .call(
                "DescribeLoadBalancerAttribute",
                RpcParams::new().with("LoadBalancerId", id),
            )
            .await
    }

    async fn create_load_balancer(
        &self,
        request: &CreateLoadBalancerRequest,
    ) -> Result<CreatedLoadBalancer, ClientError> {
        let params = RpcParams::new()
            .with_opt("LoadBalancerName", request.load_balancer_name.as_ref())
            .with_opt("AddressType", request.address_type.as_ref())
            .with_opt("AddressIPVersion", request.address_ip_version.as_ref())
            .with_opt("InternetChargeType", request.internet_charge_type.as_ref())
            .with_opt("Bandwidth", request.bandwidth)
            .with_opt("LoadBalancerSpec", request.load_balancer_spec.as_ref())
            .with_opt("VpcId", request.vpc_id.as_ref())
            .with_opt("VSwitchId", request.vswitch_id.as_ref())
            .with_opt("MasterZoneId", request.master_zone_id.as_ref())
            .with_opt("SlaveZoneId", request.slave_zone_id.as_ref())
            .with_opt("PayType", request.pay_type.as_ref())
            .with_opt("Address", request.address.as_ref())
            .with_opt("ResourceGroupId", request.resource_group_id.as_ref())
            .with_opt("ClientToken", request.client_token.as_ref());
        self.rpc.call("CreateLoadBalancer", params).await
    }

    async fn delete_load_balancer(&self, id: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call("DeleteLoadBalancer", RpcParams::new().with("LoadBalancerId", id))
            .await?;
        Ok(())
    }

    async fn modify_instance_spec(&self, id: &str, spec: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "ModifyLoadBalancerInstanceSpec",
                RpcParams::new()
                    .with("LoadBalancerId", id)
                    .with("LoadBalancerSpec", spec),
            )
            .await?;
        Ok(())
    }

    async fn modify_internet_spec(
        &self,
        id: &str,
        bandwidth: Option<i32>,
        internet_charge_type: Option<&str>,
    ) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "ModifyLoadBalancerInternetSpec",
                RpcParams::new()
                    .with("LoadBalancerId", id)
                    .with_opt("Bandwidth", bandwidth)
                    .with_opt("InternetChargeType", internet_charge_type),
            )
            .await?;
        Ok(())
    }
}
