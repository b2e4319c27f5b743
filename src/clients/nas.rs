//! # NAS Client
//!
//! Network Attached Storage, API version 2017-06-26.

use super::rpc::{RpcClient, RpcParams};
use super::{ClientError, CloudError};
use crate::provider::Credentials;
use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::time::Duration;

pub const SERVICE: &str = "nas";
const API_VERSION: &str = "2017-06-26";

pub const ERR_FILE_SYSTEM_NOT_FOUND: &str = "InvalidFileSystem.NotFound";
pub const ERR_MOUNT_TARGET_NOT_FOUND: &str = "InvalidMountTarget.NotFound";

/// A file system as returned by `DescribeFileSystems`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileSystem {
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

/// A mount target as returned by `DescribeMountTargets`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountTarget {
    pub mount_target_domain: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub network_type: String,
    #[serde(default)]
    pub access_group: String,
    #[serde(default)]
    pub vpc_id: String,
    #[serde(default)]
    pub vsw_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeFileSystemsResponse {
    file_systems: FileSystemList,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FileSystemList {
    #[serde(default)]
    file_system: Vec<FileSystem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeMountTargetsResponse {
    mount_targets: MountTargetList,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MountTargetList {
    #[serde(default)]
    mount_target: Vec<MountTarget>,
}

/// Parameters of `CreateFileSystem`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFileSystemRequest {
    pub file_system_type: Option<String>,
    pub storage_type: String,
    pub protocol_type: String,
    pub charge_type: Option<String>,
    pub zone_id: Option<String>,
    pub vpc_id: Option<String>,
    pub vswitch_id: Option<String>,
    pub capacity: Option<i64>,
    pub encrypt_type: Option<i32>,
    pub description: Option<String>,
}

/// Parameters of `CreateMountTarget`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateMountTargetRequest {
    pub file_system_id: String,
    pub access_group_name: Option<String>,
    pub network_type: Option<String>,
    pub vpc_id: Option<String>,
    pub vswitch_id: Option<String>,
    pub security_group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateFileSystemResponse {
    file_system_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateMountTargetResponse {
    mount_target_domain: String,
}

/// NAS operations used by the file system and mount target lifecycles
#[async_trait]
pub trait NasApi: Send + Sync {
    async fn describe_file_system(&self, id: &str) -> Result<FileSystem, ClientError>;

    /// Returns the new file system ID
    async fn create_file_system(&self, request: &CreateFileSystemRequest) -> Result<String, ClientError>;

    async fn delete_file_system(&self, id: &str) -> Result<(), ClientError>;

    async fn describe_mount_target(
        &self,
        file_system_id: &str,
        domain: &str,
    ) -> Result<MountTarget, ClientError>;

    /// Returns the new mount target domain
    async fn create_mount_target(&self, request: &CreateMountTargetRequest) -> Result<String, ClientError>;

    async fn delete_mount_target(&self, file_system_id: &str, domain: &str) -> Result<(), ClientError>;
}

/// reqwest-backed [`NasApi`]
#[derive(Debug)]
pub struct NasClient {
    rpc: RpcClient,
}

impl NasClient {
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
impl NasApi for NasClient {
    async fn describe_file_system(&self, id: &str) -> Result<FileSystem, ClientError> {
        let resp: DescribeFileSystemsResponse = self
            .rpc
            .call("DescribeFileSystems", RpcParams::new().with("FileSystemId", id))
            .await?;
        resp.file_systems
            .file_system
            .into_iter()
            .find(|fs| fs.file_system_id == id)
            .ok_or_else(|| CloudError::not_found(ERR_FILE_SYSTEM_NOT_FOUND, id).into())
    }

    async fn create_file_system(&self, request: &CreateFileSystemRequest) -> Result<String, ClientError> {
        let params = RpcParams::new()
            .with("StorageType", &request.storage_type)
            .with("ProtocolType", &request.protocol_type)
            .with_opt("FileSystemType", request.file_system_type.as_ref())
            .with_opt("ChargeType", request.charge_type.as_ref())
            .with_opt("ZoneId", request.zone_id.as_ref())
            .with_opt("VpcId", request.vpc_id.as_ref())
            .with_opt("VSwitchId", request.vswitch_id.as_ref())
            .with_opt("Capacity", request.capacity)
            .with_opt("EncryptType", request.encrypt_type)
            .with_opt("Description", request.description.as_ref());
        let resp: CreateFileSystemResponse = self.rpc.call("CreateFileSystem", params).await?;
        Ok(resp.file_system_id)
    }

    async fn delete_file_system(&self, id: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call("DeleteFileSystem", RpcParams::new().with("FileSystemId", id))
            .await?;
        Ok(())
    }

    async fn describe_mount_target(
        &self,
        file_system_id: &str,
        domain: &str,
    ) -> Result<MountTarget, ClientError> {
        let resp: DescribeMountTargetsResponse = self
            .rpc
            .call(
                "DescribeMountTargets",
                RpcParams::new()
                    .with("FileSystemId", file_system_id)
                    .with("MountTargetDomain", domain),
            )
            .await?;
        resp.mount_targets
            .mount_target
            .into_iter()
            .find(|mt| mt.mount_target_domain == domain)
            .ok_or_else(|| CloudError::not_found(ERR_MOUNT_TARGET_NOT_FOUND, domain).into())
    }

    async fn create_mount_target(&self, request: &CreateMountTargetRequest) -> Result<String, ClientError> {
        let params = RpcParams::new()
            .with("FileSystemId", &request.file_system_id)
            .with_opt("AccessGroupName", request.access_group_name.as_ref())
            .with_opt("NetworkType", request.network_type.as_ref())
            .with_opt("VpcId", request.vpc_id.as_ref())
            .with_opt("VSwitchId", request.vswitch_id.as_ref())
            .with_opt("SecurityGroupId", request.security_group_id.as_ref());
        let resp: CreateMountTargetResponse = self.rpc.call("CreateMountTarget", params).await?;
        Ok(resp.mount_target_domain)
    }

    async fn delete_mount_target(&self, file_system_id: &str, domain: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .rpc
            .call(
                "DeleteMountTarget",
                RpcParams::new()
                    .with("FileSystemId", file_system_id)
                    .with("MountTargetDomain", domain),
            )
            .await?;
        Ok(())
    }
}
