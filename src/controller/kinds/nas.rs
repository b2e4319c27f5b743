//! # NAS
//!
//! File systems and mount targets. Neither has fields that can change after
//! creation, so Update never calls the cloud.
//!
//! A mount target is only addressable together with its file system; its
//! external name is `<fileSystemID>-<mountTargetDomain>`.

use super::construction_failed;
use crate::clients::nas::{self, CreateFileSystemRequest, CreateMountTargetRequest, FileSystem, MountTarget};
use crate::clients::{ClientError, NasApi, NasClient};
use crate::controller::conditions::StatusMap;
use crate::controller::engine::{ClientSettings, Created, Lifecycle, UpdatePolicy};
use crate::controller::managed::{insert_detail, ConnectionDetails};
use crate::controller::ReconcileError;
use crate::crd::{
    Managed, NASFileSystem, NASFileSystemObservation, NASMountTarget, NASMountTargetObservation,
};
use crate::provider::{endpoint_for, ResolvedConfig, ResourceKind};
use async_trait::async_trait;

pub const FS_STATUS_RUNNING: &str = "Running";
pub const FS_STATUS_PENDING: &str = "Pending";
pub const FS_STATUS_DELETING: &str = "Deleting";

pub const MT_STATUS_ACTIVE: &str = "Active";
pub const MT_STATUS_PENDING: &str = "Pending";
pub const MT_STATUS_DELETING: &str = "Deleting";

pub const MOUNT_TARGET_DOMAIN_KEY: &str = "mountTargetDomain";

fn client(config: &ResolvedConfig, settings: ClientSettings, kind: ResourceKind) -> Result<NasClient, ReconcileError> {
    let endpoint = endpoint_for(kind.as_str(), &config.region)?;
    NasClient::new(&endpoint, &config.region, config.credentials.clone(), settings.timeout)
        .map_err(construction_failed(nas::SERVICE))
}

pub struct FileSystemLifecycle {
    client: Box<dyn NasApi>,
}

impl FileSystemLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn NasApi>) -> Self {
        Self { client }
    }
}

#[must_use]
pub fn generate_file_system_observation(fs: &FileSystem) -> NASFileSystemObservation {
    NASFileSystemObservation {
        file_system_id: fs.file_system_id.clone(),
        status: fs.status.clone(),
        file_system_type: fs.file_system_type.clone(),
        storage_type: fs.storage_type.clone(),
        protocol_type: fs.protocol_type.clone(),
        create_time: fs.create_time.clone(),
    }
}

#[async_trait]
impl Lifecycle for FileSystemLifecycle {
    type Resource = NASFileSystem;
    type Remote = FileSystem;

    const KIND: &'static str = "NASFileSystem";
    const SERVICE: &'static str = nas::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[nas::ERR_FILE_SYSTEM_NOT_FOUND];
    const STATUS: StatusMap = StatusMap {
        available: &[FS_STATUS_RUNNING],
        creating: &[FS_STATUS_PENDING],
        deleting: &[FS_STATUS_DELETING],
    };
    const UPDATE_POLICY: UpdatePolicy = UpdatePolicy::Immutable;

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        Ok(Self::new(Box::new(client(config, settings, ResourceKind::FileSystem)?)))
    }

    fn last_known_status(mr: &NASFileSystem) -> Option<String> {
        Some(mr.at_provider().status)
    }

    async fn describe(&self, id: &str, _mr: &NASFileSystem) -> Result<FileSystem, ClientError> {
        self.client.describe_file_system(id).await
    }

    fn record(mr: &mut NASFileSystem, remote: &FileSystem) {
        mr.managed_status_mut().at_provider = generate_file_system_observation(remote);
    }

    fn remote_status(remote: &FileSystem) -> Option<&str> {
        Some(remote.status.as_str())
    }

    fn is_up_to_date(_mr: &NASFileSystem, _remote: &FileSystem) -> bool {
        true
    }

    async fn create(&self, mr: &mut NASFileSystem) -> Result<Created, ClientError> {
        let p = &mr.spec.for_provider;
        let request = CreateFileSystemRequest {
            file_system_type: p.file_system_type.clone(),
            storage_type: p.storage_type.clone(),
            protocol_type: p.protocol_type.clone(),
            charge_type: p.charge_type.clone(),
            zone_id: p.zone_id.clone(),
            vpc_id: p.vpc_id.clone(),
            vswitch_id: p.vswitch_id.clone(),
            capacity: p.capacity,
            encrypt_type: p.encrypt_type,
            description: p.description.clone(),
        };
        let id = self.client.create_file_system(&request).await?;
        mr.managed_status_mut().at_provider.file_system_id.clone_from(&id);
        Ok(Created {
            external_id: id,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn delete(&self, id: &str, _mr: &NASFileSystem) -> Result<(), ClientError> {
        self.client.delete_file_system(id).await
    }
}

/// `<fileSystemID>-<mountTargetDomain>`
#[must_use]
pub fn mount_target_external_name(file_system_id: &str, domain: &str) -> String {
    format!("{file_system_id}-{domain}")
}

/// Split a mount target external name into file system ID and domain
///
/// The file system ID comes from the spec: Extreme and CPFS IDs contain `-`
/// themselves, so the name cannot be split on the separator alone.
#[must_use]
pub fn parse_mount_target_external_name<'a>(name: &'a str, file_system_id: &'a str) -> Option<(&'a str, &'a str)> {
    if file_system_id.is_empty() {
        return None;
    }
    name.strip_prefix(file_system_id)
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|domain| !domain.is_empty())
        .map(|domain| (file_system_id, domain))
}

fn split_id<'a>(id: &'a str, mr: &'a NASMountTarget) -> Result<(&'a str, &'a str), ClientError> {
    parse_mount_target_external_name(id, &mr.spec.for_provider.file_system_id).ok_or_else(|| {
        ClientError::InvalidConfig(format!(
            "mount target external name {id:?} does not start with file system {:?}",
            mr.spec.for_provider.file_system_id
        ))
    })
}

#[must_use]
pub fn generate_mount_target_observation(file_system_id: &str, mt: &MountTarget) -> NASMountTargetObservation {
    NASMountTargetObservation {
        mount_target_domain: mt.mount_target_domain.clone(),
        file_system_id: file_system_id.to_string(),
        status: mt.status.clone(),
        network_type: mt.network_type.clone(),
        access_group_name: mt.access_group.clone(),
        vpc_id: mt.vpc_id.clone(),
        vswitch_id: mt.vsw_id.clone(),
    }
}

fn domain_details(domain: &str) -> ConnectionDetails {
    let mut details = ConnectionDetails::new();
    if !domain.is_empty() {
        insert_detail(&mut details, MOUNT_TARGET_DOMAIN_KEY, domain);
    }
    details
}

pub struct MountTargetLifecycle {
    client: Box<dyn NasApi>,
}

impl MountTargetLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn NasApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Lifecycle for MountTargetLifecycle {
    type Resource = NASMountTarget;
    type Remote = MountTarget;

    const KIND: &'static str = "NASMountTarget";
    const SERVICE: &'static str = nas::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] =
        &[nas::ERR_MOUNT_TARGET_NOT_FOUND, nas::ERR_FILE_SYSTEM_NOT_FOUND];
    const STATUS: StatusMap = StatusMap {
        available: &[MT_STATUS_ACTIVE],
        creating: &[MT_STATUS_PENDING],
        deleting: &[MT_STATUS_DELETING],
    };
    const UPDATE_POLICY: UpdatePolicy = UpdatePolicy::Immutable;

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        Ok(Self::new(Box::new(client(config, settings, ResourceKind::MountTarget)?)))
    }

    fn last_known_status(mr: &NASMountTarget) -> Option<String> {
        Some(mr.at_provider().status)
    }

    async fn describe(&self, id: &str, mr: &NASMountTarget) -> Result<MountTarget, ClientError> {
        let (file_system_id, domain) = split_id(id, mr)?;
        self.client.describe_mount_target(file_system_id, domain).await
    }

    fn record(mr: &mut NASMountTarget, remote: &MountTarget) {
        let file_system_id = mr.spec.for_provider.file_system_id.clone();
        mr.managed_status_mut().at_provider = generate_mount_target_observation(&file_system_id, remote);
    }

    fn remote_status(remote: &MountTarget) -> Option<&str> {
        Some(remote.status.as_str())
    }

    fn is_up_to_date(_mr: &NASMountTarget, _remote: &MountTarget) -> bool {
        true
    }

    fn connection_details(_mr: &NASMountTarget, remote: &MountTarget) -> ConnectionDetails {
        domain_details(&remote.mount_target_domain)
    }

    async fn create(&self, mr: &mut NASMountTarget) -> Result<Created, ClientError> {
        let p = &mr.spec.for_provider;
        let request = CreateMountTargetRequest {
            file_system_id: p.file_system_id.clone(),
            access_group_name: p.access_group_name.clone(),
            network_type: p.network_type.clone(),
            vpc_id: p.vpc_id.clone(),
            vswitch_id: p.vswitch_id.clone(),
            security_group_id: p.security_group_id.clone(),
        };
        let domain = self.client.create_mount_target(&request).await?;
        let external_id = mount_target_external_name(&request.file_system_id, &domain);
        let observation = &mut mr.managed_status_mut().at_provider;
        observation.file_system_id = request.file_system_id;
        observation.mount_target_domain.clone_from(&domain);
        Ok(Created {
            external_id,
            connection_details: domain_details(&domain),
        })
    }

    async fn delete(&self, id: &str, mr: &NASMountTarget) -> Result<(), ClientError> {
        let (file_system_id, domain) = split_id(id, mr)?;
        self.client.delete_mount_target(file_system_id, domain).await
    }
}
