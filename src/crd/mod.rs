//! # Custom Resource Definitions
//!
//! CRD types for the Alibaba Cloud provider.
//!
//! ## Module Structure
//!
//! - `common.rs` - Fields and status shared by every managed resource
//! - `provider_config.rs` - ProviderConfig and ProviderConfigUsage
//! - `database.rs` - ApsaraDB RDS instances
//! - `redis.rs` - ApsaraDB for Redis (KVStore) instances
//! - `oss.rs` - OSS buckets
//! - `slb.rs` - Classic load balancers
//! - `nas.rs` - NAS file systems and mount targets
//! - `sls.rs` - Log Service projects, stores, indexes, machine groups and logtail configs

mod common;
mod database;
mod nas;
mod oss;
mod provider_config;
mod redis;
mod slb;
mod sls;

pub(crate) use common::impl_managed;

pub use common::{
    Condition, DeletionPolicy, Managed, ManagedStatus, ProviderConfigReference, ResourceSpec,
    SecretReference,
};
pub use database::{
    PublicConnection, RDSInstance, RDSInstanceObservation, RDSInstanceParameters,
    RDSInstanceSpec, RDSInstanceStatus,
};
pub use nas::{
    NASFileSystem, NASFileSystemObservation, NASFileSystemParameters, NASFileSystemSpec,
    NASFileSystemStatus, NASMountTarget, NASMountTargetObservation, NASMountTargetParameters,
    NASMountTargetSpec, NASMountTargetStatus,
};
pub use oss::{Bucket, BucketObservation, BucketParameters, BucketSpec, BucketStatus};
pub use provider_config::{
    CredentialsSecretRef, CredentialsSource, ProviderConfig, ProviderConfigSpec,
    ProviderConfigStatus, ProviderConfigUsage, ProviderConfigUsageSpec, ProviderCredentials,
    TypedReference,
};
pub use redis::{
    RedisInstance, RedisInstanceObservation, RedisInstanceParameters, RedisInstanceSpec,
    RedisInstanceStatus,
};
pub use slb::{CLBObservation, CLBParameters, CLBSpec, CLBStatus, CLB};
pub use sls::{
    IndexKey, IndexLine, Logtail, LogtailInputDetail, LogtailObservation, LogtailOutputDetail,
    LogtailParameters, LogtailSpec, LogtailStatus, MachineGroup, MachineGroupAttribute,
    MachineGroupObservation, MachineGroupParameters, MachineGroupSpec, MachineGroupStatus,
    Project, ProjectObservation, ProjectParameters, ProjectSpec, ProjectStatus, Store,
    StoreIndex, StoreIndexObservation, StoreIndexParameters, StoreIndexSpec, StoreIndexStatus,
    StoreObservation, StoreParameters, StoreSpec, StoreStatus,
};
