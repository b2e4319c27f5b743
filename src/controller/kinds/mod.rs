//! # Managed Resource Kinds
//!
//! One [`Lifecycle`](super::engine::Lifecycle) per kind. Each module also holds
//! the pure `generate_observation` and `is_up_to_date` helpers for its kind.
//!
//! - `rds.rs` - RDSInstance
//! - `redis.rs` - RedisInstance
//! - `oss.rs` - Bucket
//! - `slb.rs` - CLB
//! - `nas.rs` - NASFileSystem, NASMountTarget
//! - `sls.rs` - Project, Store, StoreIndex, MachineGroup, Logtail

pub mod nas;
pub mod oss;
pub mod rds;
pub mod redis;
pub mod slb;
pub mod sls;

pub use nas::{FileSystemLifecycle, MountTargetLifecycle};
pub use oss::BucketLifecycle;
pub use rds::RdsLifecycle;
pub use redis::RedisLifecycle;
pub use slb::ClbLifecycle;
pub use sls::{LogtailLifecycle, MachineGroupLifecycle, ProjectLifecycle, StoreIndexLifecycle, StoreLifecycle};

use super::ReconcileError;
use crate::clients::ClientError;

/// The database account already exists
pub const ERR_ACCOUNT_DUPLICATE: &[&str] = &["InvalidAccountName.Duplicate"];

/// The public connection string already exists
pub const ERR_CONNECTION_DUPLICATE: &[&str] = &["InvalidConnectionStringOrPort.Duplicate", "NetTypeExists"];

/// Treat the listed codes as "already done"
///
/// Returns `Ok(true)` when the call did the work, `Ok(false)` when it had
/// already been done.
pub(crate) fn idempotent(result: Result<(), ClientError>, done_codes: &[&str]) -> Result<bool, ClientError> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.has_code(done_codes) => Ok(false),
        Err(e) => Err(e),
    }
}

pub(crate) fn construction_failed(service: &'static str) -> impl FnOnce(ClientError) -> ReconcileError {
    move |source| ReconcileError::ClientConstructionFailed { service, source }
}

/// `None` and empty strings leave the field unmanaged
pub(crate) fn matches_opt(desired: Option<&str>, observed: &str) -> bool {
    desired.is_none_or(|d| d.is_empty() || d == observed)
}
