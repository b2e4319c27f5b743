//! # Endpoints
//!
//! Maps a resource kind and region to the Alibaba Cloud API endpoint.

use std::fmt;
use std::str::FromStr;

/// Central RDS endpoint; the region travels as `RegionId`
pub const RDS_ENDPOINT: &str = "rds.aliyuncs.com";

/// Central KVStore (Redis) endpoint; the region travels as `RegionId`
pub const REDIS_ENDPOINT: &str = "r-kvstore.aliyuncs.com";

/// Region-independent SLB endpoint
pub const SLB_ENDPOINT: &str = "slb.aliyuncs.com";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("region is required for resource kind {0}")]
    RegionInvalid(String),
    #[error("unsupported resource kind {0}")]
    UnsupportedResourceKind(String),
}

/// Resource kinds whose endpoint depends on the region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bucket,
    FileSystem,
    MountTarget,
    LoadBalancer,
    LogProject,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::FileSystem => "filesystem",
            Self::MountTarget => "mount-target",
            Self::LoadBalancer => "load-balancer",
            Self::LogProject => "log-project",
        }
    }

    fn requires_region(self) -> bool {
        !matches!(self, Self::LoadBalancer)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bucket" => Ok(Self::Bucket),
            "filesystem" => Ok(Self::FileSystem),
            "mount-target" => Ok(Self::MountTarget),
            "load-balancer" => Ok(Self::LoadBalancer),
            "log-project" => Ok(Self::LogProject),
            other => Err(EndpointError::UnsupportedResourceKind(other.to_string())),
        }
    }
}

/// Endpoint for a resource kind in a region
///
/// # Errors
///
/// [`EndpointError::UnsupportedResourceKind`] for unknown kinds and
/// [`EndpointError::RegionInvalid`] when a region-bound kind gets an empty region.
pub fn endpoint_for(kind: &str, region: &str) -> Result<String, EndpointError> {
    let kind: ResourceKind = kind.parse()?;
    if kind.requires_region() && region.is_empty() {
        return Err(EndpointError::RegionInvalid(kind.to_string()));
    }
    Ok(match kind {
        ResourceKind::Bucket => format!("http://oss-{region}.aliyuncs.com"),
        ResourceKind::FileSystem | ResourceKind::MountTarget => format!("nas.{region}.aliyuncs.com"),
        ResourceKind::LoadBalancer => SLB_ENDPOINT.to_string(),
        ResourceKind::LogProject => format!("{region}.log.aliyuncs.com"),
    })
}
