//! # Cloud Clients
//!
//! Thin async clients for the Alibaba Cloud services the provider manages.
//!
//! Each service family exposes a trait (`RdsApi`, `RedisApi`, `OssApi`,
//! `SlbApi`, `NasApi`, `SlsApi`) so lifecycles can be driven by in-memory
//! stubs in tests, and a reqwest-backed implementation. A client is built
//! per Connect and never cached.
//!
//! - `rpc.rs` - Signed query (RPC style) transport shared by RDS, Redis, SLB and NAS
//! - `signing.rs` - HMAC-SHA1 request signatures for RPC, OSS and SLS
//! - `error.rs` - Service error codes and transport errors

pub mod error;
pub mod nas;
pub mod oss;
pub mod rds;
pub mod redis;
pub mod rpc;
pub mod signing;
pub mod slb;
pub mod sls;

pub use error::{ClientError, CloudError};
pub use nas::{NasApi, NasClient};
pub use oss::{OssApi, OssClient};
pub use rds::{RdsApi, RdsClient};
pub use redis::{RedisApi, RedisClient};
pub use slb::{SlbApi, SlbClient};
pub use sls::{SlsApi, SlsClient};

/// Prefix a bare host with `https://`; endpoints that already carry a scheme are kept
pub(crate) fn base_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

/// Host part of an endpoint, without scheme or port
pub(crate) fn host_of(endpoint: &str) -> &str {
    let rest = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    rest.split(['/', ':']).next().unwrap_or(rest)
}

/// Build the shared reqwest client with a fixed request timeout
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("alibaba-provider/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ClientError::Build)
}
