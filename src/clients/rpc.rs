//! # RPC Transport
//!
//! Signed query requests for the RPC-style services (RDS, KVStore, SLB, NAS).
//! Every request carries the common parameters, a fresh nonce and timestamp,
//! and a signature over the sorted query.

use super::error::decode_rpc_error;
use super::signing::{canonical_query, sign_rpc};
use super::{base_url, http_client, ClientError};
use crate::observability::metrics;
use crate::provider::Credentials;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info_span, warn, Instrument};

/// Query parameters of one RPC action, in insertion order
#[derive(Debug, Clone, Default)]
pub struct RpcParams(Vec<(String, String)>);

impl RpcParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    /// Add a parameter only when it is set and non-empty
    #[must_use]
    pub fn with_opt<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value.map(|v| v.to_string()).filter(|v| !v.is_empty()) {
            self.0.push((key.to_string(), v));
        }
        self
    }
}

/// Client for one RPC-style service
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
    region: String,
    version: &'static str,
    service: &'static str,
    credentials: Credentials,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Create a client for `service` at API `version`
    ///
    /// # Errors
    ///
    /// Fails when the region is empty or the HTTP client cannot be built.
    pub fn new(
        service: &'static str,
        version: &'static str,
        endpoint: &str,
        region: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        if region.is_empty() {
            return Err(ClientError::InvalidConfig(format!(
                "region is required for {service}"
            )));
        }
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url(endpoint),
            region: region.to_string(),
            version,
            service,
            credentials,
        })
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    fn signed_query(&self, action: &str, params: RpcParams) -> BTreeMap<String, String> {
        let mut query: BTreeMap<String, String> = params.0.into_iter().collect();
        let common = [
            ("Action", action.to_string()),
            ("Format", "JSON".to_string()),
            ("Version", self.version.to_string()),
            ("AccessKeyId", self.credentials.access_key_id.clone()),
            ("SignatureMethod", "HMAC-SHA1".to_string()),
            ("SignatureVersion", "1.0".to_string()),
            ("SignatureNonce", uuid::Uuid::new_v4().to_string()),
            (
                "Timestamp",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
        ];
        for (k, v) in common {
            query.insert(k.to_string(), v);
        }
        query
            .entry("RegionId".to_string())
            .or_insert_with(|| self.region.clone());
        if let Some(token) = &self.credentials.security_token {
            query.insert("SecurityToken".to_string(), token.clone());
        }
        let signature = sign_rpc("GET", &query, &self.credentials.access_key_secret);
        query.insert("Signature".to_string(), signature);
        query
    }

    /// Call `action` and decode the JSON response
    ///
    /// # Errors
    ///
    /// [`ClientError::Service`] when the service rejects the call,
    /// [`ClientError::Transport`] for network failures and
    /// [`ClientError::Decode`] when the answer does not match `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: RpcParams,
    ) -> Result<T, ClientError> {
        let span = info_span!(
            "alibaba.rpc",
            service = self.service,
            operation = action,
            region = %self.region
        );
        let start = Instant::now();
        let result = self.send(action, params).instrument(span).await;
        match &result {
            Ok(_) => metrics::record_cloud_operation(
                self.service,
                action,
                start.elapsed().as_secs_f64(),
            ),
            Err(e) => {
                metrics::increment_cloud_operation_errors(self.service, action);
                debug!(service = self.service, operation = action, error = %e, "Cloud call failed");
            }
        }
        result
    }

    async fn send<T: DeserializeOwned>(&self, action: &str, params: RpcParams) -> Result<T, ClientError> {
        let url = format!("{}/?{}", self.base_url, canonical_query(&self.signed_query(action, params)));
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = decode_rpc_error(status.as_u16(), &body);
            if status.is_server_error() {
                warn!(
                    service = self.service,
                    operation = action,
                    request_id = %err.request_id,
                    "Cloud API returned {}",
                    status
                );
            }
            return Err(err.into());
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("{} {action}: {e}", self.service)))
    }
}
