//! # OSS Client
//!
//! Bucket operations over the OSS REST API. Requests go to the regional
//! endpoint with a virtual-hosted `Host` header (`{bucket}.{endpoint host}`)
//! and are signed with `Authorization: OSS {access key}:{signature}`.

use super::error::decode_oss_error;
use super::signing::{content_md5_base64, hmac_sha1_base64, http_date, oss_string_to_sign, RestSigningInput};
use super::{base_url, host_of, http_client, ClientError};
use crate::observability::metrics;
use crate::provider::Credentials;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info_span, Instrument};

pub const SERVICE: &str = "oss";

pub const ERR_NO_SUCH_BUCKET: &str = "NoSuchBucket";

const HEADER_ACL: &str = "x-oss-acl";
const HEADER_SECURITY_TOKEN: &str = "x-oss-security-token";

/// Bucket metadata as returned by `GetBucketInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub extranet_endpoint: String,
    #[serde(default)]
    pub intranet_endpoint: String,
    #[serde(default)]
    pub storage_class: String,
    #[serde(default)]
    pub data_redundancy_type: String,
    #[serde(default)]
    pub access_control_list: AccessControlList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessControlList {
    #[serde(default)]
    pub grant: String,
}

#[derive(Debug, Deserialize)]
struct BucketInfoResponse {
    #[serde(rename = "Bucket")]
    bucket: BucketInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename = "CreateBucketConfiguration", rename_all = "PascalCase")]
struct CreateBucketConfiguration<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_class: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_redundancy_type: Option<&'a str>,
}

/// Parameters of `PutBucket`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketRequest {
    pub acl: Option<String>,
    pub storage_class: Option<String>,
    pub data_redundancy_type: Option<String>,
}

/// OSS operations used by the Bucket lifecycle
#[async_trait]
pub trait OssApi: Send + Sync {
    async fn get_bucket_info(&self, bucket: &str) -> Result<BucketInfo, ClientError>;

    async fn put_bucket(&self, bucket: &str, request: &PutBucketRequest) -> Result<(), ClientError>;

    async fn put_bucket_acl(&self, bucket: &str, acl: &str) -> Result<(), ClientError>;

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ClientError>;
}

/// reqwest-backed [`OssApi`]
pub struct OssClient {
    http: reqwest::Client,
    base_url: String,
    host: String,
    credentials: Credentials,
}

impl std::fmt::Debug for OssClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OssClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// One bucket-level request before signing
struct BucketRequest<'a> {
    method: Method,
    operation: &'static str,
    bucket: &'a str,
    sub_resource: Option<&'static str>,
    headers: BTreeMap<String, String>,
    body: Option<String>,
}

impl OssClient {
    /// # Errors
    ///
    /// Fails when the region is empty or the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        region: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        if region.is_empty() {
            return Err(ClientError::InvalidConfig(format!("region is required for {SERVICE}")));
        }
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url(endpoint),
            host: host_of(endpoint).to_string(),
            credentials,
        })
    }

    /// Sign `request` and return the headers to send, `Authorization` included
    fn signed_headers(&self, request: &BucketRequest<'_>, date: &str) -> BTreeMap<String, String> {
        let mut headers = request.headers.clone();
        if let Some(token) = &self.credentials.security_token {
            headers.insert(HEADER_SECURITY_TOKEN.to_string(), token.clone());
        }
        let (content_md5, content_type) = match &request.body {
            Some(body) => (content_md5_base64(body.as_bytes()), "application/xml".to_string()),
            None => (String::new(), String::new()),
        };
        let resource = match request.sub_resource {
            Some(sub) => format!("/{}/?{sub}", request.bucket),
            None => format!("/{}/", request.bucket),
        };
        let string_to_sign = oss_string_to_sign(&RestSigningInput {
            verb: request.method.as_str(),
            content_md5: &content_md5,
            content_type: &content_type,
            date,
            headers: &headers,
            resource: &resource,
        });
        let signature = hmac_sha1_base64(&self.credentials.access_key_secret, &string_to_sign);
        headers.insert(
            "Authorization".to_string(),
            format!("OSS {}:{signature}", self.credentials.access_key_id),
        );
        headers.insert("Date".to_string(), date.to_string());
        if !content_md5.is_empty() {
            headers.insert("Content-MD5".to_string(), content_md5);
            headers.insert("Content-Type".to_string(), content_type);
        }
        headers
    }

    async fn execute(&self, request: BucketRequest<'_>) -> Result<String, ClientError> {
        let operation = request.operation;
        let span = info_span!("alibaba.oss", service = SERVICE, operation, bucket = request.bucket);
        let start = Instant::now();
        let result = self.send(request).instrument(span).await;
        match &result {
            Ok(_) => metrics::record_cloud_operation(SERVICE, operation, start.elapsed().as_secs_f64()),
            Err(e) => {
                metrics::increment_cloud_operation_errors(SERVICE, operation);
                debug!(service = SERVICE, operation, error = %e, "Cloud call failed");
            }
        }
        result
    }

    async fn send(&self, request: BucketRequest<'_>) -> Result<String, ClientError> {
        let url = match request.sub_resource {
            Some(sub) => format!("{}/?{sub}", self.base_url),
            None => format!("{}/", self.base_url),
        };
        let headers = self.signed_headers(&request, &http_date(chrono::Utc::now()));
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(reqwest::header::HOST, format!("{}.{}", request.bucket, self.host));
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(decode_oss_error(status.as_u16(), &body).into());
        }
        Ok(body)
    }
}

#[async_trait]
impl OssApi for OssClient {
    async fn get_bucket_info(&self, bucket: &str) -> Result<BucketInfo, ClientError> {
        let body = self
            .execute(BucketRequest {
                method: Method::GET,
                operation: "GetBucketInfo",
                bucket,
                sub_resource: Some("bucketInfo"),
                headers: BTreeMap::new(),
                body: None,
            })
            .await?;
        let resp: BucketInfoResponse = quick_xml::de::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("{SERVICE} GetBucketInfo: {e}")))?;
        Ok(resp.bucket)
    }

    async fn put_bucket(&self, bucket: &str, request: &PutBucketRequest) -> Result<(), ClientError> {
        let mut headers = BTreeMap::new();
        if let Some(acl) = request.acl.as_deref().filter(|a| !a.is_empty()) {
            headers.insert(HEADER_ACL.to_string(), acl.to_string());
        }
        let config = CreateBucketConfiguration {
            storage_class: request.storage_class.as_deref(),
            data_redundancy_type: request.data_redundancy_type.as_deref(),
        };
        let body = if config.storage_class.is_some() || config.data_redundancy_type.is_some() {
            Some(
                quick_xml::se::to_string(&config)
                    .map_err(|e| ClientError::Encode(format!("{SERVICE} PutBucket: {e}")))?,
            )
        } else {
            None
        };
        self.execute(BucketRequest {
            method: Method::PUT,
            operation: "PutBucket",
            bucket,
            sub_resource: None,
            headers,
            body,
        })
        .await?;
        Ok(())
    }

    async fn put_bucket_acl(&self, bucket: &str, acl: &str) -> Result<(), ClientError> {
        self.execute(BucketRequest {
            method: Method::PUT,
            operation: "PutBucketACL",
            bucket,
            sub_resource: Some("acl"),
            headers: BTreeMap::from([(HEADER_ACL.to_string(), acl.to_string())]),
            body: None,
        })
        .await?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        self.execute(BucketRequest {
            method: Method::DELETE,
            operation: "DeleteBucket",
            bucket,
            sub_resource: None,
            headers: BTreeMap::new(),
            body: None,
        })
        .await?;
        Ok(())
    }
}
