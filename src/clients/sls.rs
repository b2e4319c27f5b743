//! # Log Service Client
//!
//! Projects, log stores, indexes, machine groups and logtail configs over the
//! SLS REST API (version 0.6.0). Each request targets the project host
//! `{project}.{region endpoint}` and is signed with
//! `Authorization: LOG {access key}:{signature}`.

use super::error::decode_sls_error;
use super::signing::{content_md5_hex_upper, hmac_sha1_base64, http_date, sls_string_to_sign, RestSigningInput};
use super::{base_url, host_of, http_client, ClientError};
use crate::observability::metrics;
use crate::provider::Credentials;
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info_span, Instrument};

pub const SERVICE: &str = "sls";
const API_VERSION: &str = "0.6.0";

pub const ERR_PROJECT_NOT_EXIST: &str = "ProjectNotExist";
pub const ERR_LOGSTORE_NOT_EXIST: &str = "LogStoreNotExist";
pub const ERR_INDEX_CONFIG_NOT_EXIST: &str = "IndexConfigNotExist";
pub const ERR_MACHINE_GROUP_NOT_EXIST: &str = "MachineGroupNotExist";
pub const ERR_CONFIG_NOT_EXIST: &str = "ConfigNotExist";

const HEADER_REQUEST_ID: &str = "x-log-requestid";

/// Timestamps come back as numbers or strings depending on the API
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogProject {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub create_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_modify_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStore {
    pub logstore_name: String,
    pub ttl: i32,
    pub shard_count: i32,
    #[serde(default)]
    pub auto_split: bool,
    #[serde(default)]
    pub max_split_shard: i32,
    #[serde(rename = "enable_tracking", default)]
    pub enable_tracking: bool,
    #[serde(default, skip_serializing)]
    pub create_time: i64,
    #[serde(default, skip_serializing)]
    pub last_modify_time: i64,
}

/// Full-text part of an index
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexLine {
    #[serde(default)]
    pub token: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub chn: bool,
    #[serde(rename = "include_keys", default, skip_serializing_if = "Vec::is_empty")]
    pub include_keys: Vec<String>,
    #[serde(rename = "exclude_keys", default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_keys: Vec<String>,
}

/// Field index of one key
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexKey {
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub chn: bool,
    #[serde(rename = "doc_value", default)]
    pub doc_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Index {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<IndexLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<BTreeMap<String, IndexKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAttribute {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_topic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineGroup {
    pub group_name: String,
    pub machine_identify_type: String,
    #[serde(default)]
    pub machine_list: Vec<String>,
    #[serde(default)]
    pub group_attribute: GroupAttribute,
    #[serde(default, skip_serializing)]
    pub create_time: i64,
    #[serde(default, skip_serializing)]
    pub last_modify_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogtailInputDetail {
    pub log_type: String,
    #[serde(default)]
    pub log_path: String,
    #[serde(default)]
    pub file_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_storage: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_unmatch: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogtailOutputDetail {
    pub logstore_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogtailConfig {
    pub config_name: String,
    pub input_type: String,
    pub input_detail: LogtailInputDetail,
    #[serde(default)]
    pub output_type: String,
    pub output_detail: LogtailOutputDetail,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log_sample: String,
    #[serde(default, skip_serializing)]
    pub create_time: i64,
    #[serde(default, skip_serializing)]
    pub last_modify_time: i64,
}

/// SLS operations used by the Log Service lifecycles
#[async_trait]
pub trait SlsApi: Send + Sync {
    async fn get_project(&self, project: &str) -> Result<LogProject, ClientError>;
    async fn create_project(&self, project: &str, description: &str) -> Result<(), ClientError>;
    async fn update_project(&self, project: &str, description: &str) -> Result<(), ClientError>;
    async fn delete_project(&self, project: &str) -> Result<(), ClientError>;

    async fn get_logstore(&self, project: &str, logstore: &str) -> Result<LogStore, ClientError>;
    async fn create_logstore(&self, project: &str, logstore: &LogStore) -> Result<(), ClientError>;
    async fn update_logstore(&self, project: &str, logstore: &LogStore) -> Result<(), ClientError>;
    async fn delete_logstore(&self, project: &str, logstore: &str) -> Result<(), ClientError>;

    async fn get_index(&self, project: &str, logstore: &str) -> Result<Index, ClientError>;
    async fn create_index(&self, project: &str, logstore: &str, index: &Index) -> Result<(), ClientError>;
    async fn delete_index(&self, project: &str, logstore: &str) -> Result<(), ClientError>;

    async fn get_machine_group(&self, project: &str, group: &str) -> Result<MachineGroup, ClientError>;
    async fn create_machine_group(&self, project: &str, group: &MachineGroup) -> Result<(), ClientError>;
    async fn delete_machine_group(&self, project: &str, group: &str) -> Result<(), ClientError>;

    async fn get_config(&self, project: &str, config: &str) -> Result<LogtailConfig, ClientError>;
    async fn create_config(&self, project: &str, config: &LogtailConfig) -> Result<(), ClientError>;
    async fn delete_config(&self, project: &str, config: &str) -> Result<(), ClientError>;
}

/// reqwest-backed [`SlsApi`]
pub struct SlsClient {
    http: reqwest::Client,
    base_url: String,
    host: String,
    credentials: Credentials,
}

impl std::fmt::Debug for SlsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SlsClient {
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

    fn signed_headers(
        &self,
        method: &Method,
        path: &str,
        body: Option<&[u8]>,
        date: &str,
    ) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::from([
            ("x-log-apiversion".to_string(), API_VERSION.to_string()),
            ("x-log-signaturemethod".to_string(), "hmac-sha1".to_string()),
            (
                "x-log-bodyrawsize".to_string(),
                body.map_or(0, <[u8]>::len).to_string(),
            ),
        ]);
        if let Some(token) = &self.credentials.security_token {
            headers.insert("x-acs-security-token".to_string(), token.clone());
        }
        let (content_md5, content_type) = match body {
            Some(b) => (content_md5_hex_upper(b), "application/json".to_string()),
            None => (String::new(), String::new()),
        };
        let string_to_sign = sls_string_to_sign(&RestSigningInput {
            verb: method.as_str(),
            content_md5: &content_md5,
            content_type: &content_type,
            date,
            headers: &headers,
            resource: path,
        });
        let signature = hmac_sha1_base64(&self.credentials.access_key_secret, &string_to_sign);
        headers.insert(
            "Authorization".to_string(),
            format!("LOG {}:{signature}", self.credentials.access_key_id),
        );
        headers.insert("Date".to_string(), date.to_string());
        if !content_md5.is_empty() {
            headers.insert("Content-MD5".to_string(), content_md5);
            headers.insert("Content-Type".to_string(), content_type);
        }
        headers
    }

    async fn execute(
        &self,
        method: Method,
        operation: &'static str,
        project: &str,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<String, ClientError> {
        let span = info_span!("alibaba.sls", service = SERVICE, operation, project);
        let start = Instant::now();
        let result = self
            .send(method, project, path, body)
            .instrument(span)
            .await;
        match &result {
            Ok(_) => metrics::record_cloud_operation(SERVICE, operation, start.elapsed().as_secs_f64()),
            Err(e) => {
                metrics::increment_cloud_operation_errors(SERVICE, operation);
                debug!(service = SERVICE, operation, error = %e, "Cloud call failed");
            }
        }
        result
    }

    async fn send(
        &self,
        method: Method,
        project: &str,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<String, ClientError> {
        let headers = self.signed_headers(&method, path, body.as_deref(), &http_date(chrono::Utc::now()));
        let mut builder = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .header(reqwest::header::HOST, format!("{project}.{}", self.host));
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let request_id = response
            .headers()
            .get(HEADER_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;
        if !status.is_success() {
            return Err(decode_sls_error(status.as_u16(), &text, request_id.as_deref()).into());
        }
        Ok(text)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        project: &str,
        path: &str,
    ) -> Result<T, ClientError> {
        let text = self.execute(Method::GET, operation, project, path, None).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(format!("{SERVICE} {operation}: {e}")))
    }

    async fn write<B: Serialize + Sync>(
        &self,
        method: Method,
        operation: &'static str,
        project: &str,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        let body = serde_json::to_vec(body).map_err(|e| ClientError::Encode(format!("{SERVICE} {operation}: {e}")))?;
        self.execute(method, operation, project, path, Some(body)).await?;
        Ok(())
    }

    async fn delete(&self, operation: &'static str, project: &str, path: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, operation, project, path, None).await?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    project_name: Option<&'a str>,
    description: &'a str,
}

#[async_trait]
impl SlsApi for SlsClient {
    async fn get_project(&self, project: &str) -> Result<LogProject, ClientError> {
        self.get("GetProject", project, "/").await
    }

    async fn create_project(&self, project: &str, description: &str) -> Result<(), ClientError> {
        let body = ProjectBody {
            project_name: Some(project),
            description,
        };
        self.write(Method::POST, "CreateProject", project, "/", &body).await
    }

    async fn update_project(&self, project: &str, description: &str) -> Result<(), ClientError> {
        let body = ProjectBody {
            project_name: None,
            description,
        };
        self.write(Method::PUT, "UpdateProject", project, "/", &body).await
    }

    async fn delete_project(&self, project: &str) -> Result<(), ClientError> {
        self.delete("DeleteProject", project, "/").await
    }

    async fn get_logstore(&self, project: &str, logstore: &str) -> Result<LogStore, ClientError> {
        self.get("GetLogStore", project, &format!("/logstores/{logstore}")).await
    }

    async fn create_logstore(&self, project: &str, logstore: &LogStore) -> Result<(), ClientError> {
        self.write(Method::POST, "CreateLogStore", project, "/logstores", logstore)
            .await
    }

    async fn update_logstore(&self, project: &str, logstore: &LogStore) -> Result<(), ClientError> {
        let path = format!("/logstores/{}", logstore.logstore_name);
        self.write(Method::PUT, "UpdateLogStore", project, &path, logstore).await
    }

    async fn delete_logstore(&self, project: &str, logstore: &str) -> Result<(), ClientError> {
        self.delete("DeleteLogStore", project, &format!("/logstores/{logstore}")).await
    }

    async fn get_index(&self, project: &str, logstore: &str) -> Result<Index, ClientError> {
        self.get("GetIndex", project, &format!("/logstores/{logstore}/index")).await
    }

    async fn create_index(&self, project: &str, logstore: &str, index: &Index) -> Result<(), ClientError> {
        let path = format!("/logstores/{logstore}/index");
        self.write(Method::POST, "CreateIndex", project, &path, index).await
    }

    async fn delete_index(&self, project: &str, logstore: &str) -> Result<(), ClientError> {
        self.delete("DeleteIndex", project, &format!("/logstores/{logstore}/index")).await
    }

    async fn get_machine_group(&self, project: &str, group: &str) -> Result<MachineGroup, ClientError> {
        self.get("GetMachineGroup", project, &format!("/machinegroups/{group}")).await
    }

    async fn create_machine_group(&self, project: &str, group: &MachineGroup) -> Result<(), ClientError> {
        self.write(Method::POST, "CreateMachineGroup", project, "/machinegroups", group)
            .await
    }

    async fn delete_machine_group(&self, project: &str, group: &str) -> Result<(), ClientError> {
        self.delete("DeleteMachineGroup", project, &format!("/machinegroups/{group}")).await
    }

    async fn get_config(&self, project: &str, config: &str) -> Result<LogtailConfig, ClientError> {
        self.get("GetConfig", project, &format!("/configs/{config}")).await
    }

    async fn create_config(&self, project: &str, config: &LogtailConfig) -> Result<(), ClientError> {
        self.write(Method::POST, "CreateConfig", project, "/configs", config).await
    }

    async fn delete_config(&self, project: &str, config: &str) -> Result<(), ClientError> {
        self.delete("DeleteConfig", project, &format!("/configs/{config}")).await
    }
}
