//! # Client Errors

use serde::Deserialize;

/// An error reported by an Alibaba Cloud service
///
/// Not-found and idempotent-conflict handling match on [`CloudError::code`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message} (RequestId: {request_id}, HTTP {status})")]
pub struct CloudError {
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub status: u16,
}

impl CloudError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            request_id: String::new(),
            status: 0,
        }
    }

    /// A synthetic not-found error for describe calls that return an empty list
    pub(crate) fn not_found(code: &str, id: &str) -> Self {
        Self {
            code: code.to_string(),
            message: format!("The specified resource {id} is not found."),
            request_id: String::new(),
            status: 404,
        }
    }
}

/// Errors returned by the cloud clients
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error(transparent)]
    Service(#[from] CloudError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("cannot decode response: {0}")]
    Decode(String),
    #[error("cannot encode request: {0}")]
    Encode(String),
}

impl ClientError {
    /// The service error code, if the service answered with one
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service(e) => Some(e.code.as_str()),
            _ => None,
        }
    }

    /// Whether the service error code is one of `codes`
    #[must_use]
    pub fn has_code(&self, codes: &[&str]) -> bool {
        self.code().is_some_and(|c| codes.contains(&c))
    }
}

/// Error body of the RPC services: `{"Code": ..., "Message": ..., "RequestId": ...}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RpcErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: String,
}

/// Error body of Log Service: `{"errorCode": ..., "errorMessage": ...}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SlsErrorBody {
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
}

/// Error body of OSS: `<Error><Code/><Message/><RequestId/></Error>`
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "Error", rename_all = "PascalCase")]
pub(crate) struct OssErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: String,
}

/// Turn a non-success HTTP answer into a [`CloudError`]
///
/// Bodies that do not parse keep the raw text as the message and use the
/// HTTP status as the code.
pub(crate) fn decode_rpc_error(status: u16, body: &str) -> CloudError {
    match serde_json::from_str::<RpcErrorBody>(body) {
        Ok(e) if !e.code.is_empty() => CloudError {
            code: e.code,
            message: e.message,
            request_id: e.request_id,
            status,
        },
        _ => raw_error(status, body),
    }
}

pub(crate) fn decode_sls_error(status: u16, body: &str, request_id: Option<&str>) -> CloudError {
    match serde_json::from_str::<SlsErrorBody>(body) {
        Ok(e) if !e.error_code.is_empty() => CloudError {
            code: e.error_code,
            message: e.error_message,
            request_id: request_id.unwrap_or_default().to_string(),
            status,
        },
        _ => raw_error(status, body),
    }
}

pub(crate) fn decode_oss_error(status: u16, body: &str) -> CloudError {
    match quick_xml::de::from_str::<OssErrorBody>(body) {
        Ok(e) if !e.code.is_empty() => CloudError {
            code: e.code,
            message: e.message,
            request_id: e.request_id,
            status,
        },
        _ => raw_error(status, body),
    }
}

fn raw_error(status: u16, body: &str) -> CloudError {
    CloudError {
        code: status.to_string(),
        message: body.to_string(),
        request_id: String::new(),
        status,
    }
}
