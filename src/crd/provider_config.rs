//! # ProviderConfig
//!
//! Cluster-scoped bundle of credentials source and region, plus the usage
//! records that keep a ProviderConfig alive while managed resources use it.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProviderConfig configures how managed resources reach Alibaba Cloud
///
/// # Example
///
/// ```yaml
/// apiVersion: alibaba.crossplane.io/v1beta1
/// kind: ProviderConfig
/// metadata:
///   name: default
/// spec:
///   region: cn-hangzhou
///   credentials:
///     source: Secret
///     secretRef:
///       namespace: crossplane-system
///       name: alibaba-creds
/// ```
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "alibaba.crossplane.io",
    version = "v1beta1",
    kind = "ProviderConfig",
    category = "crossplane",
    category = "provider",
    category = "alibaba",
    status = "ProviderConfigStatus",
    printcolumn = r#"{"name":"REGION", "type":"string", "jsonPath":".spec.region"}"#,
    printcolumn = r#"{"name":"SECRET-NAME", "type":"string", "jsonPath":".spec.credentials.secretRef.name", "priority": 1}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// Where the access key is read from
    pub credentials: ProviderCredentials,
    /// Region every client built from this config targets
    #[serde(default)]
    pub region: String,
}

/// Credentials source of a ProviderConfig
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    /// Only `Secret` is supported
    pub source: CredentialsSource,
    /// Secret holding `accessKeyId`, `accessKeySecret` and optionally `securityToken`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<CredentialsSecretRef>,
}

/// Known credentials sources; anything but `Secret` is rejected at resolve time
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum CredentialsSource {
    Secret,
    InjectedIdentity,
    Environment,
    Filesystem,
    None,
}

impl CredentialsSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secret => "Secret",
            Self::InjectedIdentity => "InjectedIdentity",
            Self::Environment => "Environment",
            Self::Filesystem => "Filesystem",
            Self::None => "None",
        }
    }
}

/// Secret selector for credentials
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct CredentialsSecretRef {
    pub namespace: String,
    pub name: String,
}

/// Status of a ProviderConfig
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigStatus {
    /// Number of managed resources using this ProviderConfig
    #[serde(default)]
    pub users: i64,
}

/// Records that a managed resource uses a ProviderConfig
#[derive(CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "alibaba.crossplane.io",
    version = "v1beta1",
    kind = "ProviderConfigUsage",
    category = "crossplane",
    category = "provider",
    category = "alibaba",
    printcolumn = r#"{"name":"CONFIG-NAME", "type":"string", "jsonPath":".spec.providerConfigRef.name"}"#,
    printcolumn = r#"{"name":"RESOURCE-KIND", "type":"string", "jsonPath":".spec.resourceRef.kind"}"#,
    printcolumn = r#"{"name":"RESOURCE-NAME", "type":"string", "jsonPath":".spec.resourceRef.name"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigUsageSpec {
    pub provider_config_ref: super::ProviderConfigReference,
    pub resource_ref: TypedReference,
}

/// Reference to a managed resource by API version, kind and name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypedReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_spec_deserialize() {
        let spec: ProviderConfigSpec = serde_json::from_value(serde_json::json!({
            "region": "cn-beijing",
            "credentials": {
                "source": "Secret",
                "secretRef": {"namespace": "crossplane-system", "name": "alibaba-creds"}
            }
        }))
        .unwrap();
        assert_eq!(spec.region, "cn-beijing");
        assert_eq!(spec.credentials.source, CredentialsSource::Secret);
        assert_eq!(
            spec.credentials.secret_ref.unwrap().name,
            "alibaba-creds".to_string()
        );
    }

    #[test]
    fn test_credentials_source_names() {
        assert_eq!(CredentialsSource::Secret.as_str(), "Secret");
        assert_eq!(CredentialsSource::InjectedIdentity.as_str(), "InjectedIdentity");
    }
}
