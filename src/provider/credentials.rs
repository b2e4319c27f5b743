//! # Credentials
//!
//! Resolves a ProviderConfig name to an access key and region.
//!
//! The only supported credentials source is `Secret`: the named Kubernetes
//! Secret must carry `accessKeyId` and `accessKeySecret`, and may carry
//! `securityToken` for STS credentials. Nothing here retries; a failed
//! resolution fails the reconciliation pass and the error policy requeues it.

use crate::crd::{CredentialsSource, ProviderConfig, ProviderConfigSpec};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const ACCESS_KEY_ID_KEY: &str = "accessKeyId";
pub const ACCESS_KEY_SECRET_KEY: &str = "accessKeySecret";
pub const SECURITY_TOKEN_KEY: &str = "securityToken";

/// Errors raised while resolving credentials
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("cannot get ProviderConfig {0}: not found")]
    ProviderConfigNotFound(String),
    #[error("cannot get ProviderConfig {name}: {source}")]
    ProviderConfigFetchFailed {
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("credentials source {0} is not currently supported")]
    UnsupportedCredentialSource(String),
    #[error("no secretRef configured in ProviderConfig {0}")]
    SecretRefMissing(String),
    #[error("cannot get credentials secret {namespace}/{name}: {source}")]
    SecretFetchFailed {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("credentials secret {0} must contain non-empty accessKeyId and accessKeySecret")]
    IncompleteCredentials(String),
}

/// Failure reported by a [`ConfigStore`]
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<kube::Error> for StoreError {
    fn from(e: kube::Error) -> Self {
        Self(e.to_string())
    }
}

/// Access key used to sign cloud requests. Wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub security_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field(
                "security_token",
                &self.security_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Credentials and region resolved from a ProviderConfig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub region: String,
}

/// Read access to ProviderConfigs and Secrets
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// `Ok(None)` when the ProviderConfig does not exist
    async fn provider_config(&self, name: &str) -> Result<Option<ProviderConfigSpec>, StoreError>;

    async fn secret_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, StoreError>;
}

/// [`ConfigStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeConfigStore {
    client: Client,
}

impl fmt::Debug for KubeConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeConfigStore").finish_non_exhaustive()
    }
}

impl KubeConfigStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConfigStore for KubeConfigStore {
    async fn provider_config(&self, name: &str) -> Result<Option<ProviderConfigSpec>, StoreError> {
        let api: Api<ProviderConfig> = Api::all(self.client.clone());
        match api.get(name).await {
            Ok(pc) => Ok(Some(pc.spec)),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn secret_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = secrets.get(name).await?;
        Ok(secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, v.0))
            .collect())
    }
}

/// Resolves ProviderConfig names to [`ResolvedConfig`]
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn ConfigStore>,
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver").finish_non_exhaustive()
    }
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Resolve a ProviderConfig to credentials and region
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialError`] describing the first missing piece.
    pub async fn resolve(&self, provider_config_name: &str) -> Result<ResolvedConfig, CredentialError> {
        let spec = self
            .store
            .provider_config(provider_config_name)
            .await
            .map_err(|source| CredentialError::ProviderConfigFetchFailed {
                name: provider_config_name.to_string(),
                source,
            })?
            .ok_or_else(|| CredentialError::ProviderConfigNotFound(provider_config_name.to_string()))?;

        if spec.credentials.source != CredentialsSource::Secret {
            return Err(CredentialError::UnsupportedCredentialSource(
                spec.credentials.source.as_str().to_string(),
            ));
        }

        let secret_ref = spec
            .credentials
            .secret_ref
            .as_ref()
            .ok_or_else(|| CredentialError::SecretRefMissing(provider_config_name.to_string()))?;

        let data = self
            .store
            .secret_data(&secret_ref.namespace, &secret_ref.name)
            .await
            .map_err(|source| CredentialError::SecretFetchFailed {
                namespace: secret_ref.namespace.clone(),
                name: secret_ref.name.clone(),
                source,
            })?;

        let credentials = credentials_from_secret(&data)
            .ok_or_else(|| CredentialError::IncompleteCredentials(secret_ref.name.clone()))?;

        debug!(
            provider_config = provider_config_name,
            region = %spec.region,
            access_key_id = %credentials.access_key_id,
            "Resolved provider credentials"
        );

        Ok(ResolvedConfig {
            credentials,
            region: spec.region,
        })
    }
}

fn credentials_from_secret(data: &BTreeMap<String, Vec<u8>>) -> Option<Credentials> {
    let read = |key: &str| {
        data.get(key)
            .map(|v| String::from_utf8_lossy(v).trim().to_string())
            .filter(|v| !v.is_empty())
    };
    Some(Credentials {
        access_key_id: read(ACCESS_KEY_ID_KEY)?,
        access_key_secret: read(ACCESS_KEY_SECRET_KEY)?,
        security_token: read(SECURITY_TOKEN_KEY),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{CredentialsSecretRef, ProviderCredentials};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        configs: BTreeMap<String, ProviderConfigSpec>,
        secrets: BTreeMap<(String, String), BTreeMap<String, Vec<u8>>>,
        fail_configs: bool,
        secret_reads: Mutex<u32>,
    }

    #[async_trait]
    impl ConfigStore for MemoryStore {
        async fn provider_config(
            &self,
            name: &str,
        ) -> Result<Option<ProviderConfigSpec>, StoreError> {
            if self.fail_configs {
                return Err(StoreError("connection refused".to_string()));
            }
            Ok(self.configs.get(name).cloned())
        }

        async fn secret_data(
            &self,
            namespace: &str,
            name: &str,
        ) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
            *self.secret_reads.lock().unwrap() += 1;
            self.secrets
                .get(&(namespace.to_string(), name.to_string()))
                .cloned()
                .ok_or_else(|| StoreError(format!("secrets \"{name}\" not found")))
        }
    }

    fn secret_config(region: &str) -> ProviderConfigSpec {
        ProviderConfigSpec {
            region: region.to_string(),
            credentials: ProviderCredentials {
                source: CredentialsSource::Secret,
                secret_ref: Some(CredentialsSecretRef {
                    namespace: "crossplane-system".to_string(),
                    name: "creds".to_string(),
                }),
            },
        }
    }

    fn secret(pairs: &[(&str, &str)]) -> BTreeMap<String, Vec<u8>> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.as_bytes().to_vec()))
            .collect()
    }

    fn store_with(spec: ProviderConfigSpec, data: BTreeMap<String, Vec<u8>>) -> MemoryStore {
        let mut store = MemoryStore::default();
        store.configs.insert("default".to_string(), spec);
        store
            .secrets
            .insert(("crossplane-system".to_string(), "creds".to_string()), data);
        store
    }

    #[tokio::test]
    async fn test_resolve_success_with_token() {
        let store = store_with(
            secret_config("cn-hangzhou"),
            secret(&[
                ("accessKeyId", "AKID"),
                ("accessKeySecret", "SECRET"),
                ("securityToken", "TOKEN"),
            ]),
        );
        let resolver = CredentialResolver::new(Arc::new(store));
        let resolved = resolver.resolve("default").await.unwrap();
        assert_eq!(resolved.region, "cn-hangzhou");
        assert_eq!(resolved.credentials.access_key_id, "AKID");
        assert_eq!(resolved.credentials.access_key_secret, "SECRET");
        assert_eq!(resolved.credentials.security_token.as_deref(), Some("TOKEN"));
    }

    #[tokio::test]
    async fn test_resolve_without_token() {
        let store = store_with(
            secret_config("cn-beijing"),
            secret(&[("accessKeyId", "AKID"), ("accessKeySecret", "SECRET")]),
        );
        let resolved = CredentialResolver::new(Arc::new(store))
            .resolve("default")
            .await
            .unwrap();
        assert!(resolved.credentials.security_token.is_none());
    }

    #[tokio::test]
    async fn test_provider_config_not_found() {
        let resolver = CredentialResolver::new(Arc::new(MemoryStore::default()));
        let err = resolver.resolve("missing").await.unwrap_err();
        assert!(matches!(err, CredentialError::ProviderConfigNotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_provider_config_fetch_failed() {
        let store = MemoryStore {
            fail_configs: true,
            ..Default::default()
        };
        let err = CredentialResolver::new(Arc::new(store))
            .resolve("default")
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::ProviderConfigFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_source() {
        let mut spec = secret_config("cn-hangzhou");
        spec.credentials.source = CredentialsSource::InjectedIdentity;
        let store = store_with(spec, BTreeMap::new());
        let err = CredentialResolver::new(Arc::new(store))
            .resolve("default")
            .await
            .unwrap_err();
        assert!(
            matches!(err, CredentialError::UnsupportedCredentialSource(ref s) if s == "InjectedIdentity")
        );
    }

    #[tokio::test]
    async fn test_secret_ref_missing_skips_secret_read() {
        let mut spec = secret_config("cn-hangzhou");
        spec.credentials.secret_ref = None;
        let store = Arc::new(store_with(spec, BTreeMap::new()));
        let err = CredentialResolver::new(Arc::clone(&store) as Arc<dyn ConfigStore>)
            .resolve("default")
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::SecretRefMissing(_)));
        assert_eq!(*store.secret_reads.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_secret_fetch_failed() {
        let mut store = MemoryStore::default();
        store
            .configs
            .insert("default".to_string(), secret_config("cn-hangzhou"));
        let err = CredentialResolver::new(Arc::new(store))
            .resolve("default")
            .await
            .unwrap_err();
        assert!(
            matches!(err, CredentialError::SecretFetchFailed { ref name, .. } if name == "creds")
        );
    }

    #[tokio::test]
    async fn test_incomplete_credentials() {
        for data in [
            secret(&[("accessKeyId", "AKID")]),
            secret(&[("accessKeySecret", "SECRET")]),
            secret(&[("accessKeyId", ""), ("accessKeySecret", "SECRET")]),
            BTreeMap::new(),
        ] {
            let store = store_with(secret_config("cn-hangzhou"), data);
            let err = CredentialResolver::new(Arc::new(store))
                .resolve("default")
                .await
                .unwrap_err();
            assert!(matches!(err, CredentialError::IncompleteCredentials(_)));
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials {
            access_key_id: "AKID".to_string(),
            access_key_secret: "super-secret".to_string(),
            security_token: Some("tok".to_string()),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("AKID"));
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("tok\""));
    }
}
