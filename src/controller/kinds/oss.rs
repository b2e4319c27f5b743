//! # Bucket
//!
//! OSS buckets are addressed by name and have no lifecycle status: a bucket
//! that answers `GetBucketInfo` is available. Only the ACL is reconciled
//! after creation.

use super::{construction_failed, matches_opt};
use crate::clients::oss::{self, BucketInfo, PutBucketRequest};
use crate::clients::{ClientError, OssApi, OssClient};
use crate::controller::engine::{ClientSettings, Created, Lifecycle};
use crate::controller::managed::{insert_detail, ConnectionDetails};
use crate::controller::ReconcileError;
use crate::crd::{Bucket, BucketObservation, BucketParameters, Managed};
use crate::provider::{endpoint_for, ResolvedConfig, ResourceKind};
use async_trait::async_trait;
use kube::ResourceExt;

pub const EXTRANET_ENDPOINT_KEY: &str = "extranetEndpoint";
pub const INTRANET_ENDPOINT_KEY: &str = "intranetEndpoint";

pub struct BucketLifecycle {
    client: Box<dyn OssApi>,
}

impl BucketLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn OssApi>) -> Self {
        Self { client }
    }
}

#[must_use]
pub fn generate_observation(info: &BucketInfo) -> BucketObservation {
    BucketObservation {
        name: info.name.clone(),
        location: info.location.clone(),
        creation_date: info.creation_date.clone(),
        extranet_endpoint: info.extranet_endpoint.clone(),
        intranet_endpoint: info.intranet_endpoint.clone(),
        storage_class: info.storage_class.clone(),
        acl: info.access_control_list.grant.clone(),
    }
}

#[must_use]
pub fn is_up_to_date(params: &BucketParameters, info: &BucketInfo) -> bool {
    matches_opt(params.acl.as_deref(), &info.access_control_list.grant)
}

#[async_trait]
impl Lifecycle for BucketLifecycle {
    type Resource = Bucket;
    type Remote = BucketInfo;

    const KIND: &'static str = "Bucket";
    const SERVICE: &'static str = oss::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[oss::ERR_NO_SUCH_BUCKET];
    const NAME_ADDRESSED: bool = true;

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        let endpoint = endpoint_for(ResourceKind::Bucket.as_str(), &config.region)?;
        let client = OssClient::new(&endpoint, &config.region, config.credentials.clone(), settings.timeout)
            .map_err(construction_failed(oss::SERVICE))?;
        Ok(Self::new(Box::new(client)))
    }

    async fn describe(&self, id: &str, _mr: &Bucket) -> Result<BucketInfo, ClientError> {
        self.client.get_bucket_info(id).await
    }

    fn record(mr: &mut Bucket, remote: &BucketInfo) {
        mr.managed_status_mut().at_provider = generate_observation(remote);
    }

    fn is_up_to_date(mr: &Bucket, remote: &BucketInfo) -> bool {
        is_up_to_date(&mr.spec.for_provider, remote)
    }

    fn connection_details(_mr: &Bucket, remote: &BucketInfo) -> ConnectionDetails {
        let mut details = ConnectionDetails::new();
        insert_detail(&mut details, EXTRANET_ENDPOINT_KEY, &remote.extranet_endpoint);
        insert_detail(&mut details, INTRANET_ENDPOINT_KEY, &remote.intranet_endpoint);
        details
    }

    async fn create(&self, mr: &mut Bucket) -> Result<Created, ClientError> {
        let name = mr.external_name().map_or_else(|| mr.name_any(), str::to_string);
        let p = &mr.spec.for_provider;
        let request = PutBucketRequest {
            acl: p.acl.clone(),
            storage_class: p.storage_class.clone(),
            data_redundancy_type: p.data_redundancy_type.clone(),
        };
        self.client.put_bucket(&name, &request).await?;
        Ok(Created {
            external_id: name,
            connection_details: ConnectionDetails::new(),
        })
    }

    async fn update(&self, mr: &Bucket, remote: &BucketInfo) -> Result<(), ClientError> {
        match mr.spec.for_provider.acl.as_deref() {
            Some(acl) if !acl.is_empty() && acl != remote.access_control_list.grant => {
                let bucket = mr.external_name().unwrap_or(&remote.name);
                self.client.put_bucket_acl(bucket, acl).await
            }
            _ => Ok(()),
        }
    }

    async fn delete(&self, id: &str, _mr: &Bucket) -> Result<(), ClientError> {
        self.client.delete_bucket(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::oss::AccessControlList;

    fn info(acl: &str) -> BucketInfo {
        BucketInfo {
            name: "logs".to_string(),
            location: "oss-cn-hangzhou".to_string(),
            extranet_endpoint: "oss-cn-hangzhou.aliyuncs.com".to_string(),
            intranet_endpoint: "oss-cn-hangzhou-internal.aliyuncs.com".to_string(),
            access_control_list: AccessControlList {
                grant: acl.to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_observation() {
        let obs = generate_observation(&info("private"));
        assert_eq!(obs.name, "logs");
        assert_eq!(obs.location, "oss-cn-hangzhou");
        assert_eq!(obs.acl, "private");
        assert_eq!(obs.intranet_endpoint, "oss-cn-hangzhou-internal.aliyuncs.com");
    }

    #[test]
    fn test_is_up_to_date_follows_acl() {
        let private = BucketParameters {
            acl: Some("private".to_string()),
            ..Default::default()
        };
        assert!(is_up_to_date(&private, &info("private")));
        assert!(!is_up_to_date(&private, &info("public-read")));
        assert!(is_up_to_date(&BucketParameters::default(), &info("public-read")));
    }

    #[test]
    fn test_connection_details() {
        let details = BucketLifecycle::connection_details(
            &Bucket::new(
                "logs",
                crate::crd::BucketSpec {
                    resource_spec: Default::default(),
                    for_provider: Default::default(),
                },
            ),
            &info("private"),
        );
        assert_eq!(details[EXTRANET_ENDPOINT_KEY], b"oss-cn-hangzhou.aliyuncs.com".to_vec());
        assert_eq!(details.len(), 2);
    }
}
