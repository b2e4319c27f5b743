//! # RedisInstance
//!
//! ApsaraDB for Redis (KVStore) instances. Bootstrap mirrors RDS: once the
//! instance is `Normal` the whitelist is applied, the account is created with
//! a generated password, and the optional public connection is allocated.

use super::{construction_failed, idempotent, ERR_ACCOUNT_DUPLICATE, ERR_CONNECTION_DUPLICATE};
use crate::clients::redis::{self, CreateInstanceRequest, RedisInstance as RemoteInstance};
use crate::clients::{ClientError, RedisApi, RedisClient};
use crate::constants::{CONNECTION_ENDPOINT_KEY, CONNECTION_PASSWORD_KEY, CONNECTION_PORT_KEY, CONNECTION_USERNAME_KEY};
use crate::controller::conditions::StatusMap;
use crate::controller::engine::{ClientSettings, Created, Lifecycle};
use crate::controller::managed::{insert_detail, ConnectionDetails};
use crate::controller::password::generate_password;
use crate::controller::ReconcileError;
use crate::crd::{Managed, RedisInstance, RedisInstanceObservation, RedisInstanceParameters};
use crate::provider::endpoint::REDIS_ENDPOINT;
use crate::provider::ResolvedConfig;
use async_trait::async_trait;
use kube::{Resource, ResourceExt};
use tracing::info;
use zeroize::Zeroizing;

pub const STATUS_NORMAL: &str = "Normal";
pub const STATUS_CREATING: &str = "Creating";
pub const STATUS_FLUSHING: &str = "Flushing";
pub const STATUS_DELETING: &str = "Deleting";

pub struct RedisLifecycle {
    client: Box<dyn RedisApi>,
}

impl RedisLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn RedisApi>) -> Self {
        Self { client }
    }
}

#[must_use]
pub fn generate_observation(instance: &RemoteInstance) -> RedisInstanceObservation {
    RedisInstanceObservation {
        instance_status: instance.instance_status.clone(),
        instance_id: instance.instance_id.clone(),
        account_ready: false,
        connection_ready: false,
    }
}

#[must_use]
pub fn is_up_to_date(params: &RedisInstanceParameters, instance: &RemoteInstance) -> bool {
    params.instance_class.is_empty() || params.instance_class == instance.instance_class
}

fn create_request(mr: &RedisInstance) -> CreateInstanceRequest {
    let p = &mr.spec.for_provider;
    CreateInstanceRequest {
        instance_name: mr.name_any(),
        instance_type: p.instance_type.clone(),
        engine_version: p.engine_version.clone(),
        instance_class: p.instance_class.clone(),
        charge_type: p.charge_type.clone(),
        zone_id: p.zone_id.clone(),
        network_type: p.network_type.clone(),
        vpc_id: p.vpc_id.clone(),
        vswitch_id: p.vswitch_id.clone(),
        port: p.port,
        token: mr.meta().uid.clone(),
    }
}

fn endpoint_details(username: &str, domain: &str, port: i64) -> ConnectionDetails {
    let mut details = ConnectionDetails::new();
    insert_detail(&mut details, CONNECTION_USERNAME_KEY, username);
    if !domain.is_empty() {
        insert_detail(&mut details, CONNECTION_ENDPOINT_KEY, domain);
    }
    if port > 0 {
        insert_detail(&mut details, CONNECTION_PORT_KEY, port.to_string());
    }
    details
}

#[async_trait]
impl Lifecycle for RedisLifecycle {
    type Resource = RedisInstance;
    type Remote = RemoteInstance;

    const KIND: &'static str = "RedisInstance";
    const SERVICE: &'static str = redis::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[redis::ERR_INSTANCE_NOT_FOUND];
    const STATUS: StatusMap = StatusMap {
        available: &[STATUS_NORMAL],
        creating: &[STATUS_CREATING],
        deleting: &[STATUS_FLUSHING, STATUS_DELETING],
    };

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        let client = RedisClient::new(REDIS_ENDPOINT, &config.region, config.credentials.clone(), settings.timeout)
            .map_err(construction_failed(redis::SERVICE))?;
        Ok(Self::new(Box::new(client)))
    }

    fn last_known_status(mr: &RedisInstance) -> Option<String> {
        Some(mr.at_provider().instance_status)
    }

    async fn describe(&self, id: &str, _mr: &RedisInstance) -> Result<RemoteInstance, ClientError> {
        self.client.describe_instance(id).await
    }

    fn record(mr: &mut RedisInstance, remote: &RemoteInstance) {
        let previous = mr.at_provider();
        mr.managed_status_mut().at_provider = RedisInstanceObservation {
            account_ready: previous.account_ready,
            connection_ready: previous.connection_ready,
            ..generate_observation(remote)
        };
    }

    fn remote_status(remote: &RemoteInstance) -> Option<&str> {
        Some(remote.instance_status.as_str())
    }

    fn is_up_to_date(mr: &RedisInstance, remote: &RemoteInstance) -> bool {
        is_up_to_date(&mr.spec.for_provider, remote)
    }

    fn connection_details(mr: &RedisInstance, remote: &RemoteInstance) -> ConnectionDetails {
        endpoint_details(&mr.spec.for_provider.master_username, &remote.connection_domain, remote.port)
    }

    async fn after_observe(
        &self,
        mr: &mut RedisInstance,
        remote: &RemoteInstance,
    ) -> Result<ConnectionDetails, ClientError> {
        let mut details = ConnectionDetails::new();
        if remote.instance_status != STATUS_NORMAL || mr.is_being_deleted() {
            return Ok(details);
        }
        let id = remote.instance_id.as_str();
        let params = mr.spec.for_provider.clone();

        if !mr.at_provider().account_ready {
            if !params.security_ip_list.is_empty() {
                self.client.modify_security_ips(id, &params.security_ip_list).await?;
            }
            let password = Zeroizing::new(generate_password());
            let created = idempotent(
                self.client.create_account(id, &params.master_username, &password).await,
                ERR_ACCOUNT_DUPLICATE,
            )?;
            if created {
                info!(instance_id = id, username = %params.master_username, "Created Redis account");
                insert_detail(&mut details, CONNECTION_PASSWORD_KEY, password.as_str());
            }
            mr.managed_status_mut().at_provider.account_ready = true;
            if created {
                // The password exists only in this pass; the public connection waits for the next one
                return Ok(details);
            }
        }

        if let Some(public) = &params.public_connection {
            if !mr.at_provider().connection_ready {
                idempotent(
                    self.client
                        .allocate_public_connection(id, &public.connection_string_prefix, public.port.as_deref())
                        .await,
                    ERR_CONNECTION_DUPLICATE,
                )?;
                mr.managed_status_mut().at_provider.connection_ready = true;
            }
        }
        Ok(details)
    }

    async fn create(&self, mr: &mut RedisInstance) -> Result<Created, ClientError> {
        let created = self.client.create_instance(&create_request(mr)).await?;
        mr.managed_status_mut().at_provider.instance_id = created.instance_id.clone();
        Ok(Created {
            connection_details: endpoint_details(
                &mr.spec.for_provider.master_username,
                &created.connection_domain,
                created.port,
            ),
            external_id: created.instance_id,
        })
    }

    async fn update(&self, mr: &RedisInstance, remote: &RemoteInstance) -> Result<(), ClientError> {
        let class = &mr.spec.for_provider.instance_class;
        if class.is_empty() || *class == remote.instance_class {
            return Ok(());
        }
        self.client.modify_instance_spec(&remote.instance_id, class).await
    }

    async fn delete(&self, id: &str, _mr: &RedisInstance) -> Result<(), ClientError> {
        self.client.delete_instance(id).await
    }
}
