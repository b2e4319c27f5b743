//! # RDSInstance
//!
//! ApsaraDB RDS instances. The external name is the `DBInstanceId` returned by
//! `CreateDBInstance`. Once the instance is `Running`, the master account is
//! created with a generated password and, when requested, a public
//! connection string is allocated. Both steps run once; their flags live in
//! `status.atProvider`. The connection step runs on the pass after the
//! account is created so the password is published first. Nothing is
//! bootstrapped while the resource is being deleted.

use super::{construction_failed, idempotent, ERR_ACCOUNT_DUPLICATE, ERR_CONNECTION_DUPLICATE};
use crate::clients::rds::{self, CreateDBInstanceRequest, DBInstance};
use crate::clients::{ClientError, RdsApi, RdsClient};
use crate::constants::{CONNECTION_ENDPOINT_KEY, CONNECTION_PASSWORD_KEY, CONNECTION_PORT_KEY, CONNECTION_USERNAME_KEY};
use crate::controller::conditions::StatusMap;
use crate::controller::engine::{ClientSettings, Created, Lifecycle};
use crate::controller::managed::{insert_detail, ConnectionDetails};
use crate::controller::password::generate_password;
use crate::controller::ReconcileError;
use crate::crd::{Managed, RDSInstance, RDSInstanceObservation, RDSInstanceParameters};
use crate::provider::endpoint::RDS_ENDPOINT;
use crate::provider::ResolvedConfig;
use async_trait::async_trait;
use kube::Resource;
use tracing::info;
use zeroize::Zeroizing;

pub const STATUS_RUNNING: &str = "Running";
pub const STATUS_CREATING: &str = "Creating";
pub const STATUS_DELETING: &str = "Deleting";

const DEFAULT_PAY_TYPE: &str = "Postpaid";

pub struct RdsLifecycle {
    client: Box<dyn RdsApi>,
}

impl RdsLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn RdsApi>) -> Self {
        Self { client }
    }
}

#[must_use]
pub fn generate_observation(instance: &DBInstance) -> RDSInstanceObservation {
    RDSInstanceObservation {
        db_instance_status: instance.db_instance_status.clone(),
        db_instance_id: instance.db_instance_id.clone(),
        creation_time: Some(instance.creation_time.clone()).filter(|t| !t.is_empty()),
        account_ready: false,
        connection_ready: false,
    }
}

/// Class and storage are the only fields RDS lets us modify in place
#[must_use]
pub fn is_up_to_date(params: &RDSInstanceParameters, instance: &DBInstance) -> bool {
    let class_matches =
        params.db_instance_class.is_empty() || params.db_instance_class == instance.db_instance_class;
    let storage_matches =
        params.db_instance_storage_in_gb == 0 || params.db_instance_storage_in_gb == instance.db_instance_storage;
    class_matches && storage_matches
}

fn create_request(mr: &RDSInstance) -> CreateDBInstanceRequest {
    let p = &mr.spec.for_provider;
    CreateDBInstanceRequest {
        engine: p.engine.clone(),
        engine_version: p.engine_version.clone(),
        db_instance_class: p.db_instance_class.clone(),
        db_instance_storage: p.db_instance_storage_in_gb,
        security_ip_list: p.security_ip_list.clone(),
        pay_type: p.pay_type.clone().unwrap_or_else(|| DEFAULT_PAY_TYPE.to_string()),
        db_instance_storage_type: p.db_instance_storage_type.clone(),
        zone_id: p.zone_id.clone(),
        instance_network_type: p.instance_network_type.clone(),
        vpc_id: p.vpc_id.clone(),
        vswitch_id: p.vswitch_id.clone(),
        client_token: mr.meta().uid.clone(),
    }
}

fn endpoint_details(username: &str, endpoint: &str, port: &str) -> ConnectionDetails {
    let mut details = ConnectionDetails::new();
    insert_detail(&mut details, CONNECTION_USERNAME_KEY, username);
    if !endpoint.is_empty() {
        insert_detail(&mut details, CONNECTION_ENDPOINT_KEY, endpoint);
    }
    if !port.is_empty() {
        insert_detail(&mut details, CONNECTION_PORT_KEY, port);
    }
    details
}

#[async_trait]
impl Lifecycle for RdsLifecycle {
    type Resource = RDSInstance;
    type Remote = DBInstance;

    const KIND: &'static str = "RDSInstance";
    const SERVICE: &'static str = rds::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[rds::ERR_INSTANCE_NOT_FOUND];
    const STATUS: StatusMap = StatusMap {
        available: &[STATUS_RUNNING],
        creating: &[STATUS_CREATING],
        deleting: &[STATUS_DELETING],
    };

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        let client = RdsClient::new(RDS_ENDPOINT, &config.region, config.credentials.clone(), settings.timeout)
            .map_err(construction_failed(rds::SERVICE))?;
        Ok(Self::new(Box::new(client)))
    }

    fn last_known_status(mr: &RDSInstance) -> Option<String> {
        Some(mr.at_provider().db_instance_status)
    }

    async fn describe(&self, id: &str, _mr: &RDSInstance) -> Result<DBInstance, ClientError> {
        self.client.describe_db_instance(id).await
    }

    fn record(mr: &mut RDSInstance, remote: &DBInstance) {
        let previous = mr.at_provider();
        let status = mr.managed_status_mut();
        status.at_provider = RDSInstanceObservation {
            account_ready: previous.account_ready,
            connection_ready: previous.connection_ready,
            ..generate_observation(remote)
        };
    }

    fn remote_status(remote: &DBInstance) -> Option<&str> {
        Some(remote.db_instance_status.as_str())
    }

    fn is_up_to_date(mr: &RDSInstance, remote: &DBInstance) -> bool {
        is_up_to_date(&mr.spec.for_provider, remote)
    }

    fn connection_details(mr: &RDSInstance, remote: &DBInstance) -> ConnectionDetails {
        endpoint_details(&mr.spec.for_provider.master_username, &remote.connection_string, &remote.port)
    }

    async fn after_observe(&self, mr: &mut RDSInstance, remote: &DBInstance) -> Result<ConnectionDetails, ClientError> {
        let mut details = ConnectionDetails::new();
        if remote.db_instance_status != STATUS_RUNNING || mr.is_being_deleted() {
            return Ok(details);
        }
        let id = remote.db_instance_id.as_str();
        let params = mr.spec.for_provider.clone();

        if !mr.at_provider().account_ready {
            let password = Zeroizing::new(generate_password());
            let created = idempotent(
                self.client.create_account(id, &params.master_username, &password).await,
                ERR_ACCOUNT_DUPLICATE,
            )?;
            if created {
                info!(db_instance_id = id, username = %params.master_username, "Created master account");
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

    async fn create(&self, mr: &mut RDSInstance) -> Result<Created, ClientError> {
        let created = self.client.create_db_instance(&create_request(mr)).await?;
        mr.managed_status_mut().at_provider.db_instance_id = created.db_instance_id.clone();
        Ok(Created {
            connection_details: endpoint_details(
                &mr.spec.for_provider.master_username,
                &created.connection_string,
                &created.port,
            ),
            external_id: created.db_instance_id,
        })
    }

    async fn update(&self, mr: &RDSInstance, remote: &DBInstance) -> Result<(), ClientError> {
        let p = &mr.spec.for_provider;
        let class = Some(p.db_instance_class.as_str())
            .filter(|c| !c.is_empty() && *c != remote.db_instance_class);
        let storage = Some(p.db_instance_storage_in_gb)
            .filter(|s| *s != 0 && *s != remote.db_instance_storage);
        if class.is_none() && storage.is_none() {
            return Ok(());
        }
        self.client
            .modify_db_instance_spec(&remote.db_instance_id, class, storage)
            .await
    }

    async fn delete(&self, id: &str, _mr: &RDSInstance) -> Result<(), ClientError> {
        self.client.delete_db_instance(id).await
    }
}
