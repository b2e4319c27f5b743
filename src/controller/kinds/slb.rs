//! # CLB
//!
//! Classic load balancers. The external name is the `LoadBalancerId`.
//! Specification and bandwidth are reconciled in place.

use super::{construction_failed, matches_opt};
use crate::clients::slb::{self, CreateLoadBalancerRequest, LoadBalancer};
use crate::clients::{ClientError, SlbApi, SlbClient};
use crate::controller::conditions::StatusMap;
use crate::controller::engine::{ClientSettings, Created, Lifecycle};
use crate::controller::managed::{insert_detail, ConnectionDetails};
use crate::controller::ReconcileError;
use crate::crd::{CLBObservation, CLBParameters, Managed, CLB};
use crate::provider::{endpoint_for, ResolvedConfig, ResourceKind};
use async_trait::async_trait;
use kube::Resource;

pub const STATUS_ACTIVE: &str = "active";

pub const ADDRESS_KEY: &str = "Address";
pub const LOAD_BALANCER_ID_KEY: &str = "LoadBalancerId";

pub struct ClbLifecycle {
    client: Box<dyn SlbApi>,
}

impl ClbLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn SlbApi>) -> Self {
        Self { client }
    }
}

#[must_use]
pub fn generate_observation(lb: &LoadBalancer) -> CLBObservation {
    CLBObservation {
        address: lb.address.clone(),
        load_balancer_id: lb.load_balancer_id.clone(),
        load_balancer_status: lb.load_balancer_status.clone(),
        network_type: lb.network_type.clone(),
        vpc_id: lb.vpc_id.clone(),
        vswitch_id: lb.vswitch_id.clone(),
        create_time: lb.create_time.clone(),
    }
}

#[must_use]
pub fn is_up_to_date(params: &CLBParameters, lb: &LoadBalancer) -> bool {
    matches_opt(params.load_balancer_spec.as_deref(), &lb.load_balancer_spec)
        && params.bandwidth.is_none_or(|b| b == lb.bandwidth)
}

/// `Address` and `LoadBalancerId` of the last observation
#[must_use]
pub fn get_connection_details(clb: &CLB) -> ConnectionDetails {
    let observation = clb.at_provider();
    let mut details = ConnectionDetails::new();
    if !observation.address.is_empty() {
        insert_detail(&mut details, ADDRESS_KEY, &observation.address);
    }
    if !observation.load_balancer_id.is_empty() {
        insert_detail(&mut details, LOAD_BALANCER_ID_KEY, &observation.load_balancer_id);
    }
    details
}

fn create_request(mr: &CLB) -> CreateLoadBalancerRequest {
    let p = &mr.spec.for_provider;
    CreateLoadBalancerRequest {
        load_balancer_name: p.load_balancer_name.clone(),
        address_type: p.address_type.clone(),
        address_ip_version: p.address_ip_version.clone(),
        internet_charge_type: p.internet_charge_type.clone(),
        bandwidth: p.bandwidth,
        load_balancer_spec: p.load_balancer_spec.clone(),
        vpc_id: p.vpc_id.clone(),
        vswitch_id: p.vswitch_id.clone(),
        master_zone_id: p.master_zone_id.clone(),
        slave_zone_id: p.slave_zone_id.clone(),
        pay_type: p.pay_type.clone(),
        address: p.address.clone(),
        resource_group_id: p.resource_group_id.clone(),
        client_token: mr.meta().uid.clone(),
    }
}

#[async_trait]
impl Lifecycle for ClbLifecycle {
    type Resource = CLB;
    type Remote = LoadBalancer;

    const KIND: &'static str = "CLB";
    const SERVICE: &'static str = slb::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[slb::ERR_LOAD_BALANCER_NOT_FOUND];
    const STATUS: StatusMap = StatusMap {
        available: &[STATUS_ACTIVE],
        creating: &[],
        deleting: &[],
    };

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        let endpoint = endpoint_for(ResourceKind::LoadBalancer.as_str(), &config.region)?;
        let client = SlbClient::new(&endpoint, &config.region, config.credentials.clone(), settings.timeout)
            .map_err(construction_failed(slb::SERVICE))?;
        Ok(Self::new(Box::new(client)))
    }

    async fn describe(&self, id: &str, _mr: &CLB) -> Result<LoadBalancer, ClientError> {
        self.client.describe_load_balancer(id).await
    }

    fn record(mr: &mut CLB, remote: &LoadBalancer) {
        mr.managed_status_mut().at_provider = generate_observation(remote);
    }

    fn remote_status(remote: &LoadBalancer) -> Option<&str> {
        Some(remote.load_balancer_status.as_str())
    }

    fn is_up_to_date(mr: &CLB, remote: &LoadBalancer) -> bool {
        is_up_to_date(&mr.spec.for_provider, remote)
    }

    fn connection_details(mr: &CLB, _remote: &LoadBalancer) -> ConnectionDetails {
        get_connection_details(mr)
    }

    async fn create(&self, mr: &mut CLB) -> Result<Created, ClientError> {
        let created = self.client.create_load_balancer(&create_request(mr)).await?;
        let observation = &mut mr.managed_status_mut().at_provider;
        observation.load_balancer_id.clone_from(&created.load_balancer_id);
        observation.address.clone_from(&created.address);
        observation.network_type.clone_from(&created.network_type);
        Ok(Created {
            connection_details: get_connection_details(mr),
            external_id: created.load_balancer_id,
        })
    }

    async fn update(&self, mr: &CLB, remote: &LoadBalancer) -> Result<(), ClientError> {
        let p = &mr.spec.for_provider;
        let id = remote.load_balancer_id.as_str();
        if let Some(spec) = p.load_balancer_spec.as_deref() {
            if !spec.is_empty() && spec != remote.load_balancer_spec {
                self.client.modify_instance_spec(id, spec).await?;
            }
        }
        if let Some(bandwidth) = p.bandwidth.filter(|b| *b != remote.bandwidth) {
            self.client
                .modify_internet_spec(id, Some(bandwidth), p.internet_charge_type.as_deref())
                .await?;
        }
        Ok(())
    }

    async fn delete(&self, id: &str, _mr: &CLB) -> Result<(), ClientError> {
        self.client.delete_load_balancer(id).await
    }
}
