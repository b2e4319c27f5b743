//! # Log Service
//!
//! Projects, log stores, store indexes, machine groups and logtail configs.
//! All of them are addressed by name. Children find their project (and log
//! store) through `forProvider`.
//!
//! Only projects and log stores can be modified in place. Drift on the other
//! three kinds is reported through `Synced=False`.

use super::{construction_failed, matches_opt};
use crate::clients::sls::{self, GroupAttribute, Index, LogProject, LogStore, LogtailConfig, MachineGroup as RemoteGroup};
use crate::clients::{ClientError, SlsApi, SlsClient};
use crate::controller::conditions::StatusMap;
use crate::controller::engine::{ClientSettings, Created, Lifecycle, UpdatePolicy};
use crate::controller::managed::ConnectionDetails;
use crate::controller::ReconcileError;
use crate::crd::{
    IndexKey, IndexLine, Logtail, LogtailInputDetail, LogtailObservation, LogtailParameters, MachineGroup,
    MachineGroupObservation, MachineGroupParameters, Managed, Project, ProjectObservation, ProjectParameters, Store,
    StoreIndex, StoreIndexObservation, StoreIndexParameters, StoreObservation, StoreParameters,
};
use crate::provider::{endpoint_for, ResolvedConfig, ResourceKind};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub const PROJECT_STATUS_NORMAL: &str = "Normal";

const DEFAULT_OUTPUT_TYPE: &str = "LogService";

fn client(config: &ResolvedConfig, settings: ClientSettings) -> Result<Box<dyn SlsApi>, ReconcileError> {
    let endpoint = endpoint_for(ResourceKind::LogProject.as_str(), &config.region)?;
    let client = SlsClient::new(&endpoint, &config.region, config.credentials.clone(), settings.timeout)
        .map_err(construction_failed(sls::SERVICE))?;
    Ok(Box::new(client))
}

fn created(name: &str) -> Created {
    Created {
        external_id: name.to_string(),
        connection_details: ConnectionDetails::new(),
    }
}

// Project

pub struct ProjectLifecycle {
    client: Box<dyn SlsApi>,
}

impl ProjectLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn SlsApi>) -> Self {
        Self { client }
    }
}

#[must_use]
pub fn generate_project_observation(project: &LogProject) -> ProjectObservation {
    ProjectObservation {
        name: project.project_name.clone(),
        status: project.status.clone(),
        region: project.region.clone(),
        owner: project.owner.clone(),
        create_time: project.create_time.clone(),
        last_modify_time: project.last_modify_time.clone(),
    }
}

#[must_use]
pub fn is_project_up_to_date(params: &ProjectParameters, project: &LogProject) -> bool {
    params.description == project.description
}

#[async_trait]
impl Lifecycle for ProjectLifecycle {
    type Resource = Project;
    type Remote = LogProject;

    const KIND: &'static str = "Project";
    const SERVICE: &'static str = sls::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[sls::ERR_PROJECT_NOT_EXIST];
    const STATUS: StatusMap = StatusMap {
        available: &[PROJECT_STATUS_NORMAL],
        creating: &[],
        deleting: &[],
    };
    const NAME_ADDRESSED: bool = true;

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        Ok(Self::new(client(config, settings)?))
    }

    async fn describe(&self, id: &str, _mr: &Project) -> Result<LogProject, ClientError> {
        self.client.get_project(id).await
    }

    fn record(mr: &mut Project, remote: &LogProject) {
        mr.managed_status_mut().at_provider = generate_project_observation(remote);
    }

    fn remote_status(remote: &LogProject) -> Option<&str> {
        Some(remote.status.as_str())
    }

    fn is_up_to_date(mr: &Project, remote: &LogProject) -> bool {
        is_project_up_to_date(&mr.spec.for_provider, remote)
    }

    async fn create(&self, mr: &mut Project) -> Result<Created, ClientError> {
        let name = Self::external_id(mr);
        self.client
            .create_project(&name, &mr.spec.for_provider.description)
            .await?;
        Ok(created(&name))
    }

    async fn update(&self, mr: &Project, remote: &LogProject) -> Result<(), ClientError> {
        self.client
            .update_project(&remote.project_name, &mr.spec.for_provider.description)
            .await
    }

    async fn delete(&self, id: &str, _mr: &Project) -> Result<(), ClientError> {
        self.client.delete_project(id).await
    }
}

// Store

pub struct StoreLifecycle {
    client: Box<dyn SlsApi>,
}

impl StoreLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn SlsApi>) -> Self {
        Self { client }
    }
}

#[must_use]
pub fn generate_store_observation(store: &LogStore) -> StoreObservation {
    StoreObservation {
        create_time: store.create_time,
        last_modify_time: store.last_modify_time,
    }
}

#[must_use]
pub fn is_store_up_to_date(params: &StoreParameters, store: &LogStore) -> bool {
    params.ttl == store.ttl
        && params.auto_split.is_none_or(|a| a == store.auto_split)
        && params.max_split_shard.is_none_or(|m| m == store.max_split_shard)
}

fn logstore_from(name: &str, params: &StoreParameters) -> LogStore {
    LogStore {
        logstore_name: name.to_string(),
        ttl: params.ttl,
        shard_count: params.shard_count,
        auto_split: params.auto_split.unwrap_or_default(),
        max_split_shard: params.max_split_shard.unwrap_or_default(),
        enable_tracking: params.enable_tracking.unwrap_or_default(),
        ..Default::default()
    }
}

#[async_trait]
impl Lifecycle for StoreLifecycle {
    type Resource = Store;
    type Remote = LogStore;

    const KIND: &'static str = "Store";
    const SERVICE: &'static str = sls::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[sls::ERR_LOGSTORE_NOT_EXIST];
    const NAME_ADDRESSED: bool = true;

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        Ok(Self::new(client(config, settings)?))
    }

    async fn describe(&self, id: &str, mr: &Store) -> Result<LogStore, ClientError> {
        self.client.get_logstore(&mr.spec.for_provider.project_name, id).await
    }

    fn record(mr: &mut Store, remote: &LogStore) {
        mr.managed_status_mut().at_provider = generate_store_observation(remote);
    }

    fn is_up_to_date(mr: &Store, remote: &LogStore) -> bool {
        is_store_up_to_date(&mr.spec.for_provider, remote)
    }

    async fn create(&self, mr: &mut Store) -> Result<Created, ClientError> {
        let name = Self::external_id(mr);
        let params = &mr.spec.for_provider;
        self.client
            .create_logstore(&params.project_name, &logstore_from(&name, params))
            .await?;
        Ok(created(&name))
    }

    async fn update(&self, mr: &Store, remote: &LogStore) -> Result<(), ClientError> {
        let params = &mr.spec.for_provider;
        let desired = LogStore {
            // shard count cannot change through UpdateLogStore
            shard_count: remote.shard_count,
            ..logstore_from(&remote.logstore_name, params)
        };
        self.client.update_logstore(&params.project_name, &desired).await
    }

    async fn delete(&self, id: &str, mr: &Store) -> Result<(), ClientError> {
        self.client.delete_logstore(&mr.spec.for_provider.project_name, id).await
    }
}

// StoreIndex

/// Index of the log store named in `forProvider`
pub struct StoreIndexLifecycle {
    client: Box<dyn SlsApi>,
}

impl StoreIndexLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn SlsApi>) -> Self {
        Self { client }
    }
}

fn index_line(line: &IndexLine) -> sls::IndexLine {
    sls::IndexLine {
        token: line.token.clone(),
        case_sensitive: line.case_sensitive,
        chn: line.chn,
        include_keys: line.include_keys.clone(),
        exclude_keys: line.exclude_keys.clone(),
    }
}

fn index_key(key: &IndexKey) -> sls::IndexKey {
    sls::IndexKey {
        r#type: key.r#type.clone(),
        token: key.token.clone(),
        case_sensitive: key.case_sensitive,
        chn: key.chn,
        doc_value: key.doc_value,
        alias: key.alias.clone(),
    }
}

/// The index document a set of parameters describes
#[must_use]
pub fn index_from(params: &StoreIndexParameters) -> Index {
    Index {
        line: params.line.as_ref().map(index_line),
        keys: params.keys.as_ref().map(|keys| {
            keys.iter()
                .map(|(name, key)| (name.clone(), index_key(key)))
                .collect::<BTreeMap<_, _>>()
        }),
    }
}

#[must_use]
pub fn generate_store_index_observation(params: &StoreIndexParameters) -> StoreIndexObservation {
    StoreIndexObservation {
        project_name: params.project_name.clone(),
        logstore_name: params.logstore_name.clone(),
    }
}

fn list_matches(desired: &[String], observed: &[String]) -> bool {
    desired.is_empty() || desired == observed
}

fn line_matches(desired: &IndexLine, observed: &sls::IndexLine) -> bool {
    desired.token == observed.token
        && desired.case_sensitive == observed.case_sensitive
        && desired.chn == observed.chn
        && list_matches(&desired.include_keys, &observed.include_keys)
        && list_matches(&desired.exclude_keys, &observed.exclude_keys)
}

fn key_matches(desired: &IndexKey, observed: &sls::IndexKey) -> bool {
    desired.r#type == observed.r#type
        && list_matches(&desired.token, &observed.token)
        && desired.case_sensitive == observed.case_sensitive
        && desired.chn == observed.chn
        && desired.doc_value == observed.doc_value
        && super::matches_opt(desired.alias.as_deref(), observed.alias.as_deref().unwrap_or_default())
}

/// Compares what `forProvider` sets; an absent `line` or `keys` is not
/// managed, and neither are empty lists or an absent alias
#[must_use]
pub fn is_store_index_up_to_date(params: &StoreIndexParameters, index: &Index) -> bool {
    let line_ok = params.line.as_ref().is_none_or(|desired| {
        index
            .line
            .as_ref()
            .is_some_and(|observed| line_matches(desired, observed))
    });
    let keys_ok = params.keys.as_ref().is_none_or(|desired| {
        let observed = index.keys.clone().unwrap_or_default();
        desired.len() == observed.len()
            && desired
                .iter()
                .all(|(name, key)| observed.get(name).is_some_and(|o| key_matches(key, o)))
    });
    line_ok && keys_ok
}

#[async_trait]
impl Lifecycle for StoreIndexLifecycle {
    type Resource = StoreIndex;
    type Remote = Index;

    const KIND: &'static str = "StoreIndex";
    const SERVICE: &'static str = sls::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[sls::ERR_INDEX_CONFIG_NOT_EXIST];
    const UPDATE_POLICY: UpdatePolicy = UpdatePolicy::NotSupported;
    const NAME_ADDRESSED: bool = true;

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        Ok(Self::new(client(config, settings)?))
    }

    async fn describe(&self, _id: &str, mr: &StoreIndex) -> Result<Index, ClientError> {
        let p = &mr.spec.for_provider;
        self.client.get_index(&p.project_name, &p.logstore_name).await
    }

    fn record(mr: &mut StoreIndex, _remote: &Index) {
        let observation = generate_store_index_observation(&mr.spec.for_provider);
        mr.managed_status_mut().at_provider = observation;
    }

    fn is_up_to_date(mr: &StoreIndex, remote: &Index) -> bool {
        is_store_index_up_to_date(&mr.spec.for_provider, remote)
    }

    async fn create(&self, mr: &mut StoreIndex) -> Result<Created, ClientError> {
        let p = &mr.spec.for_provider;
        self.client
            .create_index(&p.project_name, &p.logstore_name, &index_from(p))
            .await?;
        Ok(created(&Self::external_id(mr)))
    }

    async fn delete(&self, _id: &str, mr: &StoreIndex) -> Result<(), ClientError> {
        let p = &mr.spec.for_provider;
        self.client.delete_index(&p.project_name, &p.logstore_name).await
    }
}

// MachineGroup

pub struct MachineGroupLifecycle {
    client: Box<dyn SlsApi>,
}

impl MachineGroupLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn SlsApi>) -> Self {
        Self { client }
    }
}

fn group_attribute(params: &MachineGroupParameters) -> GroupAttribute {
    params
        .attribute
        .as_ref()
        .map(|a| GroupAttribute {
            external_name: a.external_name.clone().unwrap_or_default(),
            group_topic: a.topic_name.clone().unwrap_or_default(),
        })
        .unwrap_or_default()
}

#[must_use]
pub fn generate_machine_group_observation(group: &RemoteGroup) -> MachineGroupObservation {
    MachineGroupObservation {
        create_time: group.create_time,
        last_modify_time: group.last_modify_time,
    }
}

#[must_use]
pub fn is_machine_group_up_to_date(params: &MachineGroupParameters, group: &RemoteGroup) -> bool {
    let attribute = params.attribute.as_ref();
    params.machine_id_type == group.machine_identify_type
        && params.machine_id_list == group.machine_list
        && matches_opt(
            attribute.and_then(|a| a.external_name.as_deref()),
            &group.group_attribute.external_name,
        )
        && matches_opt(
            attribute.and_then(|a| a.topic_name.as_deref()),
            &group.group_attribute.group_topic,
        )
}

#[async_trait]
impl Lifecycle for MachineGroupLifecycle {
    type Resource = MachineGroup;
    type Remote = RemoteGroup;

    const KIND: &'static str = "MachineGroup";
    const SERVICE: &'static str = sls::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[sls::ERR_MACHINE_GROUP_NOT_EXIST];
    const UPDATE_POLICY: UpdatePolicy = UpdatePolicy::NotSupported;
    const NAME_ADDRESSED: bool = true;

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        Ok(Self::new(client(config, settings)?))
    }

    async fn describe(&self, id: &str, mr: &MachineGroup) -> Result<RemoteGroup, ClientError> {
        self.client.get_machine_group(&mr.spec.for_provider.project, id).await
    }

    fn record(mr: &mut MachineGroup, remote: &RemoteGroup) {
        mr.managed_status_mut().at_provider = generate_machine_group_observation(remote);
    }

    fn is_up_to_date(mr: &MachineGroup, remote: &RemoteGroup) -> bool {
        is_machine_group_up_to_date(&mr.spec.for_provider, remote)
    }

    async fn create(&self, mr: &mut MachineGroup) -> Result<Created, ClientError> {
        let name = Self::external_id(mr);
        let p = &mr.spec.for_provider;
        let group = RemoteGroup {
            group_name: name.clone(),
            machine_identify_type: p.machine_id_type.clone(),
            machine_list: p.machine_id_list.clone(),
            group_attribute: group_attribute(p),
            ..Default::default()
        };
        self.client.create_machine_group(&p.project, &group).await?;
        Ok(created(&name))
    }

    async fn delete(&self, id: &str, mr: &MachineGroup) -> Result<(), ClientError> {
        self.client.delete_machine_group(&mr.spec.for_provider.project, id).await
    }
}

// Logtail

pub struct LogtailLifecycle {
    client: Box<dyn SlsApi>,
}

impl LogtailLifecycle {
    #[must_use]
    pub fn new(client: Box<dyn SlsApi>) -> Self {
        Self { client }
    }
}

fn input_detail(detail: &LogtailInputDetail) -> sls::LogtailInputDetail {
    sls::LogtailInputDetail {
        log_type: detail.log_type.clone(),
        log_path: detail.log_path.clone(),
        file_pattern: detail.file_pattern.clone(),
        topic_format: detail.topic_format.clone(),
        time_format: detail.time_format.clone(),
        regex: detail.regex.clone(),
        key: detail.key.clone(),
        local_storage: detail.local_storage,
        discard_unmatch: detail.discard_unmatch,
    }
}

#[must_use]
pub fn generate_logtail_observation(config: &LogtailConfig) -> LogtailObservation {
    LogtailObservation {
        create_time: config.create_time,
        last_modify_time: config.last_modify_time,
    }
}

/// Compares the fields set in `forProvider`; optional input settings the
/// spec leaves out are not managed
#[must_use]
pub fn is_logtail_up_to_date(params: &LogtailParameters, config: &LogtailConfig) -> bool {
    let desired = input_detail(&params.input_detail);
    let observed = &config.input_detail;
    let opt_matches = |d: &Option<String>, o: &Option<String>| d.is_none() || d == o;
    let flag_matches = |d: Option<bool>, o: Option<bool>| d.is_none() || d == o;

    params.input_type == config.input_type
        && params.output_detail.logstore_name == config.output_detail.logstore_name
        && desired.log_type == observed.log_type
        && desired.log_path == observed.log_path
        && desired.file_pattern == observed.file_pattern
        && (desired.key.is_empty() || desired.key == observed.key)
        && opt_matches(&desired.topic_format, &observed.topic_format)
        && opt_matches(&desired.time_format, &observed.time_format)
        && opt_matches(&desired.regex, &observed.regex)
        && flag_matches(desired.local_storage, observed.local_storage)
        && flag_matches(desired.discard_unmatch, observed.discard_unmatch)
}

#[async_trait]
impl Lifecycle for LogtailLifecycle {
    type Resource = Logtail;
    type Remote = LogtailConfig;

    const KIND: &'static str = "Logtail";
    const SERVICE: &'static str = sls::SERVICE;
    const NOT_FOUND_CODES: &'static [&'static str] = &[sls::ERR_CONFIG_NOT_EXIST];
    const UPDATE_POLICY: UpdatePolicy = UpdatePolicy::NotSupported;
    const NAME_ADDRESSED: bool = true;

    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError> {
        Ok(Self::new(client(config, settings)?))
    }

    async fn describe(&self, id: &str, mr: &Logtail) -> Result<LogtailConfig, ClientError> {
        self.client.get_config(&mr.spec.for_provider.project_name, id).await
    }

    fn record(mr: &mut Logtail, remote: &LogtailConfig) {
        mr.managed_status_mut().at_provider = generate_logtail_observation(remote);
    }

    fn is_up_to_date(mr: &Logtail, remote: &LogtailConfig) -> bool {
        is_logtail_up_to_date(&mr.spec.for_provider, remote)
    }

    async fn create(&self, mr: &mut Logtail) -> Result<Created, ClientError> {
        let name = Self::external_id(mr);
        let p = &mr.spec.for_provider;
        let config = LogtailConfig {
            config_name: name.clone(),
            input_type: p.input_type.clone(),
            input_detail: input_detail(&p.input_detail),
            output_type: DEFAULT_OUTPUT_TYPE.to_string(),
            output_detail: sls::LogtailOutputDetail {
                logstore_name: p.output_detail.logstore_name.clone(),
            },
            log_sample: p.log_sample.clone().unwrap_or_default(),
            ..Default::default()
        };
        self.client.create_config(&p.project_name, &config).await?;
        Ok(created(&name))
    }

    async fn delete(&self, id: &str, mr: &Logtail) -> Result<(), ClientError> {
        self.client.delete_config(&mr.spec.for_provider.project_name, id).await
    }
}
