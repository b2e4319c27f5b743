//! # Lifecycle Tests
//!
//! Drives the per-kind lifecycles through the shared engine with in-memory
//! cloud APIs: what each kind records, which connection details it returns
//! and which cloud calls it makes or skips.

mod common;

use alibaba_provider::clients::nas::{CreateFileSystemRequest, CreateMountTargetRequest, FileSystem, MountTarget};
use alibaba_provider::clients::oss::{AccessControlList, BucketInfo, PutBucketRequest};
use alibaba_provider::clients::rds::{self, CreateDBInstanceRequest, CreatedDBInstance, DBInstance};
use alibaba_provider::clients::redis::{self as kvstore, CreateInstanceRequest, CreatedInstance, RedisInstance as KvInstance};
use alibaba_provider::clients::slb::{self, CreateLoadBalancerRequest, CreatedLoadBalancer, LoadBalancer};
use alibaba_provider::clients::sls::{self, Index, LogProject, LogStore, LogtailConfig};
use alibaba_provider::clients::{ClientError, CloudError, NasApi, OssApi, RdsApi, RedisApi, SlbApi, SlsApi};
use alibaba_provider::controller::conditions::{self, TYPE_READY};
use alibaba_provider::controller::kinds::{
    BucketLifecycle, ClbLifecycle, LogtailLifecycle, MachineGroupLifecycle, MountTargetLifecycle, ProjectLifecycle,
    RdsLifecycle, RedisLifecycle, StoreIndexLifecycle, StoreLifecycle,
};
use alibaba_provider::prelude::*;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type Calls = Arc<Mutex<Vec<String>>>;

fn calls(log: &Calls) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn cloud_error(code: &str) -> ClientError {
    CloudError::new(code, "stub").into()
}

// RDS

#[derive(Clone, Default)]
struct StubRds {
    instance: Option<DBInstance>,
    describe_error: Option<&'static str>,
    account_error: Option<&'static str>,
    connection_error: Option<&'static str>,
    delete_error: Option<&'static str>,
    calls: Calls,
}

impl StubRds {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RdsApi for StubRds {
    async fn describe_db_instance(&self, id: &str) -> Result<DBInstance, ClientError> {
        self.record(format!("describe:{id}"));
        if let Some(code) = self.describe_error {
            return Err(cloud_error(code));
        }
        self.instance
            .clone()
            .ok_or_else(|| cloud_error(rds::ERR_INSTANCE_NOT_FOUND))
    }

    async fn create_db_instance(&self, request: &CreateDBInstanceRequest) -> Result<CreatedDBInstance, ClientError> {
        self.record(format!(
            "create:{}:{}:{}",
            request.engine, request.engine_version, request.db_instance_storage
        ));
        Ok(CreatedDBInstance {
            db_instance_id: "test".to_string(),
            connection_string: "172.0.0.1".to_string(),
            port: "8888".to_string(),
        })
    }

    async fn delete_db_instance(&self, id: &str) -> Result<(), ClientError> {
        self.record(format!("delete:{id}"));
        self.delete_error.map_or(Ok(()), |code| Err(cloud_error(code)))
    }

    async fn create_account(&self, id: &str, username: &str, password: &str) -> Result<(), ClientError> {
        assert!(!password.is_empty());
        self.record(format!("create_account:{id}:{username}"));
        self.account_error.map_or(Ok(()), |code| Err(cloud_error(code)))
    }

    async fn allocate_public_connection(&self, id: &str, prefix: &str, _port: Option<&str>) -> Result<(), ClientError> {
        self.record(format!("allocate_public_connection:{id}:{prefix}"));
        self.connection_error.map_or(Ok(()), |code| Err(cloud_error(code)))
    }

    async fn modify_db_instance_spec(&self, id: &str, class: Option<&str>, storage: Option<i32>) -> Result<(), ClientError> {
        self.record(format!("modify:{id}:{class:?}:{storage:?}"));
        Ok(())
    }
}

fn rds_engine(stub: &StubRds) -> Engine<RdsLifecycle> {
    Engine::new(RdsLifecycle::new(Box::new(stub.clone())))
}

fn rds_instance(public: bool) -> RDSInstance {
    let mr = RDSInstance::new(
        "db",
        RDSInstanceSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: RDSInstanceParameters {
                engine: "PostgreSQL".to_string(),
                engine_version: "10.0".to_string(),
                db_instance_class: "rds.pg.s1.small".to_string(),
                db_instance_storage_in_gb: 20,
                security_ip_list: "0.0.0.0/0".to_string(),
                master_username: "test".to_string(),
                public_connection: public.then(|| PublicConnection {
                    connection_string_prefix: "db-public".to_string(),
                    port: None,
                }),
                ..Default::default()
            },
        },
    );
    common::with_uid(mr, "4f1c2d3e-0000-4000-8000-000000000001")
}

fn running_instance() -> DBInstance {
    DBInstance {
        db_instance_id: "test".to_string(),
        db_instance_status: "Running".to_string(),
        engine: "PostgreSQL".to_string(),
        engine_version: "10.0".to_string(),
        db_instance_class: "rds.pg.s1.small".to_string(),
        db_instance_storage: 20,
        connection_string: "172.0.0.1".to_string(),
        port: "8888".to_string(),
        creation_time: "2024-03-01T10:00:00Z".to_string(),
    }
}

fn detail(details: &ConnectionDetails, key: &str) -> Option<String> {
    details.get(key).map(|v| String::from_utf8_lossy(v).into_owned())
}

#[tokio::test]
async fn test_observe_without_external_name_makes_no_call() {
    let stub = StubRds::default();
    let mut mr = rds_instance(false);
    let obs = rds_engine(&stub).observe(&mut mr).await.unwrap();
    assert_eq!(obs, ExternalObservation::absent());
    assert!(calls(&stub.calls).is_empty());
}

#[tokio::test]
async fn test_rds_observe_running_creates_master_account_once() {
    let stub = StubRds {
        instance: Some(running_instance()),
        ..Default::default()
    };
    let engine = rds_engine(&stub);
    let mut mr = rds_instance(false);
    mr.set_external_name("test");

    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists);
    assert!(obs.resource_up_to_date);
    assert_eq!(detail(&obs.connection_details, "username").as_deref(), Some("test"));
    assert_eq!(detail(&obs.connection_details, "endpoint").as_deref(), Some("172.0.0.1"));
    assert_eq!(detail(&obs.connection_details, "port").as_deref(), Some("8888"));
    assert!(detail(&obs.connection_details, "password").is_some_and(|p| !p.is_empty()));

    let observed = mr.at_provider();
    assert_eq!(observed.db_instance_status, "Running");
    assert!(observed.account_ready);
    let ready = conditions::find(mr.conditions(), TYPE_READY).unwrap();
    assert_eq!(ready.status, "True");

    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(!obs.connection_details.contains_key("password"));
    assert_eq!(
        calls(&stub.calls),
        vec!["describe:test", "create_account:test:test", "describe:test"]
    );
}

#[tokio::test]
async fn test_rds_observe_creating_waits_for_account() {
    let stub = StubRds {
        instance: Some(DBInstance {
            db_instance_status: "Creating".to_string(),
            ..running_instance()
        }),
        ..Default::default()
    };
    let mut mr = rds_instance(true);
    mr.set_external_name("test");
    let obs = rds_engine(&stub).observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists);
    assert!(!mr.at_provider().account_ready);
    assert_eq!(calls(&stub.calls), vec!["describe:test"]);
    let ready = conditions::find(mr.conditions(), TYPE_READY).unwrap();
    assert_eq!(ready.reason.as_deref(), Some("Creating"));
}

#[tokio::test]
async fn test_rds_duplicate_account_and_connection_count_as_done() {
    let stub = StubRds {
        instance: Some(running_instance()),
        account_error: Some("InvalidAccountName.Duplicate"),
        connection_error: Some("NetTypeExists"),
        ..Default::default()
    };
    let mut mr = rds_instance(true);
    mr.set_external_name("test");
    let obs = rds_engine(&stub).observe(&mut mr).await.unwrap();
    assert!(!obs.connection_details.contains_key("password"));
    assert!(mr.at_provider().account_ready);
    assert!(mr.at_provider().connection_ready);
    assert_eq!(
        calls(&stub.calls),
        vec![
            "describe:test",
            "create_account:test:test",
            "allocate_public_connection:test:db-public"
        ]
    );
}

#[tokio::test]
async fn test_rds_account_failure_fails_observe() {
    let stub = StubRds {
        instance: Some(running_instance()),
        account_error: Some("OperationDenied.DBInstanceStatus"),
        ..Default::default()
    };
    let mut mr = rds_instance(false);
    mr.set_external_name("test");
    let err = rds_engine(&stub).observe(&mut mr).await.unwrap_err();
    assert_eq!(err.reason(), "observe");
    assert!(!mr.at_provider().account_ready);
}

#[tokio::test]
async fn test_rds_public_connection_waits_for_pass_after_password() {
    let stub = StubRds {
        instance: Some(running_instance()),
        ..Default::default()
    };
    let engine = rds_engine(&stub);
    let mut mr = rds_instance(true);
    mr.set_external_name("test");

    let first = engine.observe(&mut mr).await.unwrap();
    assert!(detail(&first.connection_details, "password").is_some());
    assert!(mr.at_provider().account_ready);
    assert!(!mr.at_provider().connection_ready);
    assert_eq!(calls(&stub.calls), vec!["describe:test", "create_account:test:test"]);

    let second = engine.observe(&mut mr).await.unwrap();
    assert!(!second.connection_details.contains_key("password"));
    assert!(mr.at_provider().connection_ready);
    assert_eq!(
        calls(&stub.calls)[2..],
        ["describe:test", "allocate_public_connection:test:db-public"]
    );
}

#[tokio::test]
async fn test_rds_connection_failure_does_not_touch_created_account() {
    let stub = StubRds {
        instance: Some(running_instance()),
        connection_error: Some("OperationDenied.DBInstanceStatus"),
        ..Default::default()
    };
    let engine = rds_engine(&stub);
    let mut mr = rds_instance(true);
    mr.set_external_name("test");

    let first = engine.observe(&mut mr).await.unwrap();
    assert!(detail(&first.connection_details, "password").is_some());

    let err = engine.observe(&mut mr).await.unwrap_err();
    assert_eq!(err.reason(), "observe");
    assert!(mr.at_provider().account_ready);
    assert_eq!(
        calls(&stub.calls),
        vec![
            "describe:test",
            "create_account:test:test",
            "describe:test",
            "allocate_public_connection:test:db-public"
        ]
    );
}

#[tokio::test]
async fn test_rds_fresh_password_postpones_update() {
    let stub = StubRds {
        instance: Some(running_instance()),
        ..Default::default()
    };
    let engine = rds_engine(&stub);
    let mut mr = rds_instance(false);
    mr.set_external_name("test");
    mr.spec.for_provider.db_instance_class = "rds.pg.s2.large".to_string();

    let first = engine.observe(&mut mr).await.unwrap();
    assert!(first.connection_details.contains_key("password"));
    assert!(first.resource_up_to_date);

    let second = engine.observe(&mut mr).await.unwrap();
    assert!(!second.resource_up_to_date);
}

#[tokio::test]
async fn test_rds_deleting_instance_skips_bootstrap() {
    let stub = StubRds {
        instance: Some(running_instance()),
        ..Default::default()
    };
    let mut mr = rds_instance(true);
    mr.set_external_name("test");
    common::mark_deleted(&mut mr);

    let obs = rds_engine(&stub).observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists);
    assert!(!obs.connection_details.contains_key("password"));
    assert!(!mr.at_provider().account_ready);
    assert_eq!(calls(&stub.calls), vec!["describe:test"]);
}

#[tokio::test]
async fn test_rds_not_found_is_absent_and_other_errors_fail() {
    let mut mr = rds_instance(false);
    mr.set_external_name("test");

    let missing = StubRds::default();
    assert!(!rds_engine(&missing).observe(&mut mr).await.unwrap().resource_exists);

    let throttled = StubRds {
        describe_error: Some("Throttling.User"),
        ..Default::default()
    };
    let err = rds_engine(&throttled).observe(&mut mr).await.unwrap_err();
    assert!(matches!(err, ReconcileError::ObserveFailed { kind: "RDSInstance", .. }));
    assert!(err.to_string().contains("Throttling.User"));
}

#[tokio::test]
async fn test_rds_create() {
    let stub = StubRds::default();
    let mut mr = rds_instance(false);
    let creation = rds_engine(&stub).create(&mut mr).await.unwrap();

    assert_eq!(mr.external_name(), Some("test"));
    assert_eq!(mr.at_provider().db_instance_id, "test");
    assert_eq!(detail(&creation.connection_details, "username").as_deref(), Some("test"));
    assert_eq!(detail(&creation.connection_details, "endpoint").as_deref(), Some("172.0.0.1"));
    assert_eq!(detail(&creation.connection_details, "port").as_deref(), Some("8888"));
    assert_eq!(calls(&stub.calls), vec!["create:PostgreSQL:10.0:20"]);
}

#[tokio::test]
async fn test_rds_create_is_noop_while_creating() {
    let stub = StubRds::default();
    let mut mr = rds_instance(false);
    mr.managed_status_mut().at_provider.db_instance_status = "Creating".to_string();
    let creation = rds_engine(&stub).create(&mut mr).await.unwrap();
    assert_eq!(creation, ExternalCreation::default());
    assert_eq!(mr.external_name(), None);
    assert!(calls(&stub.calls).is_empty());
}

#[tokio::test]
async fn test_rds_update_modifies_drifted_fields_only() {
    let stub = StubRds {
        instance: Some(running_instance()),
        ..Default::default()
    };
    let mut mr = rds_instance(false);
    mr.set_external_name("test");
    mr.spec.for_provider.db_instance_storage_in_gb = 50;
    rds_engine(&stub).update(&mut mr).await.unwrap();
    assert_eq!(calls(&stub.calls), vec!["describe:test", "modify:test:None:Some(50)"]);
}

#[tokio::test]
async fn test_rds_delete() {
    let mut mr = rds_instance(false);

    let stub = StubRds::default();
    rds_engine(&stub).delete(&mut mr).await.unwrap();
    assert!(calls(&stub.calls).is_empty(), "empty external name must not call the cloud");

    mr.set_external_name("test");
    let gone = StubRds {
        delete_error: Some(rds::ERR_INSTANCE_NOT_FOUND),
        ..Default::default()
    };
    rds_engine(&gone).delete(&mut mr).await.unwrap();
    assert_eq!(calls(&gone.calls), vec!["delete:test"]);

    let locked = StubRds {
        delete_error: Some("IncorrectDBInstanceState"),
        ..Default::default()
    };
    let err = rds_engine(&locked).delete(&mut mr).await.unwrap_err();
    assert_eq!(err.reason(), "delete");

    let deleting = StubRds::default();
    mr.managed_status_mut().at_provider.db_instance_status = "Deleting".to_string();
    rds_engine(&deleting).delete(&mut mr).await.unwrap();
    assert!(calls(&deleting.calls).is_empty());
}

// SLB

#[derive(Clone, Default)]
struct StubSlb {
    load_balancer: Option<LoadBalancer>,
    calls: Calls,
}

#[async_trait]
impl SlbApi for StubSlb {
    async fn describe_load_balancer(&self, id: &str) -> Result<LoadBalancer, ClientError> {
        self.calls.lock().unwrap().push(format!("describe:{id}"));
        self.load_balancer
            .clone()
            .ok_or_else(|| cloud_error(slb::ERR_LOAD_BALANCER_NOT_FOUND))
    }

    async fn create_load_balancer(&self, request: &CreateLoadBalancerRequest) -> Result<CreatedLoadBalancer, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create:{}", request.client_token.as_deref().unwrap_or_default()));
        Ok(CreatedLoadBalancer {
            load_balancer_id: "lb-bp1".to_string(),
            address: "47.96.1.2".to_string(),
            network_type: "classic".to_string(),
        })
    }

    async fn delete_load_balancer(&self, id: &str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(format!("delete:{id}"));
        Ok(())
    }

    async fn modify_instance_spec(&self, id: &str, spec: &str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(format!("modify_spec:{id}:{spec}"));
        Ok(())
    }

    async fn modify_internet_spec(
        &self,
        id: &str,
        bandwidth: Option<i32>,
        _internet_charge_type: Option<&str>,
    ) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(format!("modify_internet:{id}:{bandwidth:?}"));
        Ok(())
    }
}

fn clb(spec: Option<&str>, bandwidth: Option<i32>) -> CLB {
    let mr = CLB::new(
        "lb",
        CLBSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: CLBParameters {
                load_balancer_spec: spec.map(str::to_string),
                bandwidth,
                ..Default::default()
            },
        },
    );
    common::with_uid(mr, "uid-clb")
}

fn active_lb() -> LoadBalancer {
    LoadBalancer {
        load_balancer_id: "lb-bp1".to_string(),
        load_balancer_status: "active".to_string(),
        address: "47.96.1.2".to_string(),
        load_balancer_spec: "slb.s1.small".to_string(),
        bandwidth: 10,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_clb_create_returns_address_and_id() {
    let stub = StubSlb::default();
    let mut mr = clb(None, None);
    let creation = Engine::new(ClbLifecycle::new(Box::new(stub.clone())))
        .create(&mut mr)
        .await
        .unwrap();
    assert_eq!(mr.external_name(), Some("lb-bp1"));
    assert_eq!(detail(&creation.connection_details, "Address").as_deref(), Some("47.96.1.2"));
    assert_eq!(detail(&creation.connection_details, "LoadBalancerId").as_deref(), Some("lb-bp1"));
    assert_eq!(calls(&stub.calls), vec!["create:uid-clb"]);
}

#[tokio::test]
async fn test_clb_drift_is_corrected() {
    let stub = StubSlb {
        load_balancer: Some(active_lb()),
        ..Default::default()
    };
    let engine = Engine::new(ClbLifecycle::new(Box::new(stub.clone())));
    let mut mr = clb(Some("slb.s2.medium"), Some(20));
    mr.set_external_name("lb-bp1");

    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists);
    assert!(!obs.resource_up_to_date);
    assert_eq!(detail(&obs.connection_details, "Address").as_deref(), Some("47.96.1.2"));

    engine.update(&mut mr).await.unwrap();
    assert_eq!(
        calls(&stub.calls),
        vec![
            "describe:lb-bp1",
            "describe:lb-bp1",
            "modify_spec:lb-bp1:slb.s2.medium",
            "modify_internet:lb-bp1:Some(20)"
        ]
    );
}

// OSS

#[derive(Clone, Default)]
struct StubOss {
    info: Option<BucketInfo>,
    calls: Calls,
}

#[async_trait]
impl OssApi for StubOss {
    async fn get_bucket_info(&self, bucket: &str) -> Result<BucketInfo, ClientError> {
        self.calls.lock().unwrap().push(format!("info:{bucket}"));
        self.info.clone().ok_or_else(|| cloud_error("NoSuchBucket"))
    }

    async fn put_bucket(&self, bucket: &str, request: &PutBucketRequest) -> Result<(), ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("put:{bucket}:{}", request.acl.as_deref().unwrap_or_default()));
        Ok(())
    }

    async fn put_bucket_acl(&self, bucket: &str, acl: &str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(format!("acl:{bucket}:{acl}"));
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(format!("delete:{bucket}"));
        Ok(())
    }
}

fn bucket(acl: Option<&str>) -> Bucket {
    Bucket::new(
        "logs-archive",
        BucketSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: BucketParameters {
                acl: acl.map(str::to_string),
                ..Default::default()
            },
        },
    )
}

#[tokio::test]
async fn test_bucket_with_empty_name_is_absent() {
    let stub = StubOss::default();
    let mut mr = bucket(None);
    mr.set_external_name("");
    let obs = Engine::new(BucketLifecycle::new(Box::new(stub.clone())))
        .observe(&mut mr)
        .await
        .unwrap();
    assert!(!obs.resource_exists);
    assert!(calls(&stub.calls).is_empty());
}

#[tokio::test]
async fn test_bucket_lifecycle() {
    let stub = StubOss::default();
    let engine = Engine::new(BucketLifecycle::new(Box::new(stub.clone())));
    let mut mr = bucket(Some("public-read"));
    mr.set_external_name("logs-archive");
    assert!(!engine.observe(&mut mr).await.unwrap().resource_exists);

    engine.create(&mut mr).await.unwrap();
    assert_eq!(mr.external_name(), Some("logs-archive"));

    let present = StubOss {
        info: Some(BucketInfo {
            name: "logs-archive".to_string(),
            location: "oss-cn-hangzhou".to_string(),
            extranet_endpoint: "oss-cn-hangzhou.aliyuncs.com".to_string(),
            intranet_endpoint: "oss-cn-hangzhou-internal.aliyuncs.com".to_string(),
            access_control_list: AccessControlList {
                grant: "private".to_string(),
            },
            ..Default::default()
        }),
        calls: Arc::clone(&stub.calls),
    };
    let engine = Engine::new(BucketLifecycle::new(Box::new(present)));
    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(!obs.resource_up_to_date);
    assert_eq!(
        detail(&obs.connection_details, "extranetEndpoint").as_deref(),
        Some("oss-cn-hangzhou.aliyuncs.com")
    );
    assert_eq!(mr.at_provider().acl, "private");

    engine.update(&mut mr).await.unwrap();
    assert_eq!(
        calls(&stub.calls),
        vec![
            "info:logs-archive",
            "put:logs-archive:public-read",
            "info:logs-archive",
            "info:logs-archive",
            "acl:logs-archive:public-read"
        ]
    );
}

// NAS

#[derive(Clone, Default)]
struct StubNas {
    mount_target: Option<MountTarget>,
    calls: Calls,
}

#[async_trait]
impl NasApi for StubNas {
    async fn describe_file_system(&self, id: &str) -> Result<FileSystem, ClientError> {
        self.calls.lock().unwrap().push(format!("describe_fs:{id}"));
        Err(cloud_error("InvalidFileSystem.NotFound"))
    }

    async fn create_file_system(&self, _request: &CreateFileSystemRequest) -> Result<String, ClientError> {
        Ok("0a1b2c3d".to_string())
    }

    async fn delete_file_system(&self, id: &str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(format!("delete_fs:{id}"));
        Ok(())
    }

    async fn describe_mount_target(&self, file_system_id: &str, domain: &str) -> Result<MountTarget, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("describe_mt:{file_system_id}:{domain}"));
        self.mount_target
            .clone()
            .ok_or_else(|| cloud_error("InvalidMountTarget.NotFound"))
    }

    async fn create_mount_target(&self, request: &CreateMountTargetRequest) -> Result<String, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create_mt:{}", request.file_system_id));
        Ok("0a1b2c3d-abc12.cn-hangzhou.nas.aliyuncs.com".to_string())
    }

    async fn delete_mount_target(&self, file_system_id: &str, domain: &str) -> Result<(), ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete_mt:{file_system_id}:{domain}"));
        Ok(())
    }
}

fn mount_target() -> NASMountTarget {
    NASMountTarget::new(
        "share",
        NASMountTargetSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: NASMountTargetParameters {
                file_system_id: "0a1b2c3d".to_string(),
                network_type: Some("Vpc".to_string()),
                ..Default::default()
            },
        },
    )
}

#[tokio::test]
async fn test_mount_target_uses_composite_external_name() {
    let stub = StubNas {
        mount_target: Some(MountTarget {
            mount_target_domain: "0a1b2c3d-abc12.cn-hangzhou.nas.aliyuncs.com".to_string(),
            status: "Active".to_string(),
            network_type: "Vpc".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let engine = Engine::new(MountTargetLifecycle::new(Box::new(stub.clone())));
    let mut mr = mount_target();

    let creation = engine.create(&mut mr).await.unwrap();
    assert_eq!(
        mr.external_name(),
        Some("0a1b2c3d-0a1b2c3d-abc12.cn-hangzhou.nas.aliyuncs.com")
    );
    assert_eq!(
        detail(&creation.connection_details, "mountTargetDomain").as_deref(),
        Some("0a1b2c3d-abc12.cn-hangzhou.nas.aliyuncs.com")
    );

    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists && obs.resource_up_to_date);
    assert_eq!(mr.at_provider().file_system_id, "0a1b2c3d");

    engine.delete(&mut mr).await.unwrap();
    assert_eq!(
        calls(&stub.calls),
        vec![
            "create_mt:0a1b2c3d",
            "describe_mt:0a1b2c3d:0a1b2c3d-abc12.cn-hangzhou.nas.aliyuncs.com",
            "delete_mt:0a1b2c3d:0a1b2c3d-abc12.cn-hangzhou.nas.aliyuncs.com"
        ]
    );
}

#[tokio::test]
async fn test_malformed_mount_target_name_fails() {
    let stub = StubNas::default();
    let engine = Engine::new(MountTargetLifecycle::new(Box::new(stub.clone())));
    let mut mr = mount_target();
    mr.set_external_name("nodomain");

    let err = engine.observe(&mut mr).await.unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::ObserveFailed {
            source: ClientError::InvalidConfig(_),
            ..
        }
    ));
    assert_eq!(engine.delete(&mut mr).await.unwrap_err().reason(), "delete");
    assert!(calls(&stub.calls).is_empty());
}

#[tokio::test]
async fn test_mount_target_on_extreme_file_system_is_found() {
    let stub = StubNas {
        mount_target: Some(MountTarget {
            mount_target_domain: "extreme-00b88955-xyz12.cn-hangzhou.extreme.nas.aliyuncs.com".to_string(),
            status: "Active".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let engine = Engine::new(MountTargetLifecycle::new(Box::new(stub.clone())));
    let mut mr = mount_target();
    mr.spec.for_provider.file_system_id = "extreme-00b88955".to_string();
    mr.set_external_name("extreme-00b88955-extreme-00b88955-xyz12.cn-hangzhou.extreme.nas.aliyuncs.com");

    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists);
    assert_eq!(mr.at_provider().file_system_id, "extreme-00b88955");
    assert_eq!(
        calls(&stub.calls),
        vec!["describe_mt:extreme-00b88955:extreme-00b88955-xyz12.cn-hangzhou.extreme.nas.aliyuncs.com"]
    );
}

// Redis

#[derive(Clone, Default)]
struct StubRedis {
    instance: Option<KvInstance>,
    connection_error: Option<&'static str>,
    delete_error: Option<&'static str>,
    calls: Calls,
}

impl StubRedis {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RedisApi for StubRedis {
    async fn describe_instance(&self, id: &str) -> Result<KvInstance, ClientError> {
        self.record(format!("describe:{id}"));
        self.instance
            .clone()
            .ok_or_else(|| cloud_error(kvstore::ERR_INSTANCE_NOT_FOUND))
    }

    async fn create_instance(&self, request: &CreateInstanceRequest) -> Result<CreatedInstance, ClientError> {
        self.record(format!("create:{}:{}", request.instance_type, request.instance_class));
        Ok(CreatedInstance {
            instance_id: "r-bp1cache".to_string(),
            connection_domain: "r-bp1cache.redis.rds.aliyuncs.com".to_string(),
            port: 6379,
        })
    }

    async fn delete_instance(&self, id: &str) -> Result<(), ClientError> {
        self.record(format!("delete:{id}"));
        self.delete_error.map_or(Ok(()), |code| Err(cloud_error(code)))
    }

    async fn create_account(&self, id: &str, username: &str, password: &str) -> Result<(), ClientError> {
        assert!(!password.is_empty());
        self.record(format!("create_account:{id}:{username}"));
        Ok(())
    }

    async fn modify_security_ips(&self, id: &str, security_ips: &str) -> Result<(), ClientError> {
        self.record(format!("modify_security_ips:{id}:{security_ips}"));
        Ok(())
    }

    async fn allocate_public_connection(&self, id: &str, prefix: &str, _port: Option<&str>) -> Result<(), ClientError> {
        self.record(format!("allocate_public_connection:{id}:{prefix}"));
        self.connection_error.map_or(Ok(()), |code| Err(cloud_error(code)))
    }

    async fn modify_instance_spec(&self, id: &str, instance_class: &str) -> Result<(), ClientError> {
        self.record(format!("modify:{id}:{instance_class}"));
        Ok(())
    }
}

fn redis_engine(stub: &StubRedis) -> Engine<RedisLifecycle> {
    Engine::new(RedisLifecycle::new(Box::new(stub.clone())))
}

fn redis_instance() -> RedisInstance {
    let mr = RedisInstance::new(
        "cache",
        RedisInstanceSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: RedisInstanceParameters {
                instance_type: "Redis".to_string(),
                engine_version: "5.0".to_string(),
                instance_class: "redis.master.small.default".to_string(),
                security_ip_list: "10.0.0.0/8".to_string(),
                master_username: "admin".to_string(),
                public_connection: Some(PublicConnection {
                    connection_string_prefix: "cache-public".to_string(),
                    port: None,
                }),
                ..Default::default()
            },
        },
    );
    common::with_uid(mr, "7b9e0c1d-0000-4000-8000-000000000002")
}

fn normal_redis() -> KvInstance {
    KvInstance {
        instance_id: "r-bp1cache".to_string(),
        instance_status: "Normal".to_string(),
        instance_class: "redis.master.small.default".to_string(),
        engine_version: "5.0".to_string(),
        connection_domain: "r-bp1cache.redis.rds.aliyuncs.com".to_string(),
        port: 6379,
    }
}

#[tokio::test]
async fn test_redis_bootstrap_whitelist_account_then_public_connection() {
    let stub = StubRedis {
        instance: Some(normal_redis()),
        connection_error: Some("NetTypeExists"),
        ..Default::default()
    };
    let engine = redis_engine(&stub);
    let mut mr = redis_instance();
    mr.set_external_name("r-bp1cache");

    let first = engine.observe(&mut mr).await.unwrap();
    assert!(first.resource_exists);
    assert_eq!(detail(&first.connection_details, "username").as_deref(), Some("admin"));
    assert_eq!(
        detail(&first.connection_details, "endpoint").as_deref(),
        Some("r-bp1cache.redis.rds.aliyuncs.com")
    );
    assert_eq!(detail(&first.connection_details, "port").as_deref(), Some("6379"));
    assert!(detail(&first.connection_details, "password").is_some_and(|p| !p.is_empty()));
    assert!(mr.at_provider().account_ready);
    assert!(!mr.at_provider().connection_ready);
    let ready = conditions::find(mr.conditions(), TYPE_READY).unwrap();
    assert_eq!(ready.status, "True");

    let second = engine.observe(&mut mr).await.unwrap();
    assert!(!second.connection_details.contains_key("password"));
    assert!(mr.at_provider().connection_ready, "NetTypeExists means the connection is there");

    engine.observe(&mut mr).await.unwrap();
    assert_eq!(
        calls(&stub.calls),
        vec![
            "describe:r-bp1cache",
            "modify_security_ips:r-bp1cache:10.0.0.0/8",
            "create_account:r-bp1cache:admin",
            "describe:r-bp1cache",
            "allocate_public_connection:r-bp1cache:cache-public",
            "describe:r-bp1cache"
        ]
    );
}

#[tokio::test]
async fn test_redis_not_found_and_missing_external_name() {
    let stub = StubRedis::default();
    let engine = redis_engine(&stub);
    let mut mr = redis_instance();

    assert_eq!(engine.observe(&mut mr).await.unwrap(), ExternalObservation::absent());
    engine.delete(&mut mr).await.unwrap();
    assert!(calls(&stub.calls).is_empty());

    mr.set_external_name("r-bp1cache");
    assert!(!engine.observe(&mut mr).await.unwrap().resource_exists);

    let gone = StubRedis {
        delete_error: Some(kvstore::ERR_INSTANCE_NOT_FOUND),
        ..Default::default()
    };
    redis_engine(&gone).delete(&mut mr).await.unwrap();
    assert_eq!(calls(&stub.calls), vec!["describe:r-bp1cache"]);
    assert_eq!(calls(&gone.calls), vec!["delete:r-bp1cache"]);
}

#[tokio::test]
async fn test_redis_create_and_class_drift() {
    let stub = StubRedis {
        instance: Some(normal_redis()),
        ..Default::default()
    };
    let engine = redis_engine(&stub);
    let mut mr = redis_instance();

    let creation = engine.create(&mut mr).await.unwrap();
    assert_eq!(mr.external_name(), Some("r-bp1cache"));
    assert_eq!(detail(&creation.connection_details, "port").as_deref(), Some("6379"));

    mr.managed_status_mut().at_provider.account_ready = true;
    mr.managed_status_mut().at_provider.connection_ready = true;
    mr.spec.for_provider.instance_class = "redis.master.mid.default".to_string();
    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(!obs.resource_up_to_date);
    engine.update(&mut mr).await.unwrap();
    assert_eq!(
        calls(&stub.calls),
        vec![
            "create:Redis:redis.master.small.default",
            "describe:r-bp1cache",
            "describe:r-bp1cache",
            "modify:r-bp1cache:redis.master.mid.default"
        ]
    );
}

#[tokio::test]
async fn test_redis_deleting_instance_skips_bootstrap() {
    let stub = StubRedis {
        instance: Some(normal_redis()),
        ..Default::default()
    };
    let mut mr = redis_instance();
    mr.set_external_name("r-bp1cache");
    common::mark_deleted(&mut mr);

    let obs = redis_engine(&stub).observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists);
    assert!(!obs.connection_details.contains_key("password"));
    assert_eq!(calls(&stub.calls), vec!["describe:r-bp1cache"]);
}

// Log Service

#[derive(Clone, Default)]
struct StubSls {
    project: Option<LogProject>,
    logstore: Option<LogStore>,
    index: Option<Index>,
    group: Option<sls::MachineGroup>,
    config: Option<LogtailConfig>,
    calls: Calls,
}

impl StubSls {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn found<T: Clone>(value: Option<&T>, code: &str) -> Result<T, ClientError> {
        value.cloned().ok_or_else(|| cloud_error(code))
    }

    fn removed<T>(value: Option<&T>, code: &str) -> Result<(), ClientError> {
        value.map(|_| ()).ok_or_else(|| cloud_error(code))
    }
}

#[async_trait]
impl SlsApi for StubSls {
    async fn get_project(&self, project: &str) -> Result<LogProject, ClientError> {
        self.record(format!("get_project:{project}"));
        Self::found(self.project.as_ref(), sls::ERR_PROJECT_NOT_EXIST)
    }

    async fn create_project(&self, project: &str, description: &str) -> Result<(), ClientError> {
        self.record(format!("create_project:{project}:{description}"));
        Ok(())
    }

    async fn update_project(&self, project: &str, description: &str) -> Result<(), ClientError> {
        self.record(format!("update_project:{project}:{description}"));
        Ok(())
    }

    async fn delete_project(&self, project: &str) -> Result<(), ClientError> {
        self.record(format!("delete_project:{project}"));
        Self::removed(self.project.as_ref(), sls::ERR_PROJECT_NOT_EXIST)
    }

    async fn get_logstore(&self, project: &str, logstore: &str) -> Result<LogStore, ClientError> {
        self.record(format!("get_logstore:{project}:{logstore}"));
        Self::found(self.logstore.as_ref(), sls::ERR_LOGSTORE_NOT_EXIST)
    }

    async fn create_logstore(&self, project: &str, logstore: &LogStore) -> Result<(), ClientError> {
        self.record(format!("create_logstore:{project}:{}", logstore.logstore_name));
        Ok(())
    }

    async fn update_logstore(&self, project: &str, logstore: &LogStore) -> Result<(), ClientError> {
        self.record(format!(
            "update_logstore:{project}:{}:{}:{}",
            logstore.logstore_name, logstore.ttl, logstore.shard_count
        ));
        Ok(())
    }

    async fn delete_logstore(&self, project: &str, logstore: &str) -> Result<(), ClientError> {
        self.record(format!("delete_logstore:{project}:{logstore}"));
        Self::removed(self.logstore.as_ref(), sls::ERR_LOGSTORE_NOT_EXIST)
    }

    async fn get_index(&self, project: &str, logstore: &str) -> Result<Index, ClientError> {
        self.record(format!("get_index:{project}:{logstore}"));
        Self::found(self.index.as_ref(), sls::ERR_INDEX_CONFIG_NOT_EXIST)
    }

    async fn create_index(&self, project: &str, logstore: &str, _index: &Index) -> Result<(), ClientError> {
        self.record(format!("create_index:{project}:{logstore}"));
        Ok(())
    }

    async fn delete_index(&self, project: &str, logstore: &str) -> Result<(), ClientError> {
        self.record(format!("delete_index:{project}:{logstore}"));
        Self::removed(self.index.as_ref(), sls::ERR_INDEX_CONFIG_NOT_EXIST)
    }

    async fn get_machine_group(&self, project: &str, group: &str) -> Result<sls::MachineGroup, ClientError> {
        self.record(format!("get_machine_group:{project}:{group}"));
        Self::found(self.group.as_ref(), sls::ERR_MACHINE_GROUP_NOT_EXIST)
    }

    async fn create_machine_group(&self, project: &str, group: &sls::MachineGroup) -> Result<(), ClientError> {
        self.record(format!("create_machine_group:{project}:{}", group.group_name));
        Ok(())
    }

    async fn delete_machine_group(&self, project: &str, group: &str) -> Result<(), ClientError> {
        self.record(format!("delete_machine_group:{project}:{group}"));
        Self::removed(self.group.as_ref(), sls::ERR_MACHINE_GROUP_NOT_EXIST)
    }

    async fn get_config(&self, project: &str, config: &str) -> Result<LogtailConfig, ClientError> {
        self.record(format!("get_config:{project}:{config}"));
        Self::found(self.config.as_ref(), sls::ERR_CONFIG_NOT_EXIST)
    }

    async fn create_config(&self, project: &str, config: &LogtailConfig) -> Result<(), ClientError> {
        self.record(format!("create_config:{project}:{}", config.config_name));
        Ok(())
    }

    async fn delete_config(&self, project: &str, config: &str) -> Result<(), ClientError> {
        self.record(format!("delete_config:{project}:{config}"));
        Self::removed(self.config.as_ref(), sls::ERR_CONFIG_NOT_EXIST)
    }
}

fn project() -> Project {
    Project::new(
        "audit",
        ProjectSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: ProjectParameters {
                description: "audit logs".to_string(),
            },
        },
    )
}

fn store() -> Store {
    Store::new(
        "events",
        StoreSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: StoreParameters {
                project_name: "audit".to_string(),
                ttl: 30,
                shard_count: 2,
                ..Default::default()
            },
        },
    )
}

fn store_index() -> StoreIndex {
    StoreIndex::new(
        "events-index",
        StoreIndexSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: StoreIndexParameters {
                project_name: "audit".to_string(),
                logstore_name: "events".to_string(),
                line: Some(IndexLine {
                    token: vec![",".to_string(), " ".to_string()],
                    ..Default::default()
                }),
                keys: None,
            },
        },
    )
}

fn machine_group() -> MachineGroup {
    MachineGroup::new(
        "nodes",
        MachineGroupSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: MachineGroupParameters {
                project: "audit".to_string(),
                machine_id_type: "ip".to_string(),
                machine_id_list: vec!["192.168.1.10".to_string()],
                attribute: None,
            },
        },
    )
}

fn logtail() -> Logtail {
    Logtail::new(
        "nginx",
        LogtailSpec {
            resource_spec: ResourceSpec::default(),
            for_provider: LogtailParameters {
                project_name: "audit".to_string(),
                input_type: "file".to_string(),
                input_detail: LogtailInputDetail {
                    log_type: "common_reg_log".to_string(),
                    log_path: "/var/log/nginx".to_string(),
                    file_pattern: "access.log".to_string(),
                    ..Default::default()
                },
                output_detail: LogtailOutputDetail {
                    logstore_name: "events".to_string(),
                },
                log_sample: None,
            },
        },
    )
}

/// Observe and delete an object whose cloud resource is missing
async fn observe_and_delete_missing<L: Lifecycle>(engine: &Engine<L>, mr: &mut L::Resource) {
    assert_eq!(engine.observe(mr).await.unwrap(), ExternalObservation::absent());
    engine.delete(mr).await.unwrap();
}

#[tokio::test]
async fn test_sls_kinds_without_external_name_make_no_call() {
    let stub = StubSls::default();

    observe_and_delete_missing(&Engine::new(ProjectLifecycle::new(Box::new(stub.clone()))), &mut project()).await;
    observe_and_delete_missing(&Engine::new(StoreLifecycle::new(Box::new(stub.clone()))), &mut store()).await;
    observe_and_delete_missing(&Engine::new(StoreIndexLifecycle::new(Box::new(stub.clone()))), &mut store_index())
        .await;
    observe_and_delete_missing(
        &Engine::new(MachineGroupLifecycle::new(Box::new(stub.clone()))),
        &mut machine_group(),
    )
    .await;
    observe_and_delete_missing(&Engine::new(LogtailLifecycle::new(Box::new(stub.clone()))), &mut logtail()).await;

    assert!(calls(&stub.calls).is_empty());
}

#[tokio::test]
async fn test_sls_not_exist_codes_mean_absent() {
    let stub = StubSls::default();

    let mut mr = project();
    mr.set_external_name("audit");
    observe_and_delete_missing(&Engine::new(ProjectLifecycle::new(Box::new(stub.clone()))), &mut mr).await;

    let mut mr = store();
    mr.set_external_name("events");
    observe_and_delete_missing(&Engine::new(StoreLifecycle::new(Box::new(stub.clone()))), &mut mr).await;

    let mut mr = store_index();
    mr.set_external_name("events-index");
    observe_and_delete_missing(&Engine::new(StoreIndexLifecycle::new(Box::new(stub.clone()))), &mut mr).await;

    let mut mr = machine_group();
    mr.set_external_name("nodes");
    observe_and_delete_missing(&Engine::new(MachineGroupLifecycle::new(Box::new(stub.clone()))), &mut mr).await;

    let mut mr = logtail();
    mr.set_external_name("nginx");
    observe_and_delete_missing(&Engine::new(LogtailLifecycle::new(Box::new(stub.clone()))), &mut mr).await;

    assert_eq!(
        calls(&stub.calls),
        vec![
            "get_project:audit",
            "delete_project:audit",
            "get_logstore:audit:events",
            "delete_logstore:audit:events",
            "get_index:audit:events",
            "delete_index:audit:events",
            "get_machine_group:audit:nodes",
            "delete_machine_group:audit:nodes",
            "get_config:audit:nginx",
            "delete_config:audit:nginx"
        ]
    );
}

#[tokio::test]
async fn test_sls_other_errors_fail_observe() {
    struct Throttled;

    #[async_trait]
    impl SlsApi for Throttled {
        async fn get_project(&self, _: &str) -> Result<LogProject, ClientError> {
            Err(cloud_error("WriteQuotaExceed"))
        }
        async fn create_project(&self, _: &str, _: &str) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn update_project(&self, _: &str, _: &str) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn delete_project(&self, _: &str) -> Result<(), ClientError> {
            Err(cloud_error("WriteQuotaExceed"))
        }
        async fn get_logstore(&self, _: &str, _: &str) -> Result<LogStore, ClientError> {
            unreachable!()
        }
        async fn create_logstore(&self, _: &str, _: &LogStore) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn update_logstore(&self, _: &str, _: &LogStore) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn delete_logstore(&self, _: &str, _: &str) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn get_index(&self, _: &str, _: &str) -> Result<Index, ClientError> {
            unreachable!()
        }
        async fn create_index(&self, _: &str, _: &str, _: &Index) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn delete_index(&self, _: &str, _: &str) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn get_machine_group(&self, _: &str, _: &str) -> Result<sls::MachineGroup, ClientError> {
            unreachable!()
        }
        async fn create_machine_group(&self, _: &str, _: &sls::MachineGroup) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn delete_machine_group(&self, _: &str, _: &str) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn get_config(&self, _: &str, _: &str) -> Result<LogtailConfig, ClientError> {
            unreachable!()
        }
        async fn create_config(&self, _: &str, _: &LogtailConfig) -> Result<(), ClientError> {
            unreachable!()
        }
        async fn delete_config(&self, _: &str, _: &str) -> Result<(), ClientError> {
            unreachable!()
        }
    }

    let engine = Engine::new(ProjectLifecycle::new(Box::new(Throttled)));
    let mut mr = project();
    mr.set_external_name("audit");
    let err = engine.observe(&mut mr).await.unwrap_err();
    assert!(matches!(err, ReconcileError::ObserveFailed { kind: "Project", .. }));
    assert_eq!(engine.delete(&mut mr).await.unwrap_err().reason(), "delete");
}

#[tokio::test]
async fn test_project_description_drift_is_updated() {
    let stub = StubSls {
        project: Some(LogProject {
            project_name: "audit".to_string(),
            status: "Normal".to_string(),
            description: "old".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let engine = Engine::new(ProjectLifecycle::new(Box::new(stub.clone())));
    let mut mr = project();
    mr.set_external_name("audit");

    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists);
    assert!(!obs.resource_up_to_date);
    assert_eq!(mr.at_provider().status, "Normal");
    let ready = conditions::find(mr.conditions(), TYPE_READY).unwrap();
    assert_eq!(ready.status, "True");

    engine.update(&mut mr).await.unwrap();
    assert_eq!(
        calls(&stub.calls),
        vec!["get_project:audit", "get_project:audit", "update_project:audit:audit logs"]
    );
}

#[tokio::test]
async fn test_store_update_keeps_remote_shard_count() {
    let stub = StubSls {
        logstore: Some(LogStore {
            logstore_name: "events".to_string(),
            ttl: 7,
            shard_count: 4,
            ..Default::default()
        }),
        ..Default::default()
    };
    let engine = Engine::new(StoreLifecycle::new(Box::new(stub.clone())));
    let mut mr = store();
    mr.set_external_name("events");

    assert!(!engine.observe(&mut mr).await.unwrap().resource_up_to_date);
    engine.update(&mut mr).await.unwrap();
    assert_eq!(calls(&stub.calls).last().map(String::as_str), Some("update_logstore:audit:events:30:4"));
}

#[tokio::test]
async fn test_store_index_drift_cannot_be_updated() {
    let stub = StubSls {
        index: Some(Index {
            line: Some(sls::IndexLine {
                token: vec![",".to_string(), " ".to_string()],
                ..Default::default()
            }),
            keys: None,
        }),
        ..Default::default()
    };
    let engine = Engine::new(StoreIndexLifecycle::new(Box::new(stub.clone())));
    let mut mr = store_index();
    mr.set_external_name("events-index");

    let obs = engine.observe(&mut mr).await.unwrap();
    assert!(obs.resource_exists && obs.resource_up_to_date);
    assert_eq!(mr.at_provider().logstore_name, "events");

    mr.spec.for_provider.line = Some(IndexLine {
        token: vec![";".to_string()],
        ..Default::default()
    });
    assert!(!engine.observe(&mut mr).await.unwrap().resource_up_to_date);
    let err = engine.update(&mut mr).await.unwrap_err();
    assert!(matches!(err, ReconcileError::NotSupported("StoreIndex")));
}

#[tokio::test]
async fn test_machine_group_and_logtail_create_by_name() {
    let stub = StubSls::default();

    let mut group = machine_group();
    group.set_external_name("nodes");
    Engine::new(MachineGroupLifecycle::new(Box::new(stub.clone())))
        .create(&mut group)
        .await
        .unwrap();

    let mut config = logtail();
    config.set_external_name("nginx");
    Engine::new(LogtailLifecycle::new(Box::new(stub.clone())))
        .create(&mut config)
        .await
        .unwrap();

    assert_eq!(group.external_name(), Some("nodes"));
    assert_eq!(config.external_name(), Some("nginx"));
    assert_eq!(
        calls(&stub.calls),
        vec!["create_machine_group:audit:nodes", "create_config:audit:nginx"]
    );
}
