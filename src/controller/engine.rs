//! # Reconcile Engine
//!
//! One implementation of [`ExternalClient`] shared by every kind. A kind plugs
//! in through [`Lifecycle`]: how to describe, create, update and delete its
//! cloud resource, which error codes mean "not found", how remote status
//! strings map to readiness, and how the remote answer is recorded.
//!
//! The engine owns the state machine:
//!
//! - Observe: empty external ID means absent, without a cloud call. A
//!   not-found code means absent. Otherwise the observation is recorded, the
//!   `Ready` condition follows the remote status, and drift is evaluated.
//!   Drift is not reported in a pass where the post-observe hook returned
//!   details, so the pass ends with them published.
//! - Create: skipped while the last known status is a creating one.
//! - Update: depends on [`UpdatePolicy`].
//! - Delete: skipped while the last known status is a deleting one; not-found
//!   counts as deleted.

use super::conditions::{self, ReadyState, StatusMap};
use super::managed::{ConnectionDetails, ExternalClient, ExternalCreation, ExternalObservation, ExternalUpdate};
use super::ReconcileError;
use crate::clients::ClientError;
use crate::crd::Managed;
use crate::provider::ResolvedConfig;
use async_trait::async_trait;
use kube::ResourceExt;
use std::time::Duration;
use tracing::{debug, info};

/// How a kind reacts to drift between spec and cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Re-describe and call the modify APIs for drifted fields
    Modify,
    /// No mutable fields; Update succeeds without a cloud call
    Immutable,
    /// Drift cannot be corrected; Update fails with [`ReconcileError::NotSupported`]
    NotSupported,
}

/// Settings every lifecycle applies when it builds its cloud client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub timeout: Duration,
}

/// Outcome of a successful cloud create
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Created {
    /// Identifier stored in the external-name annotation
    pub external_id: String,
    pub connection_details: ConnectionDetails,
}

/// Per-kind strategy driven by [`Engine`]
#[async_trait]
pub trait Lifecycle: Sized + Send + Sync + 'static {
    type Resource: Managed;
    /// Describe answer of the cloud API
    type Remote: Send + Sync;

    const KIND: &'static str;
    const SERVICE: &'static str;
    const NOT_FOUND_CODES: &'static [&'static str];
    const STATUS: StatusMap = StatusMap::EXISTS_ONLY;
    const UPDATE_POLICY: UpdatePolicy = UpdatePolicy::Modify;
    /// The cloud name is the object name; the external name defaults to it
    const NAME_ADDRESSED: bool = false;

    /// Build the cloud client for a resolved ProviderConfig
    fn build(config: &ResolvedConfig, settings: ClientSettings) -> Result<Self, ReconcileError>;

    fn external_id(mr: &Self::Resource) -> String {
        mr.external_name().unwrap_or_default().to_string()
    }

    /// Remote status recorded by the previous Observe
    fn last_known_status(_mr: &Self::Resource) -> Option<String> {
        None
    }

    async fn describe(&self, id: &str, mr: &Self::Resource) -> Result<Self::Remote, ClientError>;

    /// Overwrite `status.atProvider` from the describe answer
    fn record(mr: &mut Self::Resource, remote: &Self::Remote);

    /// `None` for kinds whose existence implies availability
    fn remote_status(_remote: &Self::Remote) -> Option<&str> {
        None
    }

    fn is_up_to_date(mr: &Self::Resource, remote: &Self::Remote) -> bool;

    fn connection_details(_mr: &Self::Resource, _remote: &Self::Remote) -> ConnectionDetails {
        ConnectionDetails::new()
    }

    /// Runs after a successful describe; returns extra connection details
    ///
    /// Returning details defers Update to the next pass.
    async fn after_observe(
        &self,
        _mr: &mut Self::Resource,
        _remote: &Self::Remote,
    ) -> Result<ConnectionDetails, ClientError> {
        Ok(ConnectionDetails::new())
    }

    async fn create(&self, mr: &mut Self::Resource) -> Result<Created, ClientError>;

    /// Correct drift; only called under [`UpdatePolicy::Modify`]
    async fn update(&self, _mr: &Self::Resource, _remote: &Self::Remote) -> Result<(), ClientError> {
        Ok(())
    }

    async fn delete(&self, id: &str, mr: &Self::Resource) -> Result<(), ClientError>;
}

/// Generic [`ExternalClient`] over a [`Lifecycle`]
pub struct Engine<L> {
    lifecycle: L,
}

impl<L: Lifecycle> std::fmt::Debug for Engine<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("kind", &L::KIND).finish_non_exhaustive()
    }
}

impl<L: Lifecycle> Engine<L> {
    pub fn new(lifecycle: L) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }
}

#[async_trait]
impl<L: Lifecycle> ExternalClient<L::Resource> for Engine<L> {
    async fn observe(&self, mr: &mut L::Resource) -> Result<ExternalObservation, ReconcileError> {
        let id = L::external_id(mr);
        if id.is_empty() {
            return Ok(ExternalObservation::absent());
        }

        let remote = match self.lifecycle.describe(&id, mr).await {
            Ok(remote) => remote,
            Err(e) if e.has_code(L::NOT_FOUND_CODES) => {
                debug!(resource.kind = L::KIND, resource.name = %mr.name_any(), external_id = %id, "External resource not found");
                return Ok(ExternalObservation::absent());
            }
            Err(source) => return Err(ReconcileError::ObserveFailed { kind: L::KIND, source }),
        };

        L::record(mr, &remote);
        let state = L::remote_status(&remote).map_or(ReadyState::Available, |s| L::STATUS.ready_state(s));
        conditions::set_condition(&mut mr.managed_status_mut().conditions, conditions::ready(state));

        let mut connection_details = L::connection_details(mr, &remote);
        let extra = self
            .lifecycle
            .after_observe(mr, &remote)
            .await
            .map_err(|source| ReconcileError::ObserveFailed { kind: L::KIND, source })?;
        // Details from the hook may exist nowhere else; they are published
        // before a later step of the same pass can fail
        let resource_up_to_date = !extra.is_empty() || L::is_up_to_date(mr, &remote);
        connection_details.extend(extra);

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date,
            connection_details,
        })
    }

    async fn create(&self, mr: &mut L::Resource) -> Result<ExternalCreation, ReconcileError> {
        if let Some(status) = L::last_known_status(mr).filter(|s| L::STATUS.is_creating(s)) {
            debug!(resource.kind = L::KIND, resource.name = %mr.name_any(), status = %status, "Create already in progress");
            return Ok(ExternalCreation::default());
        }

        let created = self
            .lifecycle
            .create(mr)
            .await
            .map_err(|source| ReconcileError::CreateFailed { kind: L::KIND, source })?;
        info!(
            resource.kind = L::KIND,
            resource.name = %mr.name_any(),
            external_id = %created.external_id,
            "Created external resource"
        );
        mr.set_external_name(&created.external_id);
        Ok(ExternalCreation {
            connection_details: created.connection_details,
        })
    }

    async fn update(&self, mr: &mut L::Resource) -> Result<ExternalUpdate, ReconcileError> {
        match L::UPDATE_POLICY {
            UpdatePolicy::Immutable => Ok(ExternalUpdate::default()),
            UpdatePolicy::NotSupported => Err(ReconcileError::NotSupported(L::KIND)),
            UpdatePolicy::Modify => {
                let id = L::external_id(mr);
                let remote = self
                    .lifecycle
                    .describe(&id, mr)
                    .await
                    .map_err(|source| ReconcileError::UpdateFailed { kind: L::KIND, source })?;
                self.lifecycle
                    .update(mr, &remote)
                    .await
                    .map_err(|source| ReconcileError::UpdateFailed { kind: L::KIND, source })?;
                info!(resource.kind = L::KIND, resource.name = %mr.name_any(), "Updated external resource");
                Ok(ExternalUpdate::default())
            }
        }
    }

    async fn delete(&self, mr: &mut L::Resource) -> Result<(), ReconcileError> {
        if let Some(status) = L::last_known_status(mr).filter(|s| L::STATUS.is_deleting(s)) {
            debug!(resource.kind = L::KIND, resource.name = %mr.name_any(), status = %status, "Delete already in progress");
            return Ok(());
        }
        let id = L::external_id(mr);
        if id.is_empty() {
            return Ok(());
        }

        match self.lifecycle.delete(&id, mr).await {
            Ok(()) => {
                info!(resource.kind = L::KIND, resource.name = %mr.name_any(), external_id = %id, "Deleted external resource");
                Ok(())
            }
            Err(e) if e.has_code(L::NOT_FOUND_CODES) => Ok(()),
            Err(source) => Err(ReconcileError::DeleteFailed { kind: L::KIND, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::CloudError;
    use crate::crd::{Bucket, BucketObservation, BucketSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls; `describe` answers with `answer`
    struct Counting<const POLICY: u8> {
        answer: Result<String, &'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl<const POLICY: u8> Lifecycle for Counting<POLICY> {
        type Resource = Bucket;
        type Remote = String;

        const KIND: &'static str = "Bucket";
        const SERVICE: &'static str = "test";
        const NOT_FOUND_CODES: &'static [&'static str] = &["Gone"];
        const STATUS: StatusMap = StatusMap {
            available: &["up"],
            creating: &["pending"],
            deleting: &["removing"],
        };
        const UPDATE_POLICY: UpdatePolicy = match POLICY {
            0 => UpdatePolicy::Modify,
            1 => UpdatePolicy::Immutable,
            _ => UpdatePolicy::NotSupported,
        };

        fn build(_: &ResolvedConfig, _: ClientSettings) -> Result<Self, ReconcileError> {
            Ok(Self {
                answer: Ok("up".to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn last_known_status(mr: &Bucket) -> Option<String> {
            Some(mr.at_provider().location)
        }

        async fn describe(&self, _: &str, _: &Bucket) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .map_err(|code| CloudError::new(code, "x").into())
        }

        fn record(mr: &mut Bucket, remote: &String) {
            mr.managed_status_mut().at_provider.location.clone_from(remote);
        }

        fn remote_status(remote: &String) -> Option<&str> {
            Some(remote.as_str())
        }

        fn is_up_to_date(_: &Bucket, _: &String) -> bool {
            true
        }

        async fn create(&self, _: &mut Bucket) -> Result<Created, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Created {
                external_id: "made".to_string(),
                connection_details: ConnectionDetails::new(),
            })
        }

        async fn delete(&self, _: &str, _: &Bucket) -> Result<(), ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .map(|_| ())
                .map_err(|code| CloudError::new(code, "x").into())
        }
    }

    fn engine<const P: u8>(answer: Result<&str, &'static str>) -> Engine<Counting<P>> {
        Engine::new(Counting {
            answer: answer.map(str::to_string),
            calls: AtomicUsize::new(0),
        })
    }

    fn bucket(external_name: Option<&str>, last_status: &str) -> Bucket {
        let mut b = Bucket::new("b", BucketSpec {
            resource_spec: Default::default(),
            for_provider: Default::default(),
        });
        if let Some(name) = external_name {
            b.set_external_name(name);
        }
        b.managed_status_mut().at_provider = BucketObservation {
            location: last_status.to_string(),
            ..Default::default()
        };
        b
    }

    #[tokio::test]
    async fn test_observe_records_and_sets_ready() {
        let e = engine::<0>(Ok("up"));
        let mut mr = bucket(Some("b"), "");
        let obs = e.observe(&mut mr).await.unwrap();
        assert!(obs.resource_exists);
        assert!(obs.resource_up_to_date);
        assert_eq!(mr.at_provider().location, "up");
        let ready = conditions::find(mr.conditions(), conditions::TYPE_READY).unwrap();
        assert_eq!(ready.status, "True");
    }

    #[tokio::test]
    async fn test_observe_maps_not_found_to_absent() {
        let e = engine::<0>(Err("Gone"));
        let mut mr = bucket(Some("b"), "");
        assert_eq!(e.observe(&mut mr).await.unwrap(), ExternalObservation::absent());
    }

    #[tokio::test]
    async fn test_observe_wraps_other_errors() {
        let e = engine::<0>(Err("Throttling"));
        let mut mr = bucket(Some("b"), "");
        let err = e.observe(&mut mr).await.unwrap_err();
        assert!(matches!(err, ReconcileError::ObserveFailed { kind: "Bucket", .. }));
    }

    #[tokio::test]
    async fn test_create_skipped_while_creating() {
        let e = engine::<0>(Ok("up"));
        let mut mr = bucket(None, "pending");
        assert_eq!(e.create(&mut mr).await.unwrap(), ExternalCreation::default());
        assert_eq!(e.lifecycle().calls.load(Ordering::SeqCst), 0);
        assert_eq!(mr.external_name(), None);
    }

    #[tokio::test]
    async fn test_create_sets_external_name() {
        let e = engine::<0>(Ok("up"));
        let mut mr = bucket(None, "");
        e.create(&mut mr).await.unwrap();
        assert_eq!(mr.external_name(), Some("made"));
    }

    #[tokio::test]
    async fn test_update_policies() {
        let mut mr = bucket(Some("b"), "up");

        let modify = engine::<0>(Ok("up"));
        modify.update(&mut mr).await.unwrap();
        assert_eq!(modify.lifecycle().calls.load(Ordering::SeqCst), 1);

        let immutable = engine::<1>(Ok("up"));
        immutable.update(&mut mr).await.unwrap();
        assert_eq!(immutable.lifecycle().calls.load(Ordering::SeqCst), 0);

        let unsupported = engine::<2>(Ok("up"));
        let err = unsupported.update(&mut mr).await.unwrap_err();
        assert!(matches!(err, ReconcileError::NotSupported("Bucket")));
    }

    #[tokio::test]
    async fn test_delete_skipped_while_deleting() {
        let e = engine::<0>(Err("Throttling"));
        let mut mr = bucket(Some("b"), "removing");
        e.delete(&mut mr).await.unwrap();
        assert_eq!(e.lifecycle().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_absorbs_not_found() {
        let e = engine::<0>(Err("Gone"));
        let mut mr = bucket(Some("b"), "up");
        e.delete(&mut mr).await.unwrap();

        let failing = engine::<0>(Err("Throttling"));
        let err = failing.delete(&mut mr).await.unwrap_err();
        assert!(matches!(err, ReconcileError::DeleteFailed { .. }));
    }
}
