//! # External Client Contract
//!
//! The four-step lifecycle every managed resource kind goes through:
//! Connect, then one of Observe → Create / Update / Delete per pass.

use super::ReconcileError;
use crate::crd::Managed;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Flat key/value map written to the connection Secret
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

/// Result of an Observe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalObservation {
    pub resource_exists: bool,
    pub resource_up_to_date: bool,
    pub connection_details: ConnectionDetails,
}

impl ExternalObservation {
    /// The cloud resource does not exist (yet, or anymore)
    #[must_use]
    pub fn absent() -> Self {
        Self {
            resource_exists: false,
            resource_up_to_date: true,
            connection_details: ConnectionDetails::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalCreation {
    pub connection_details: ConnectionDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalUpdate {
    pub connection_details: ConnectionDetails,
}

/// Operations against the cloud resource behind one managed resource
///
/// Implementations may update `status.atProvider`, conditions and the
/// external-name annotation of `mr`; the caller persists them.
#[async_trait]
pub trait ExternalClient<R: Managed>: Send + Sync {
    async fn observe(&self, mr: &mut R) -> Result<ExternalObservation, ReconcileError>;

    async fn create(&self, mr: &mut R) -> Result<ExternalCreation, ReconcileError>;

    async fn update(&self, mr: &mut R) -> Result<ExternalUpdate, ReconcileError>;

    async fn delete(&self, mr: &mut R) -> Result<(), ReconcileError>;
}

/// Produces an [`ExternalClient`] for a managed resource
#[async_trait]
pub trait ExternalConnector<R: Managed>: Send + Sync {
    async fn connect(&self, mr: &R) -> Result<Box<dyn ExternalClient<R>>, ReconcileError>;
}

/// Insert a string value into connection details
pub fn insert_detail(details: &mut ConnectionDetails, key: &str, value: impl AsRef<str>) {
    details.insert(key.to_string(), value.as_ref().as_bytes().to_vec());
}
