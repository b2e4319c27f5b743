//! # Reconcile Errors

use crate::clients::ClientError;
use crate::provider::{CredentialError, EndpointError};
use thiserror::Error;

/// Errors raised by a reconciliation pass
///
/// Every variant ends up as the message of the `Synced=False` condition.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("cannot track ProviderConfig usage: {0}")]
    TrackUsage(String),
    #[error("cannot get credentials: {0}")]
    Credentials(#[from] CredentialError),
    #[error("cannot resolve endpoint: {0}")]
    Endpoint(#[from] EndpointError),
    #[error("cannot create {service} client: {source}")]
    ClientConstructionFailed {
        service: &'static str,
        #[source]
        source: ClientError,
    },
    #[error("cannot observe {kind}: {source}")]
    ObserveFailed {
        kind: &'static str,
        #[source]
        source: ClientError,
    },
    #[error("cannot create {kind}: {source}")]
    CreateFailed {
        kind: &'static str,
        #[source]
        source: ClientError,
    },
    #[error("cannot update {kind}: {source}")]
    UpdateFailed {
        kind: &'static str,
        #[source]
        source: ClientError,
    },
    #[error("cannot delete {kind}: {source}")]
    DeleteFailed {
        kind: &'static str,
        #[source]
        source: ClientError,
    },
    #[error("update of {0} is not supported")]
    NotSupported(&'static str),
    #[error("managed resource has no {0}")]
    MissingMetadata(&'static str),
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl ReconcileError {
    /// Short label for metrics and logs
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TrackUsage(_) => "track-usage",
            Self::Credentials(_) => "credentials",
            Self::Endpoint(_) => "endpoint",
            Self::ClientConstructionFailed { .. } => "client",
            Self::ObserveFailed { .. } => "observe",
            Self::CreateFailed { .. } => "create",
            Self::UpdateFailed { .. } => "update",
            Self::DeleteFailed { .. } => "delete",
            Self::NotSupported(_) => "not-supported",
            Self::MissingMetadata(_) => "metadata",
            Self::Kube(_) => "kubernetes",
        }
    }
}
