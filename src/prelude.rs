//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use alibaba_provider::prelude::*;
//! ```
//!
//! This brings into scope:
//! - All CRD types (RDSInstance, Bucket, ProviderConfig, etc.)
//! - The external client contract and the generic engine
//! - The reconcile function and its context
//! - The kind registry
//! - Config and error types

// CRD types - most commonly used
pub use crate::crd::*;

// External client contract
pub use crate::controller::engine::{ClientSettings, Created, Engine, Lifecycle, UpdatePolicy};
pub use crate::controller::managed::{
    ConnectionDetails, ExternalClient, ExternalConnector, ExternalCreation, ExternalObservation, ExternalUpdate,
};

// Reconciler types - core controller functionality
pub use crate::controller::reconciler::{reconcile, run_pass, Context, Pass, PassOutcome};
pub use crate::controller::registry::{KindRegistration, KindRegistry, RegistryError};

// Config types - for configuration management
pub use crate::config::{ControllerConfig, LogFormat};

// Common error types
pub use crate::clients::{ClientError, CloudError};
pub use crate::controller::ReconcileError;
pub use crate::provider::{CredentialError, EndpointError};
