//! # Provider Configuration
//!
//! Turns a ProviderConfig name into credentials and a region, and a resource
//! kind plus region into the Alibaba Cloud endpoint to call.

pub mod credentials;
pub mod endpoint;

pub use credentials::{
    ConfigStore, CredentialError, CredentialResolver, Credentials, KubeConfigStore,
    ResolvedConfig, StoreError,
};
pub use endpoint::{endpoint_for, EndpointError, ResourceKind};
