//! # Connector
//!
//! Connect step shared by every kind: record ProviderConfig usage, resolve
//! credentials and region, then let the lifecycle build its cloud client.
//! A fresh client is built on every pass.

use super::engine::{ClientSettings, Engine, Lifecycle};
use super::managed::{ExternalClient, ExternalConnector};
use super::usage::{usage_for, UsageTracker};
use super::ReconcileError;
use crate::crd::Managed;
use crate::provider::CredentialResolver;
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

/// [`ExternalConnector`] producing an [`Engine`] over `L`
pub struct Connector<L> {
    resolver: CredentialResolver,
    usage: Arc<dyn UsageTracker>,
    settings: ClientSettings,
    _lifecycle: PhantomData<fn() -> L>,
}

impl<L: Lifecycle> std::fmt::Debug for Connector<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("kind", &L::KIND)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<L: Lifecycle> Connector<L> {
    pub fn new(resolver: CredentialResolver, usage: Arc<dyn UsageTracker>, settings: ClientSettings) -> Self {
        Self {
            resolver,
            usage,
            settings,
            _lifecycle: PhantomData,
        }
    }
}

#[async_trait]
impl<L: Lifecycle> ExternalConnector<L::Resource> for Connector<L> {
    async fn connect(&self, mr: &L::Resource) -> Result<Box<dyn ExternalClient<L::Resource>>, ReconcileError> {
        self.usage.track(usage_for(mr)?).await?;
        let config = self.resolver.resolve(mr.provider_config_name()).await?;
        let lifecycle = L::build(&config, self.settings)?;
        Ok(Box::new(Engine::new(lifecycle)))
    }
}
