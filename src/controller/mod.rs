//! # Controller
//!
//! Reconciliation of managed resources against Alibaba Cloud.
//!
//! - `managed`: the Connect / Observe / Create / Update / Delete contract
//! - `engine`: the one [`ExternalClient`](managed::ExternalClient) every kind shares
//! - `kinds`: per-kind lifecycles
//! - `connector`: credentials, usage tracking and client construction
//! - `reconciler`: the kube-facing reconcile function
//! - `provider_config`: in-use finalizer and user count of ProviderConfigs
//! - `registry`: the table of kinds the binaries run
//! - `backoff`: Fibonacci backoff for failed reconciliations
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod conditions;
pub mod connector;
pub mod engine;
pub mod error;
pub mod kinds;
pub mod managed;
pub mod password;
pub mod provider_config;
pub mod reconciler;
pub mod registry;
pub mod server;
pub mod usage;

pub use error::ReconcileError;
