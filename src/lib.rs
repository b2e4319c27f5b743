//! Alibaba Cloud Provider Library
//!
//! Kubernetes controllers that reconcile Alibaba Cloud resources from
//! cluster-scoped custom resources. Tests are included in the module files
//! and under `tests/`.
//!
//! ## Quick Start
//!
//! ```rust
//! use alibaba_provider::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod clients;
pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
