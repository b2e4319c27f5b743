//! # CRD Generator
//!
//! Prints the CustomResourceDefinitions of the provider as one multi-document
//! YAML stream: ProviderConfig, ProviderConfigUsage, then every managed kind.
//!
//! ## Usage
//!
//! ```bash
//! # Generate CRD YAML
//! cargo run --bin crdgen > package/crds.yaml
//!
//! # Generate and apply directly
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use alibaba_provider::controller::registry::KindRegistry;
use alibaba_provider::crd::{ProviderConfig, ProviderConfigUsage};
use anyhow::{Context, Result};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::CustomResourceExt;

fn main() -> Result<()> {
    let mut crds: Vec<CustomResourceDefinition> = vec![ProviderConfig::crd(), ProviderConfigUsage::crd()];
    crds.extend(KindRegistry::builtin().iter().map(|k| (k.crd)()));

    for crd in &crds {
        let name = crd.metadata.name.as_deref().unwrap_or_default();
        let yaml = serde_yaml::to_string(crd).with_context(|| format!("Failed to serialize CRD {name}"))?;
        println!("---");
        print!("{yaml}");
    }
    Ok(())
}
