//! Common test utilities for the integration tests
//!
//! Provides rustls setup, credentials and metadata helpers shared by every
//! test binary.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use alibaba_provider::crd::Managed;
use alibaba_provider::provider::Credentials;
use std::sync::Once;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` so it runs a single time per test binary.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        // Required for rustls 0.23+ when no default provider is set via features
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

pub fn credentials() -> Credentials {
    Credentials {
        access_key_id: "LTAI-test".to_string(),
        access_key_secret: "test-secret".to_string(),
        security_token: None,
    }
}

/// Give a managed resource the UID the API server would assign
pub fn with_uid<R: Managed>(mut mr: R, uid: &str) -> R {
    mr.meta_mut().uid = Some(uid.to_string());
    mr
}

/// Mark a managed resource as being deleted
pub fn mark_deleted<R: Managed>(mr: &mut R) {
    mr.meta_mut().deletion_timestamp =
        serde_json::from_value(serde_json::json!("2026-01-01T00:00:00Z")).expect("valid timestamp");
}
