//! # Metrics
//!
//! Prometheus metrics for monitoring the provider.
//!
//! ## Metrics Exposed
//!
//! - `alibaba_provider_reconciliations_total{kind}` - Reconciliation passes per kind
//! - `alibaba_provider_reconciliation_errors_total{kind}` - Failed passes per kind
//! - `alibaba_provider_reconciliation_duration_seconds{kind}` - Pass duration per kind
//! - `alibaba_provider_cloud_operations_total{service,operation}` - Cloud API calls
//! - `alibaba_provider_cloud_operation_errors_total{service,operation}` - Failed cloud API calls
//! - `alibaba_provider_cloud_operation_duration_seconds{service}` - Cloud API call latency
//! - `alibaba_provider_requeues_total{reason}` - Requeues by reason

use anyhow::Result;
use prometheus::{HistogramVec, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "alibaba_provider_reconciliations_total",
            "Total number of reconciliations by managed resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "alibaba_provider_reconciliation_errors_total",
            "Total number of reconciliation errors by managed resource kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "alibaba_provider_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds by managed resource kind",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["kind"],
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static CLOUD_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "alibaba_provider_cloud_operations_total",
            "Total number of Alibaba Cloud API calls by service and operation",
        ),
        &["service", "operation"],
    )
    .expect("Failed to create CLOUD_OPERATIONS_TOTAL metric - this should never happen")
});

static CLOUD_OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "alibaba_provider_cloud_operation_errors_total",
            "Total number of failed Alibaba Cloud API calls by service and operation",
        ),
        &["service", "operation"],
    )
    .expect("Failed to create CLOUD_OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static CLOUD_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "alibaba_provider_cloud_operation_duration_seconds",
            "Duration of Alibaba Cloud API calls in seconds by service",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["service"],
    )
    .expect("Failed to create CLOUD_OPERATION_DURATION metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "alibaba_provider_requeues_total",
            "Total number of requeues by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(CLOUD_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CLOUD_OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CLOUD_OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_reconciliations(kind: &str) {
    RECONCILIATIONS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_reconciliation_errors(kind: &str) {
    RECONCILIATION_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn observe_reconciliation_duration(kind: &str, duration: f64) {
    RECONCILIATION_DURATION
        .with_label_values(&[kind])
        .observe(duration);
}

/// Record one completed cloud API call
pub fn record_cloud_operation(service: &str, operation: &str, duration: f64) {
    CLOUD_OPERATIONS_TOTAL
        .with_label_values(&[service, operation])
        .inc();
    CLOUD_OPERATION_DURATION
        .with_label_values(&[service])
        .observe(duration);
}

pub fn increment_cloud_operation_errors(service: &str, operation: &str) {
    CLOUD_OPERATION_ERRORS_TOTAL
        .with_label_values(&[service, operation])
        .inc();
}

pub fn increment_requeues(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}
