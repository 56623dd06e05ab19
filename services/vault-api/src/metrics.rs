//! Service metrics.
//!
//! # Metrics
//!
//! - `vault_operation_duration_seconds` - Histogram of handler latency by operation and result
//! - `vault_webhooks_processed_total` - Counter of webhooks by outcome
//! - `vault_entitlement_denials_total` - Counter of denied checks by capability
//! - `vault_quota_rejections_total` - Counter of vault creates refused for quota

use std::time::Instant;

use metrics::histogram;

pub use passvault_billing_core::webhook::WEBHOOKS_PROCESSED_TOTAL;
pub use passvault_core::gate::ENTITLEMENT_DENIALS_TOTAL;

/// Metric name for operation latency.
pub const OPERATION_DURATION_SECONDS: &str = "vault_operation_duration_seconds";

/// Metric name for quota rejections.
pub const QUOTA_REJECTIONS_TOTAL: &str = "vault_quota_rejections_total";

/// Latency buckets; most operations are a single indexed query.
pub const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5];

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    metrics::describe_histogram!(
        OPERATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Vault API operation latency by operation and result"
    );
    metrics::describe_counter!(
        WEBHOOKS_PROCESSED_TOTAL,
        "Total PayHere notifications processed by outcome"
    );
    metrics::describe_counter!(
        ENTITLEMENT_DENIALS_TOTAL,
        "Total denied entitlement checks by capability"
    );
    metrics::describe_counter!(
        QUOTA_REJECTIONS_TOTAL,
        "Total vault item creates refused by quota"
    );
}

/// Record how long an operation took.
pub fn record_op_duration<T, E>(operation: &'static str, start: Instant, result: &Result<T, E>) {
    let result = if result.is_ok() { "ok" } else { "error" };
    histogram!(OPERATION_DURATION_SECONDS, "operation" => operation, "result" => result)
        .record(start.elapsed().as_secs_f64());
}
