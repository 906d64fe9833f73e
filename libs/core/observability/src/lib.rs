//! Observability utilities for the user-management services.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Per-handler metrics for user commands and queries
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, render_metrics, UserMetrics};
//!
//! init_metrics()?;
//!
//! UserMetrics::record_command("ban_user", "ok", started.elapsed());
//!
//! println!("{}", render_metrics());
//! ```

pub mod users;

pub use users::UserMetrics;

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        "users_commands_total",
        "User commands handled, by command and outcome"
    );
    describe_counter!(
        "users_queries_total",
        "User queries handled, by query and outcome"
    );
    describe_histogram!(
        "users_handler_duration_seconds",
        "User command/query handler duration in seconds"
    );
    describe_counter!(
        "users_transaction_retries_total",
        "Read-modify-write transactions retried after a transient abort"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics_is_idempotent() {
        let first = init_metrics().unwrap() as *const PrometheusHandle;
        let second = init_metrics().unwrap() as *const PrometheusHandle;
        assert_eq!(first, second);

        UserMetrics::record_command("register_user", "ok", std::time::Duration::from_millis(3));
        let rendered = render_metrics();
        assert!(rendered.contains("users_commands_total"));
    }
}
