//! Metrics for user command and query handlers.

use metrics::{counter, histogram};
use std::time::Duration;

/// User handler metrics recorder
pub struct UserMetrics;

impl UserMetrics {
    /// Record a handled command. `outcome` is `ok` or an error kind.
    pub fn record_command(command: &'static str, outcome: &'static str, elapsed: Duration) {
        counter!("users_commands_total", "command" => command, "outcome" => outcome).increment(1);
        histogram!("users_handler_duration_seconds", "handler" => command)
            .record(elapsed.as_secs_f64());
    }

    /// Record a handled query. `outcome` is `ok` or an error kind.
    pub fn record_query(query: &'static str, outcome: &'static str, elapsed: Duration) {
        counter!("users_queries_total", "query" => query, "outcome" => outcome).increment(1);
        histogram!("users_handler_duration_seconds", "handler" => query)
            .record(elapsed.as_secs_f64());
    }

    /// Record a storage transaction re-run after a transient abort.
    pub fn record_transaction_retry(engine: &'static str) {
        counter!("users_transaction_retries_total", "engine" => engine).increment(1);
    }
}
