//! Command/query traits and the shared outcome recording around handlers.

use async_trait::async_trait;
use std::future::Future;
use std::time::Instant;

use observability::UserMetrics;

use crate::auth::RequestContext;
use crate::error::{ErrorKind, UserResult};

pub trait Command: Send + Sync {
    type Output: Send;

    /// Stable name used in logs and metric labels.
    const NAME: &'static str;
}

#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, ctx: &RequestContext, command: C) -> UserResult<C::Output>;
}

pub trait Query: Send + Sync {
    type Output: Send;

    const NAME: &'static str;
}

#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, ctx: &RequestContext, query: Q) -> UserResult<Q::Output>;
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum HandlerKind {
    Command,
    Query,
}

/// Runs a handler body, then logs and records its outcome.
pub(crate) async fn observe<T, F>(kind: HandlerKind, name: &'static str, body: F) -> UserResult<T>
where
    F: Future<Output = UserResult<T>>,
{
    let started = Instant::now();
    let result = body.await;
    let elapsed = started.elapsed();

    let outcome: &'static str = match &result {
        Ok(_) => {
            tracing::debug!(handler = name, elapsed_ms = elapsed.as_millis() as u64, "Handled");
            "ok"
        }
        Err(e) => {
            let error_kind = e.kind();
            match error_kind {
                ErrorKind::Internal | ErrorKind::Timeout => {
                    tracing::error!(handler = name, error = %e, "Handler failed")
                }
                _ => tracing::warn!(handler = name, error = %e, "Handler rejected"),
            }
            error_kind.into()
        }
    };

    match kind {
        HandlerKind::Command => UserMetrics::record_command(name, outcome, elapsed),
        HandlerKind::Query => UserMetrics::record_query(name, outcome, elapsed),
    }

    result
}
