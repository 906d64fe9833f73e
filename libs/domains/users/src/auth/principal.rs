use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::Role;
use crate::error::{UserError, UserResult};

/// Principal resolved by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
        }
    }

    /// Zero value used when no principal was attached to the call.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.role == Role::Guest
    }
}

/// Ambient per-call context: who is calling and by when the call must finish.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    principal: AuthenticatedUser,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(principal: AuthenticatedUser) -> Self {
        Self {
            principal,
            deadline: None,
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn principal(&self) -> &AuthenticatedUser {
        &self.principal
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Runs `fut` under the call deadline. An elapsed deadline surfaces as
    /// `UserError::Timeout`; the operation is not retried.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> UserResult<T>
    where
        F: Future<Output = UserResult<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut).await.map_err(|_| {
                tracing::warn!(operation, "Deadline exceeded");
                UserError::Timeout(operation.to_string())
            })?,
            None => fut.await,
        }
    }
}
