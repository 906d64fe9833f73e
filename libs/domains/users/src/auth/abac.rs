//! Ownership rule between the acting user and the target user.

use super::Role;
use crate::error::{UserError, UserResult};

#[cfg_attr(test, mockall::automock)]
pub trait OwnershipPolicy: Send + Sync {
    fn can_act_on_target(&self, actor_id: &str, target_id: &str, role: Role) -> UserResult<()>;
}

/// Admin acts on anyone, Regular and Moderator only on themselves, Guest on nobody.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfOrAdminPolicy;

impl SelfOrAdminPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl OwnershipPolicy for SelfOrAdminPolicy {
    fn can_act_on_target(&self, actor_id: &str, target_id: &str, role: Role) -> UserResult<()> {
        let allowed = match role {
            Role::Admin => true,
            Role::Regular | Role::Moderator => !actor_id.is_empty() && actor_id == target_id,
            Role::Guest => false,
        };

        if allowed {
            Ok(())
        } else {
            tracing::debug!(actor_id, target_id, %role, "Ownership check failed");
            Err(UserError::Unauthorized)
        }
    }
}
