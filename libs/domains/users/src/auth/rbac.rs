//! Role-based permission table.

use super::{Permission, Role};
use crate::error::{UserError, UserResult};

/// Coarse capability check keyed by role.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionPolicy: Send + Sync {
    fn authorize(&self, role: Role, permission: Permission) -> UserResult<()>;
}

/// Static role → permissions table. Admin bypasses the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl RolePolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn permissions(role: Role) -> &'static [Permission] {
        match role {
            Role::Guest => &[Permission::CreateAccount],
            Role::Regular => &[Permission::ViewUser],
            Role::Moderator => &[
                Permission::ViewUser,
                Permission::ListUsers,
                Permission::BanUser,
                Permission::UnbanUser,
            ],
            Role::Admin => &[],
        }
    }

    pub fn is_allowed(role: Role, permission: Permission) -> bool {
        role == Role::Admin || Self::permissions(role).contains(&permission)
    }
}

impl PermissionPolicy for RolePolicy {
    fn authorize(&self, role: Role, permission: Permission) -> UserResult<()> {
        if Self::is_allowed(role, permission) {
            Ok(())
        } else {
            tracing::debug!(%role, %permission, "Permission denied");
            Err(UserError::Unauthorized)
        }
    }
}
