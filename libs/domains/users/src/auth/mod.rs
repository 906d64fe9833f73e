//! Authorization: role permissions (RBAC), ownership (ABAC) and the call principal.

mod abac;
mod principal;
mod rbac;
mod role;

use std::sync::Arc;

pub use abac::{OwnershipPolicy, SelfOrAdminPolicy};
pub use principal::{AuthenticatedUser, RequestContext};
pub use rbac::{PermissionPolicy, RolePolicy};
pub use role::{Permission, Role};

#[cfg(test)]
pub use abac::MockOwnershipPolicy;
#[cfg(test)]
pub use rbac::MockPermissionPolicy;

/// The two policies handed to every handler.
#[derive(Clone)]
pub struct Guards {
    pub permissions: Arc<dyn PermissionPolicy>,
    pub ownership: Arc<dyn OwnershipPolicy>,
}

impl Guards {
    pub fn new(permissions: Arc<dyn PermissionPolicy>, ownership: Arc<dyn OwnershipPolicy>) -> Self {
        Self {
            permissions,
            ownership,
        }
    }
}

impl Default for Guards {
    fn default() -> Self {
        Self::new(Arc::new(RolePolicy::new()), Arc::new(SelfOrAdminPolicy::new()))
    }
}
