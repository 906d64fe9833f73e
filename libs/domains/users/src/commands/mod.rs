//! Write-side handlers. Each one authorizes, runs any precheck against the read
//! port, then goes through the write port's read-modify-write primitive.

mod badges;
mod ban;
mod change_username;
mod register;
mod roles;

use std::sync::Arc;

pub use badges::{AwardBadge, AwardBadgeHandler, RevokeBadge, RevokeBadgeHandler};
pub use ban::{BanUser, BanUserHandler, UnbanUser, UnbanUserHandler};
pub use change_username::{ChangeUsername, ChangeUsernameHandler};
pub use register::{RegisterUser, RegisterUserHandler};
pub use roles::{MakeModerator, MakeModeratorHandler, MakeRegular, MakeRegularHandler};

use crate::auth::{Guards, Permission, RequestContext};
use crate::error::{UserError, UserResult};
use crate::models::UserReadModel;
use crate::repository::{UpdateFn, UserReadModelRepository, UserRepository};

/// Every command handler, wired against the same ports.
#[derive(Clone)]
pub struct Commands {
    pub register_user: RegisterUserHandler,
    pub change_username: ChangeUsernameHandler,
    pub make_moderator: MakeModeratorHandler,
    pub make_regular: MakeRegularHandler,
    pub award_badge: AwardBadgeHandler,
    pub revoke_badge: RevokeBadgeHandler,
    pub ban_user: BanUserHandler,
    pub unban_user: UnbanUserHandler,
}

impl Commands {
    pub fn new(
        users: Arc<dyn UserRepository>,
        read_models: Arc<dyn UserReadModelRepository>,
        guards: Guards,
    ) -> Self {
        Self {
            register_user: RegisterUserHandler::new(users.clone(), read_models.clone(), guards.clone()),
            change_username: ChangeUsernameHandler::new(users.clone(), read_models, guards.clone()),
            make_moderator: MakeModeratorHandler::new(users.clone(), guards.clone()),
            make_regular: MakeRegularHandler::new(users.clone(), guards.clone()),
            award_badge: AwardBadgeHandler::new(users.clone(), guards.clone()),
            revoke_badge: RevokeBadgeHandler::new(users.clone(), guards.clone()),
            ban_user: BanUserHandler::new(users.clone(), guards.clone()),
            unban_user: UnbanUserHandler::new(users, guards),
        }
    }
}

/// Turns a uniqueness lookup into the precheck outcome: a hit is a conflict,
/// `NotFound` means the value is free, anything else is an internal failure.
pub(crate) fn ensure_not_taken(lookup: UserResult<UserReadModel>, field: &str) -> UserResult<()> {
    match lookup {
        Ok(existing) => {
            tracing::debug!(field, existing_id = %existing.id, "Uniqueness precheck hit");
            Err(UserError::AlreadyExists)
        }
        Err(UserError::NotFound(_)) => Ok(()),
        Err(err @ UserError::Timeout(_)) => Err(err),
        Err(err) => Err(UserError::Internal(format!(
            "failed to check whether {field} is taken: {err}"
        ))),
    }
}

/// Permission check followed by one read-modify-write cycle on `user_id`.
pub(crate) async fn authorized_update(
    users: &dyn UserRepository,
    guards: &Guards,
    ctx: &RequestContext,
    permission: Permission,
    user_id: &str,
    update_fn: UpdateFn,
) -> UserResult<()> {
    guards.permissions.authorize(ctx.role(), permission)?;
    ctx.run("update", users.update(user_id, update_fn)).await
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::auth::{AuthenticatedUser, RequestContext, Role};
    use crate::repository::{InMemoryUserRepository, UserRepository};
    use crate::user::User;

    pub fn ctx(id: &str, role: Role) -> RequestContext {
        RequestContext::for_user(AuthenticatedUser::new(id, format!("{id}@example.com"), role))
    }

    pub async fn seeded(users: &[(&str, &str)]) -> Arc<InMemoryUserRepository> {
        let repo = Arc::new(InMemoryUserRepository::new());
        for (id, name) in users {
            let user = User::new(*id, format!("{name}@example.com"), *name, Role::Regular).unwrap();
            repo.register(user).await.unwrap();
        }
        repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn read_model() -> UserReadModel {
        UserReadModel {
            id: "1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: crate::auth::Role::Regular,
            reputation: Default::default(),
            ban_status: Default::default(),
            joined_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_ensure_not_taken() {
        assert_eq!(
            ensure_not_taken(Ok(read_model()), "email"),
            Err(UserError::AlreadyExists)
        );
        assert!(ensure_not_taken(Err(UserError::NotFound("x".into())), "email").is_ok());
        assert!(matches!(
            ensure_not_taken(Err(UserError::Internal("down".into())), "email"),
            Err(UserError::Internal(msg)) if msg.contains("email")
        ));
        assert_eq!(
            ensure_not_taken(Err(UserError::Timeout("get_by_email".into())), "email"),
            Err(UserError::Timeout("get_by_email".into()))
        );
    }
}
