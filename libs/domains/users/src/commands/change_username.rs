use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::ensure_not_taken;
use crate::auth::{Guards, RequestContext};
use crate::cqrs::{Command, CommandHandler, HandlerKind, observe};
use crate::error::{UserError, UserResult};
use crate::repository::{UserReadModelRepository, UserRepository};

/// Renames a user. Only the user themself or an admin may do it.
#[derive(Debug, Clone)]
pub struct ChangeUsername {
    pub user_id: String,
    pub username: String,
}

impl Command for ChangeUsername {
    type Output = ();
    const NAME: &'static str = "change_username";
}

#[derive(Clone)]
pub struct ChangeUsernameHandler {
    users: Arc<dyn UserRepository>,
    read_models: Arc<dyn UserReadModelRepository>,
    guards: Guards,
}

impl ChangeUsernameHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        read_models: Arc<dyn UserReadModelRepository>,
        guards: Guards,
    ) -> Self {
        Self {
            users,
            read_models,
            guards,
        }
    }
}

#[async_trait]
impl CommandHandler<ChangeUsername> for ChangeUsernameHandler {
    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id, actor_id = %ctx.principal().id))]
    async fn handle(&self, ctx: &RequestContext, command: ChangeUsername) -> UserResult<()> {
        observe(HandlerKind::Command, ChangeUsername::NAME, async {
            self.guards.ownership.can_act_on_target(
                &ctx.principal().id,
                &command.user_id,
                ctx.role(),
            )?;

            let username = command.username.trim().to_string();
            if username.is_empty() {
                return Err(UserError::UsernameRequired);
            }

            ensure_not_taken(
                ctx.run("get_by_username", self.read_models.get_by_username(&username))
                    .await,
                "username",
            )?;

            let next = username.clone();
            ctx.run(
                "update",
                self.users.update(
                    &command.user_id,
                    Box::new(move |user| user.change_username(next.clone())),
                ),
            )
            .await?;

            tracing::info!(user_id = %command.user_id, %username, "Changed username");
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::commands::test_support::{ctx, seeded};
    use crate::repository::{MockUserReadModelRepository, MockUserRepository};

    fn rename(user_id: &str, username: &str) -> ChangeUsername {
        ChangeUsername {
            user_id: user_id.to_string(),
            username: username.to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_renames_self() {
        let repo = seeded(&[("1", "alice")]).await;
        let handler = ChangeUsernameHandler::new(repo.clone(), repo.clone(), Guards::default());

        handler
            .handle(&ctx("1", Role::Regular), rename("1", "alicia"))
            .await
            .unwrap();
        assert_eq!(repo.get_by_id("1").await.unwrap().username, "alicia");
    }

    #[tokio::test]
    async fn test_admin_renames_anyone() {
        let repo = seeded(&[("1", "alice")]).await;
        let handler = ChangeUsernameHandler::new(repo.clone(), repo.clone(), Guards::default());

        handler
            .handle(&ctx("admin", Role::Admin), rename("1", "al"))
            .await
            .unwrap();
        assert_eq!(repo.get_by_id("1").await.unwrap().username, "al");
    }

    #[tokio::test]
    async fn test_cannot_rename_others() {
        let repo = seeded(&[("1", "alice"), ("2", "bob")]).await;
        let handler = ChangeUsernameHandler::new(repo.clone(), repo.clone(), Guards::default());

        for role in [Role::Regular, Role::Moderator] {
            let err = handler
                .handle(&ctx("2", role), rename("1", "mallory"))
                .await
                .unwrap_err();
            assert_eq!(err, UserError::Unauthorized);
        }
        let err = handler
            .handle(&RequestContext::anonymous(), rename("1", "mallory"))
            .await
            .unwrap_err();
        assert_eq!(err, UserError::Unauthorized);
        assert_eq!(repo.get_by_id("1").await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_taken_username() {
        let repo = seeded(&[("1", "alice"), ("2", "bob")]).await;
        let handler = ChangeUsernameHandler::new(repo.clone(), repo, Guards::default());

        let err = handler
            .handle(&ctx("2", Role::Regular), rename("2", "alice"))
            .await
            .unwrap_err();
        assert_eq!(err, UserError::AlreadyExists);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let repo = seeded(&[]).await;
        let handler = ChangeUsernameHandler::new(repo.clone(), repo, Guards::default());

        let err = handler
            .handle(&ctx("9", Role::Regular), rename("9", "ghost"))
            .await
            .unwrap_err();
        assert_eq!(err, UserError::NotFound("9".to_string()));
    }

    #[tokio::test]
    async fn test_ownership_checked_before_storage() {
        let handler = ChangeUsernameHandler::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockUserReadModelRepository::new()),
            Guards::default(),
        );

        let err = handler
            .handle(&ctx("2", Role::Regular), rename("1", "x"))
            .await
            .unwrap_err();
        assert_eq!(err, UserError::Unauthorized);
    }
}
