use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::authorized_update;
use crate::auth::{Guards, Permission, RequestContext};
use crate::cqrs::{Command, CommandHandler, HandlerKind, observe};
use crate::error::UserResult;
use crate::repository::UserRepository;

#[derive(Debug, Clone)]
pub struct AwardBadge {
    pub user_id: String,
    pub badge: String,
}

impl Command for AwardBadge {
    type Output = ();
    const NAME: &'static str = "award_badge";
}

#[derive(Debug, Clone)]
pub struct RevokeBadge {
    pub user_id: String,
    pub badge: String,
}

impl Command for RevokeBadge {
    type Output = ();
    const NAME: &'static str = "revoke_badge";
}

#[derive(Clone)]
pub struct AwardBadgeHandler {
    users: Arc<dyn UserRepository>,
    guards: Guards,
}

impl AwardBadgeHandler {
    pub fn new(users: Arc<dyn UserRepository>, guards: Guards) -> Self {
        Self { users, guards }
    }
}

#[async_trait]
impl CommandHandler<AwardBadge> for AwardBadgeHandler {
    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id, badge = %command.badge))]
    async fn handle(&self, ctx: &RequestContext, command: AwardBadge) -> UserResult<()> {
        observe(HandlerKind::Command, AwardBadge::NAME, async {
            let badge = command.badge.clone();
            authorized_update(
                self.users.as_ref(),
                &self.guards,
                ctx,
                Permission::AwardBadge,
                &command.user_id,
                Box::new(move |user| user.award_badge(badge.clone())),
            )
            .await?;

            tracing::info!(user_id = %command.user_id, badge = %command.badge, "Awarded badge");
            Ok(())
        })
        .await
    }
}

#[derive(Clone)]
pub struct RevokeBadgeHandler {
    users: Arc<dyn UserRepository>,
    guards: Guards,
}

impl RevokeBadgeHandler {
    pub fn new(users: Arc<dyn UserRepository>, guards: Guards) -> Self {
        Self { users, guards }
    }
}

#[async_trait]
impl CommandHandler<RevokeBadge> for RevokeBadgeHandler {
    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id, badge = %command.badge))]
    async fn handle(&self, ctx: &RequestContext, command: RevokeBadge) -> UserResult<()> {
        observe(HandlerKind::Command, RevokeBadge::NAME, async {
            let badge = command.badge.clone();
            authorized_update(
                self.users.as_ref(),
                &self.guards,
                ctx,
                Permission::RevokeBadge,
                &command.user_id,
                Box::new(move |user| user.revoke_badge(&badge)),
            )
            .await?;

            tracing::info!(user_id = %command.user_id, badge = %command.badge, "Revoked badge");
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
    use crate::error::UserError;
    use crate::repository::{MockUserRepository, UserReadModelRepository};

    fn award(badge: &str) -> AwardBadge {
        AwardBadge {
            user_id: "1".to_string(),
            badge: badge.to_string(),
        }
    }

    fn revoke(badge: &str) -> RevokeBadge {
        RevokeBadge {
            user_id: "1".to_string(),
            badge: badge.to_string(),
        }
    }

    #[tokio::test]
    async fn test_award_then_revoke() {
        let repo = seeded(&[("1", "alice")]).await;
        let awarder = AwardBadgeHandler::new(repo.clone(), Guards::default());
        let revoker = RevokeBadgeHandler::new(repo.clone(), Guards::default());
        let admin = ctx("admin", Role::Admin);

        awarder.handle(&admin, award("helper")).await.unwrap();
        awarder.handle(&admin, award("mentor")).await.unwrap();
        assert_eq!(
            repo.get_by_id("1").await.unwrap().reputation.badges,
            ["helper", "mentor"]
        );

        revoker.handle(&admin, revoke("helper")).await.unwrap();
        assert_eq!(repo.get_by_id("1").await.unwrap().reputation.badges, ["mentor"]);
    }

    #[tokio::test]
    async fn test_revoke_unknown_badge() {
        let repo = seeded(&[("1", "alice")]).await;
        let revoker = RevokeBadgeHandler::new(repo.clone(), Guards::default());

        let err = revoker
            .handle(&ctx("admin", Role::Admin), revoke("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::BadgeNotAwarded { .. }));
        assert!(repo.get_by_id("1").await.unwrap().reputation.badges.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_award_conflicts() {
        let repo = seeded(&[("1", "alice")]).await;
        let awarder = AwardBadgeHandler::new(repo, Guards::default());
        let admin = ctx("admin", Role::Admin);

        awarder.handle(&admin, award("helper")).await.unwrap();
        let err = awarder.handle(&admin, award("helper")).await.unwrap_err();
        assert!(matches!(err, UserError::BadgeAlreadyAwarded { .. }));
    }

    #[tokio::test]
    async fn test_non_admin_rejected() {
        let awarder = AwardBadgeHandler::new(Arc::new(MockUserRepository::new()), Guards::default());
        let revoker = RevokeBadgeHandler::new(Arc::new(MockUserRepository::new()), Guards::default());

        for role in [Role::Guest, Role::Regular, Role::Moderator] {
            assert_eq!(
                awarder.handle(&ctx("x", role), award("helper")).await,
                Err(UserError::Unauthorized)
            );
            assert_eq!(
                revoker.handle(&ctx("x", role), revoke("helper")).await,
                Err(UserError::Unauthorized)
            );
        }
    }
}
