use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::authorized_update;
use crate::auth::{Guards, Permission, RequestContext};
use crate::banning::BanTimeline;
use crate::cqrs::{Command, CommandHandler, HandlerKind, observe};
use crate::error::UserResult;
use crate::repository::UserRepository;

#[derive(Debug, Clone)]
pub struct BanUser {
    pub user_id: String,
    pub reason: String,
    pub indefinite: bool,
    pub timeline: Option<BanTimeline>,
}

impl Command for BanUser {
    type Output = ();
    const NAME: &'static str = "ban_user";
}

#[derive(Debug, Clone)]
pub struct UnbanUser {
    pub user_id: String,
}

impl Command for UnbanUser {
    type Output = ();
    const NAME: &'static str = "unban_user";
}

#[derive(Clone)]
pub struct BanUserHandler {
    users: Arc<dyn UserRepository>,
    guards: Guards,
}

impl BanUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, guards: Guards) -> Self {
        Self { users, guards }
    }
}

#[async_trait]
impl CommandHandler<BanUser> for BanUserHandler {
    #[instrument(
        skip(self, ctx, command),
        fields(user_id = %command.user_id, indefinite = command.indefinite, actor_id = %ctx.principal().id)
    )]
    async fn handle(&self, ctx: &RequestContext, command: BanUser) -> UserResult<()> {
        observe(HandlerKind::Command, BanUser::NAME, async {
            let BanUser {
                user_id,
                reason,
                indefinite,
                timeline,
            } = command;

            authorized_update(
                self.users.as_ref(),
                &self.guards,
                ctx,
                Permission::BanUser,
                &user_id,
                Box::new(move |user| user.ban(reason.clone(), indefinite, timeline)),
            )
            .await?;

            tracing::info!(%user_id, "Banned user");
            Ok(())
        })
        .await
    }
}

#[derive(Clone)]
pub struct UnbanUserHandler {
    users: Arc<dyn UserRepository>,
    guards: Guards,
}

impl UnbanUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, guards: Guards) -> Self {
        Self { users, guards }
    }
}

#[async_trait]
impl CommandHandler<UnbanUser> for UnbanUserHandler {
    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id, actor_id = %ctx.principal().id))]
    async fn handle(&self, ctx: &RequestContext, command: UnbanUser) -> UserResult<()> {
        observe(HandlerKind::Command, UnbanUser::NAME, async {
            authorized_update(
                self.users.as_ref(),
                &self.guards,
                ctx,
                Permission::UnbanUser,
                &command.user_id,
                Box::new(|user| user.unban()),
            )
            .await?;

            tracing::info!(user_id = %command.user_id, "Unbanned user");
            Ok(())
        })
        .await
    }
}
