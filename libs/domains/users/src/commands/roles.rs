use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::authorized_update;
use crate::auth::{Guards, Permission, RequestContext};
use crate::cqrs::{Command, CommandHandler, HandlerKind, observe};
use crate::error::UserResult;
use crate::repository::UserRepository;

#[derive(Debug, Clone)]
pub struct MakeModerator {
    pub user_id: String,
}

impl Command for MakeModerator {
    type Output = ();
    const NAME: &'static str = "make_moderator";
}

#[derive(Debug, Clone)]
pub struct MakeRegular {
    pub user_id: String,
}

impl Command for MakeRegular {
    type Output = ();
    const NAME: &'static str = "make_regular";
}

#[derive(Clone)]
pub struct MakeModeratorHandler {
    users: Arc<dyn UserRepository>,
    guards: Guards,
}

impl MakeModeratorHandler {
    pub fn new(users: Arc<dyn UserRepository>, guards: Guards) -> Self {
        Self { users, guards }
    }
}

#[async_trait]
impl CommandHandler<MakeModerator> for MakeModeratorHandler {
    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id))]
    async fn handle(&self, ctx: &RequestContext, command: MakeModerator) -> UserResult<()> {
        observe(HandlerKind::Command, MakeModerator::NAME, async {
            authorized_update(
                self.users.as_ref(),
                &self.guards,
                ctx,
                Permission::MakeModerator,
                &command.user_id,
                Box::new(|user| user.make_moderator()),
            )
            .await?;

            tracing::info!(user_id = %command.user_id, "Promoted user to moderator");
            Ok(())
        })
        .await
    }
}

#[derive(Clone)]
pub struct MakeRegularHandler {
    users: Arc<dyn UserRepository>,
    guards: Guards,
}

impl MakeRegularHandler {
    pub fn new(users: Arc<dyn UserRepository>, guards: Guards) -> Self {
        Self { users, guards }
    }
}

#[async_trait]
impl CommandHandler<MakeRegular> for MakeRegularHandler {
    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id))]
    async fn handle(&self, ctx: &RequestContext, command: MakeRegular) -> UserResult<()> {
        observe(HandlerKind::Command, MakeRegular::NAME, async {
            authorized_update(
                self.users.as_ref(),
                &self.guards,
                ctx,
                Permission::MakeRegular,
                &command.user_id,
                Box::new(|user| user.make_regular()),
            )
            .await?;

            tracing::info!(user_id = %command.user_id, "Demoted user to regular");
            Ok(())
        })
        .await
    }
}
