use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::ensure_not_taken;
use crate::auth::{Guards, Permission, RequestContext, Role};
use crate::cqrs::{Command, CommandHandler, HandlerKind, observe};
use crate::error::{UserError, UserResult};
use crate::repository::{UserReadModelRepository, UserRepository};
use crate::user::User;

/// Creates a Regular account and returns its new id.
#[derive(Debug, Clone, Validate)]
pub struct RegisterUser {
    #[validate(email(message = "email address is not valid"))]
    pub email: String,
    pub username: String,
}

impl Command for RegisterUser {
    type Output = String;
    const NAME: &'static str = "register_user";
}

#[derive(Clone)]
pub struct RegisterUserHandler {
    users: Arc<dyn UserRepository>,
    read_models: Arc<dyn UserReadModelRepository>,
    guards: Guards,
}

impl RegisterUserHandler {
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
impl CommandHandler<RegisterUser> for RegisterUserHandler {
    #[instrument(skip(self, ctx, command), fields(email = %command.email, username = %command.username))]
    async fn handle(&self, ctx: &RequestContext, command: RegisterUser) -> UserResult<String> {
        observe(HandlerKind::Command, RegisterUser::NAME, async {
            self.guards
                .permissions
                .authorize(ctx.role(), Permission::CreateAccount)?;

            let command = RegisterUser {
                email: command.email.trim().to_string(),
                username: command.username.trim().to_string(),
            };
            let id = Uuid::now_v7().to_string();
            let user = User::new(id.clone(), command.email.as_str(), command.username.as_str(), Role::Regular)?;
            command
                .validate()
                .map_err(|e| UserError::Validation(e.to_string()))?;

            ensure_not_taken(
                ctx.run("get_by_email", self.read_models.get_by_email(user.email()))
                    .await,
                "email",
            )?;
            ensure_not_taken(
                ctx.run("get_by_username", self.read_models.get_by_username(user.username()))
                    .await,
                "username",
            )?;

            ctx.run("register", self.users.register(user)).await?;

            tracing::info!(user_id = %id, "Registered user");
            Ok(id)
        })
        .await
    }
}
