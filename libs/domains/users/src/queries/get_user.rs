use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::auth::{Guards, Permission, RequestContext};
use crate::cqrs::{HandlerKind, Query, QueryHandler, observe};
use crate::error::UserResult;
use crate::models::UserReadModel;
use crate::repository::UserReadModelRepository;

#[derive(Debug, Clone)]
pub struct GetUserById {
    pub id: String,
}

impl Query for GetUserById {
    type Output = UserReadModel;
    const NAME: &'static str = "get_user_by_id";
}

#[derive(Debug, Clone)]
pub struct GetUserByEmail {
    pub email: String,
}

impl Query for GetUserByEmail {
    type Output = UserReadModel;
    const NAME: &'static str = "get_user_by_email";
}

#[derive(Clone)]
pub struct GetUserByIdHandler {
    read_models: Arc<dyn UserReadModelRepository>,
    guards: Guards,
}

impl GetUserByIdHandler {
    pub fn new(read_models: Arc<dyn UserReadModelRepository>, guards: Guards) -> Self {
        Self {
            read_models,
            guards,
        }
    }
}

#[async_trait]
impl QueryHandler<GetUserById> for GetUserByIdHandler {
    #[instrument(skip(self, ctx, query), fields(user_id = %query.id))]
    async fn handle(&self, ctx: &RequestContext, query: GetUserById) -> UserResult<UserReadModel> {
        observe(HandlerKind::Query, GetUserById::NAME, async {
            self.guards
                .permissions
                .authorize(ctx.role(), Permission::ViewUser)?;
            ctx.run("get_by_id", self.read_models.get_by_id(&query.id))
                .await
        })
        .await
    }
}

#[derive(Clone)]
pub struct GetUserByEmailHandler {
    read_models: Arc<dyn UserReadModelRepository>,
    guards: Guards,
}

impl GetUserByEmailHandler {
    pub fn new(read_models: Arc<dyn UserReadModelRepository>, guards: Guards) -> Self {
        Self {
            read_models,
            guards,
        }
    }
}

#[async_trait]
impl QueryHandler<GetUserByEmail> for GetUserByEmailHandler {
    #[instrument(skip(self, ctx, query))]
    async fn handle(
        &self,
        ctx: &RequestContext,
        query: GetUserByEmail,
    ) -> UserResult<UserReadModel> {
        observe(HandlerKind::Query, GetUserByEmail::NAME, async {
            self.guards
                .permissions
                .authorize(ctx.role(), Permission::ViewUser)?;
            ctx.run("get_by_email", self.read_models.get_by_email(query.email.trim()))
                .await
        })
        .await
    }
}
