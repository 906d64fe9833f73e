use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::auth::{Guards, Permission, RequestContext};
use crate::cqrs::{HandlerKind, Query, QueryHandler, observe};
use crate::error::UserResult;
use crate::models::{GetUsersOptions, PaginatedResult, SortDirection, UserReadModel};
use crate::pagination::decode_cursor;
use crate::repository::UserReadModelRepository;

/// One page of users ordered by join time.
#[derive(Debug, Clone, Default)]
pub struct GetUsers {
    pub first: Option<u64>,
    /// Cursor of the last item of the previous page. Unreadable cursors restart from the top.
    pub after: Option<String>,
    pub sort: SortDirection,
}

impl Query for GetUsers {
    type Output = PaginatedResult<UserReadModel>;
    const NAME: &'static str = "get_users";
}

impl GetUsers {
    fn options(&self) -> GetUsersOptions {
        let after = self.after.as_deref().and_then(|cursor| {
            let decoded = decode_cursor(cursor);
            if decoded.is_none() && !cursor.trim().is_empty() {
                tracing::debug!(cursor, "Ignoring unreadable cursor");
            }
            decoded
        });

        GetUsersOptions::new(self.first.unwrap_or(GetUsersOptions::DEFAULT_PAGE_SIZE))
            .after(after)
            .sort(self.sort)
    }
}

#[derive(Clone)]
pub struct GetUsersHandler {
    read_models: Arc<dyn UserReadModelRepository>,
    guards: Guards,
}

impl GetUsersHandler {
    pub fn new(read_models: Arc<dyn UserReadModelRepository>, guards: Guards) -> Self {
        Self {
            read_models,
            guards,
        }
    }
}

#[async_trait]
impl QueryHandler<GetUsers> for GetUsersHandler {
    #[instrument(skip(self, ctx, query), fields(first = ?query.first, sort = %query.sort))]
    async fn handle(
        &self,
        ctx: &RequestContext,
        query: GetUsers,
    ) -> UserResult<PaginatedResult<UserReadModel>> {
        observe(HandlerKind::Query, GetUsers::NAME, async {
            self.guards
                .permissions
                .authorize(ctx.role(), Permission::ListUsers)?;

            let opts = query.options();
            let (items, has_next) = ctx.run("get_users", self.read_models.get_users(&opts)).await?;
            Ok(PaginatedResult::from_page(items, has_next))
        })
        .await
    }
}
