use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, TransactionTrait,
};
use tracing::instrument;

use super::entity;
use crate::error::{UserError, UserResult};
use crate::models::{GetUsersOptions, SortDirection, UserReadModel};
use crate::repository::{UpdateFn, UserReadModelRepository, UserRepository};
use crate::user::User;

/// PostgreSQL adapter for both user ports.
///
/// `update` runs `SELECT ... FOR UPDATE` inside a transaction, so concurrent
/// updates on one row serialize on the row lock.
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: entity::Column, value: &str) -> UserResult<UserReadModel> {
        let model = entity::Entity::find()
            .filter(column.eq(value))
            .one(&self.db)
            .await?
            .ok_or_else(|| UserError::NotFound(value.to_string()))?;

        let user = User::try_from(model)?;
        Ok(UserReadModel::from(&user))
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    async fn register(&self, user: User) -> UserResult<()> {
        let active_model = entity::ActiveModel::from(&user);

        match entity::Entity::insert(active_model).exec(&self.db).await {
            Ok(_) => {
                tracing::info!(user_id = %user.id(), email = %user.email(), "Registered user");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(UserError::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, update_fn))]
    async fn update(&self, id: &str, update_fn: UpdateFn) -> UserResult<()> {
        let txn = self.db.begin().await?;

        let Some(model) = entity::Entity::find_by_id(id.to_string())
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Err(UserError::NotFound(id.to_string()));
        };

        let mut user = User::try_from(model)?;
        if let Err(e) = update_fn(&mut user) {
            txn.rollback().await?;
            return Err(e);
        }

        // Every column is `Set`; `update` writes the full row.
        let active_model = entity::ActiveModel::from(&user);
        match active_model.update(&txn).await {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(UserError::AlreadyExists),
            Err(e) => return Err(e.into()),
        }

        txn.commit().await?;
        tracing::info!(user_id = %id, "Updated user");
        Ok(())
    }
}

#[async_trait]
impl UserReadModelRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> UserResult<UserReadModel> {
        self.find_one(entity::Column::Id, id).await
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<UserReadModel> {
        self.find_one(entity::Column::Email, &email.trim().to_lowercase())
            .await
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> UserResult<UserReadModel> {
        self.find_one(entity::Column::Username, username).await
    }

    #[instrument(skip(self))]
    async fn get_users(&self, opts: &GetUsersOptions) -> UserResult<(Vec<UserReadModel>, bool)> {
        let mut query = entity::Entity::find();

        if let Some(after) = opts.cursor() {
            query = match opts.direction() {
                SortDirection::Desc => query.filter(entity::Column::CreatedAt.lt(after)),
                SortDirection::Asc => query.filter(entity::Column::CreatedAt.gt(after)),
            };
        }

        query = match opts.direction() {
            SortDirection::Desc => query.order_by_desc(entity::Column::CreatedAt),
            SortDirection::Asc => query.order_by_asc(entity::Column::CreatedAt),
        };

        // One extra row tells whether another page exists.
        let first = opts.page_size();
        let mut models = query.limit(first + 1).all(&self.db).await?;
        let has_next = models.len() as u64 > first;
        models.truncate(first as usize);

        let users = models
            .into_iter()
            .map(|model| User::try_from(model).map(|user| UserReadModel::from(&user)))
            .collect::<UserResult<Vec<_>>>()?;

        Ok((users, has_next))
    }
}
