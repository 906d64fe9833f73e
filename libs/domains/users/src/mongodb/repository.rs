use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::error::{
    Error as MongoError, ErrorKind, TRANSIENT_TRANSACTION_ERROR, UNKNOWN_TRANSACTION_COMMIT_RESULT,
    WriteFailure,
};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Client, ClientSession, Collection, IndexModel};
use tracing::instrument;

use database::common::apply_jitter;
use observability::UserMetrics;

use super::document::{UserDocument, to_bson};
use crate::error::{UserError, UserResult};
use crate::models::{GetUsersOptions, SortDirection, UserReadModel};
use crate::repository::{UpdateFn, UserReadModelRepository, UserRepository};
use crate::user::User;

pub const USERS_COLLECTION: &str = "users";

/// Attempts of one read-modify-write cycle before a transient abort is surfaced.
const MAX_TRANSACTION_ATTEMPTS: u32 = 10;

/// Base delay between attempts; grows linearly and is jittered.
const RETRY_BACKOFF_MS: u64 = 10;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB adapter for both user ports.
///
/// `update` runs inside a multi-document transaction on a client session,
/// which needs a replica set (or sharded cluster) deployment.
#[derive(Clone)]
pub struct MongoUserRepository {
    client: Client,
    collection: Collection<UserDocument>,
}

/// Outcome of one transaction attempt: either a final domain error or a
/// driver error that may carry a retryable label.
enum AttemptError {
    Domain(UserError),
    Driver(MongoError),
}

impl From<MongoError> for AttemptError {
    fn from(err: MongoError) -> Self {
        AttemptError::Driver(err)
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn map_write_error(err: MongoError) -> UserError {
    if is_duplicate_key(&err) {
        UserError::AlreadyExists
    } else {
        err.into()
    }
}

impl MongoUserRepository {
    pub fn new(client: Client, database: &str) -> Self {
        let collection = client.database(database).collection(USERS_COLLECTION);
        Self { client, collection }
    }

    /// Unique indexes backing email/username uniqueness, plus the listing sort key.
    #[instrument(skip(self))]
    pub async fn ensure_indexes(&self) -> UserResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique())
                .build(),
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(unique())
                .build(),
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = USERS_COLLECTION, "Ensured user indexes");
        Ok(())
    }

    async fn find_one(&self, filter: Document, key: &str) -> UserResult<UserReadModel> {
        let document = self
            .collection
            .find_one(filter)
            .await?
            .ok_or_else(|| UserError::NotFound(key.to_string()))?;

        let user = User::try_from(document)?;
        Ok(UserReadModel::from(&user))
    }

    async fn abort(session: &mut ClientSession) -> Result<(), AttemptError> {
        session.abort_transaction().await?;
        Ok(())
    }

    async fn commit(session: &mut ClientSession) -> Result<(), AttemptError> {
        let mut attempt = 1;
        loop {
            match session.commit_transaction().await {
                Ok(()) => return Ok(()),
                Err(e)
                    if e.contains_label(UNKNOWN_TRANSACTION_COMMIT_RESULT)
                        && attempt < MAX_TRANSACTION_ATTEMPTS =>
                {
                    attempt += 1;
                    tracing::warn!(attempt, error = %e, "Retrying commit with unknown result");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn update_once(&self, id: &str, update_fn: &UpdateFn) -> Result<(), AttemptError> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        let filter = doc! { "_id": id };
        let Some(document) = self
            .collection
            .find_one(filter.clone())
            .session(&mut session)
            .await?
        else {
            Self::abort(&mut session).await?;
            return Err(AttemptError::Domain(UserError::NotFound(id.to_string())));
        };

        let mut user = match User::try_from(document) {
            Ok(user) => user,
            Err(e) => {
                Self::abort(&mut session).await?;
                return Err(AttemptError::Domain(e));
            }
        };

        if let Err(e) = update_fn(&mut user) {
            Self::abort(&mut session).await?;
            return Err(AttemptError::Domain(e));
        }

        let replacement = UserDocument::from(&user);
        if let Err(e) = self
            .collection
            .replace_one(filter, &replacement)
            .session(&mut session)
            .await
        {
            if is_duplicate_key(&e) {
                Self::abort(&mut session).await?;
                return Err(AttemptError::Domain(UserError::AlreadyExists));
            }
            return Err(AttemptError::Driver(e));
        }

        Self::commit(&mut session).await
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    async fn register(&self, user: User) -> UserResult<()> {
        let document = UserDocument::from(&user);
        self.collection
            .insert_one(&document)
            .await
            .map_err(map_write_error)?;

        tracing::info!(user_id = %user.id(), email = %user.email(), "Registered user");
        Ok(())
    }

    #[instrument(skip(self, update_fn))]
    async fn update(&self, id: &str, update_fn: UpdateFn) -> UserResult<()> {
        let mut attempt = 1;
        loop {
            match self.update_once(id, &update_fn).await {
                Ok(()) => {
                    tracing::info!(user_id = %id, "Updated user");
                    return Ok(());
                }
                Err(AttemptError::Domain(e)) => return Err(e),
                Err(AttemptError::Driver(e))
                    if e.contains_label(TRANSIENT_TRANSACTION_ERROR)
                        && attempt < MAX_TRANSACTION_ATTEMPTS =>
                {
                    UserMetrics::record_transaction_retry("mongodb");
                    tracing::warn!(user_id = %id, attempt, error = %e, "Retrying transient transaction error");
                    let delay = apply_jitter(RETRY_BACKOFF_MS * u64::from(attempt));
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(AttemptError::Driver(e)) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl UserReadModelRepository for MongoUserRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> UserResult<UserReadModel> {
        self.find_one(doc! { "_id": id }, id).await
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<UserReadModel> {
        let email = email.trim().to_lowercase();
        self.find_one(doc! { "email": &email }, &email).await
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> UserResult<UserReadModel> {
        self.find_one(doc! { "username": username }, username).await
    }

    #[instrument(skip(self))]
    async fn get_users(&self, opts: &GetUsersOptions) -> UserResult<(Vec<UserReadModel>, bool)> {
        let (operator, direction) = match opts.direction() {
            SortDirection::Desc => ("$lt", -1),
            SortDirection::Asc => ("$gt", 1),
        };

        let filter = match opts.cursor() {
            Some(after) => doc! { "createdAt": { operator: to_bson(after) } },
            None => doc! {},
        };

        // One extra document tells whether another page exists.
        let first = opts.page_size();
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": direction })
            .limit((first + 1) as i64)
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        let mut documents: Vec<UserDocument> = cursor.try_collect().await?;

        let has_next = documents.len() as u64 > first;
        documents.truncate(first as usize);

        let users = documents
            .into_iter()
            .map(|document| User::try_from(document).map(|user| UserReadModel::from(&user)))
            .collect::<UserResult<Vec<_>>>()?;

        Ok((users, has_next))
    }
}
