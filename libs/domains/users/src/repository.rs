use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::{UserError, UserResult};
use crate::models::{GetUsersOptions, SortDirection, UserReadModel};
use crate::user::User;

/// Mutation applied to a loaded aggregate inside one read-modify-write cycle.
///
/// `Fn` rather than `FnOnce` so an adapter can re-run the whole cycle after
/// a transient transaction abort.
pub type UpdateFn = Box<dyn Fn(&mut User) -> UserResult<()> + Send + Sync>;

/// Write port, keyed by aggregate id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. Fails with `AlreadyExists` on a duplicate email or username.
    async fn register(&self, user: User) -> UserResult<()>;

    /// Atomically loads the user, applies `update_fn` and persists the result.
    ///
    /// A missing id yields `NotFound` without calling `update_fn`; an error from
    /// `update_fn` is returned unchanged and nothing is written.
    async fn update(&self, id: &str, update_fn: UpdateFn) -> UserResult<()>;
}

/// Read port. Side-effect free.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserReadModelRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> UserResult<UserReadModel>;

    async fn get_by_email(&self, email: &str) -> UserResult<UserReadModel>;

    async fn get_by_username(&self, username: &str) -> UserResult<UserReadModel>;

    /// Returns at most `opts.page_size()` users plus whether more exist past the page.
    async fn get_users(&self, opts: &GetUsersOptions) -> UserResult<(Vec<UserReadModel>, bool)>;
}

#[derive(Debug, Default)]
struct Indexes {
    emails: HashMap<String, String>,
    usernames: HashMap<String, String>,
}

/// In-memory implementation of both ports (for development/testing).
///
/// Each user sits behind its own mutex, so updates on one id serialize while
/// updates on different ids proceed independently.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, Arc<Mutex<User>>>>>,
    indexes: Arc<Mutex<Indexes>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: &str) -> UserResult<Arc<Mutex<User>>> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn read_model(&self, id: &str) -> UserResult<UserReadModel> {
        let entry = self.entry(id).await?;
        let user = entry.lock().await;
        Ok(UserReadModel::from(&*user))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn register(&self, user: User) -> UserResult<()> {
        let mut users = self.users.write().await;
        let mut indexes = self.indexes.lock().await;

        let email = user.email().to_lowercase();
        if users.contains_key(user.id())
            || indexes.emails.contains_key(&email)
            || indexes.usernames.contains_key(user.username())
        {
            return Err(UserError::AlreadyExists);
        }

        indexes.emails.insert(email, user.id().to_string());
        indexes
            .usernames
            .insert(user.username().to_string(), user.id().to_string());

        tracing::info!(user_id = %user.id(), email = %user.email(), "Registered user");
        users.insert(user.id().to_string(), Arc::new(Mutex::new(user)));
        Ok(())
    }

    async fn update(&self, id: &str, update_fn: UpdateFn) -> UserResult<()> {
        let entry = self.entry(id).await?;
        let mut current = entry.lock().await;

        let mut next = current.clone();
        update_fn(&mut next)?;

        if next.username() != current.username() {
            let mut indexes = self.indexes.lock().await;
            if indexes
                .usernames
                .get(next.username())
                .is_some_and(|owner| owner != id)
            {
                return Err(UserError::AlreadyExists);
            }
            indexes.usernames.remove(current.username());
            indexes
                .usernames
                .insert(next.username().to_string(), id.to_string());
        }

        *current = next;
        tracing::info!(user_id = %id, "Updated user");
        Ok(())
    }
}

#[async_trait]
impl UserReadModelRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: &str) -> UserResult<UserReadModel> {
        self.read_model(id).await
    }

    async fn get_by_email(&self, email: &str) -> UserResult<UserReadModel> {
        let id = self
            .indexes
            .lock()
            .await
            .emails
            .get(&email.to_lowercase())
            .cloned()
            .ok_or_else(|| UserError::NotFound(email.to_string()))?;
        self.read_model(&id).await
    }

    async fn get_by_username(&self, username: &str) -> UserResult<UserReadModel> {
        let id = self
            .indexes
            .lock()
            .await
            .usernames
            .get(username)
            .cloned()
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;
        self.read_model(&id).await
    }

    async fn get_users(&self, opts: &GetUsersOptions) -> UserResult<(Vec<UserReadModel>, bool)> {
        let entries: Vec<Arc<Mutex<User>>> = self.users.read().await.values().cloned().collect();

        let mut page = Vec::with_capacity(entries.len());
        for entry in entries {
            let user = entry.lock().await;
            if opts.is_past_cursor(user.joined_at()) {
                page.push(UserReadModel::from(&*user));
            }
        }

        match opts.direction() {
            SortDirection::Desc => page.sort_by(|a, b| b.joined_at.cmp(&a.joined_at)),
            SortDirection::Asc => page.sort_by(|a, b| a.joined_at.cmp(&b.joined_at)),
        }

        let limit = opts.page_size() as usize;
        let has_next = page.len() > limit;
        page.truncate(limit);
        Ok((page, has_next))
    }
}
