use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::auth::Role;
use crate::banning::BanStatus;
use crate::pagination;
use crate::user::{Reputation, User};

/// Query-side projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReadModel {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub reputation: Reputation,
    pub ban_status: BanStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserReadModel {
    /// Opaque cursor pointing just past this item.
    pub fn cursor(&self) -> String {
        pagination::encode_cursor(self.joined_at)
    }
}

impl From<&User> for UserReadModel {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            reputation: user.reputation().clone(),
            ban_status: user.ban_status().clone(),
            joined_at: user.joined_at(),
            updated_at: user.updated_at(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Listing options: page size, creation-time boundary and order.
///
/// Only built through [`GetUsersOptions::new`], so the page size is always
/// within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUsersOptions {
    first: u64,
    after: Option<DateTime<Utc>>,
    sort: SortDirection,
}

impl GetUsersOptions {
    pub const DEFAULT_PAGE_SIZE: u64 = 10;
    pub const MAX_PAGE_SIZE: u64 = 100;

    pub fn new(first: u64) -> Self {
        Self {
            first: first.clamp(1, Self::MAX_PAGE_SIZE),
            after: None,
            sort: SortDirection::default(),
        }
    }

    pub fn after(mut self, after: Option<DateTime<Utc>>) -> Self {
        self.after = after;
        self
    }

    pub fn sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }

    pub fn page_size(&self) -> u64 {
        self.first
    }

    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        self.after
    }

    pub fn direction(&self) -> SortDirection {
        self.sort
    }

    /// Whether `joined_at` lies strictly beyond the cursor in this order.
    pub fn is_past_cursor(&self, joined_at: DateTime<Utc>) -> bool {
        match (self.after, self.sort) {
            (None, _) => true,
            (Some(after), SortDirection::Desc) => joined_at < after,
            (Some(after), SortDirection::Asc) => joined_at > after,
        }
    }
}

impl Default for GetUsersOptions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub end_cursor: Option<String>,
}

impl PaginatedResult<UserReadModel> {
    pub fn from_page(items: Vec<UserReadModel>, has_next: bool) -> Self {
        let end_cursor = items.last().map(UserReadModel::cursor);
        Self {
            items,
            has_next,
            end_cursor,
        }
    }
}
