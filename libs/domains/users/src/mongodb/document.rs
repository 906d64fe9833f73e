use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};

use crate::banning::BanStatus;
use crate::error::{UserError, UserResult};
use crate::user::{Reputation, User, UserSnapshot};

/// Stored shape of a user in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub reputation: ReputationDocument,
    pub ban_status: BanStatusDocument,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationDocument {
    pub reputation_score: i64,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanStatusDocument {
    pub is_banned: bool,
    pub banned_at: Option<bson::DateTime>,
    pub ban_start_date: Option<bson::DateTime>,
    pub ban_end_date: Option<bson::DateTime>,
    #[serde(default)]
    pub reason_for_ban: String,
    pub is_ban_indefinite: bool,
}

/// Millisecond precision: anything finer is dropped on write.
pub(crate) fn to_bson(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

pub(crate) fn from_bson(value: bson::DateTime) -> UserResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).ok_or_else(|| {
        UserError::Internal(format!("stored timestamp {} is out of range", value))
    })
}

fn from_bson_opt(value: Option<bson::DateTime>) -> UserResult<Option<DateTime<Utc>>> {
    value.map(from_bson).transpose()
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        let ban = user.ban_status();

        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            username: user.username().to_string(),
            role: user.role().to_string(),
            reputation: ReputationDocument {
                reputation_score: user.reputation_score(),
                badges: user.badges().to_vec(),
            },
            ban_status: BanStatusDocument {
                is_banned: ban.is_banned,
                banned_at: ban.banned_at.map(to_bson),
                ban_start_date: ban.start_date.map(to_bson),
                ban_end_date: ban.end_date.map(to_bson),
                reason_for_ban: ban.reason.clone(),
                is_ban_indefinite: ban.is_indefinite,
            },
            created_at: to_bson(user.joined_at()),
            updated_at: to_bson(user.updated_at()),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = UserError;

    fn try_from(doc: UserDocument) -> UserResult<Self> {
        let role = doc
            .role
            .parse()
            .map_err(|_| UserError::Internal(format!("stored role '{}' is not valid", doc.role)))?;

        User::restore(UserSnapshot {
            id: doc.id,
            email: doc.email,
            username: doc.username,
            role,
            reputation: Reputation {
                score: doc.reputation.reputation_score,
                badges: doc.reputation.badges,
            },
            ban_status: BanStatus {
                is_banned: doc.ban_status.is_banned,
                reason: doc.ban_status.reason_for_ban,
                is_indefinite: doc.ban_status.is_ban_indefinite,
                start_date: from_bson_opt(doc.ban_status.ban_start_date)?,
                end_date: from_bson_opt(doc.ban_status.ban_end_date)?,
                banned_at: from_bson_opt(doc.ban_status.banned_at)?,
            },
            joined_at: from_bson(doc.created_at)?,
            updated_at: from_bson(doc.updated_at)?,
        })
    }
}
