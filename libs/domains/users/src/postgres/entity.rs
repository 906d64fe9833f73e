use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::banning::BanStatus;
use crate::error::{UserError, UserResult};
use crate::user::{Reputation, User, UserSnapshot};

/// Sea-ORM Entity for the users table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text", unique)]
    pub username: String,
    #[sea_orm(column_type = "Text", unique)]
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub role: String,
    pub reputation_score: i64,
    pub badges: Json, // JSONB array of labels
    pub is_banned: bool,
    pub banned_at: Option<DateTimeWithTimeZone>,
    pub ban_start_date: Option<DateTimeWithTimeZone>,
    pub ban_end_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text")]
    pub reason_for_ban: String,
    pub is_ban_indefinite: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

impl TryFrom<Model> for User {
    type Error = UserError;

    fn try_from(model: Model) -> UserResult<Self> {
        let role = model
            .role
            .parse()
            .map_err(|_| UserError::Internal(format!("stored role '{}' is not valid", model.role)))?;
        let badges: Vec<String> = serde_json::from_value(model.badges)
            .map_err(|e| UserError::Internal(format!("stored badges are malformed: {}", e)))?;

        User::restore(UserSnapshot {
            id: model.id,
            email: model.email,
            username: model.username,
            role,
            reputation: Reputation {
                score: model.reputation_score,
                badges,
            },
            ban_status: BanStatus {
                is_banned: model.is_banned,
                reason: model.reason_for_ban,
                is_indefinite: model.is_ban_indefinite,
                start_date: model.ban_start_date.map(utc),
                end_date: model.ban_end_date.map(utc),
                banned_at: model.banned_at.map(utc),
            },
            joined_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        })
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        let ban = user.ban_status();

        ActiveModel {
            id: Set(user.id().to_string()),
            username: Set(user.username().to_string()),
            email: Set(user.email().to_string()),
            role: Set(user.role().to_string()),
            reputation_score: Set(user.reputation_score()),
            badges: Set(Json::from(user.badges().to_vec())),
            is_banned: Set(ban.is_banned),
            banned_at: Set(ban.banned_at.map(Into::into)),
            ban_start_date: Set(ban.start_date.map(Into::into)),
            ban_end_date: Set(ban.end_date.map(Into::into)),
            reason_for_ban: Set(ban.reason.clone()),
            is_ban_indefinite: Set(ban.is_indefinite),
            created_at: Set(user.joined_at().into()),
            updated_at: Set(user.updated_at().into()),
        }
    }
}
