use thiserror::Error;

use crate::auth::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("user id cannot be empty")]
    IdRequired,

    #[error("email cannot be empty")]
    EmailRequired,

    #[error("username cannot be empty")]
    UsernameRequired,

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("badge cannot be empty")]
    BadgeRequired,

    #[error("the badge {badge} has already been awarded to the user {username}")]
    BadgeAlreadyAwarded { badge: String, username: String },

    #[error("the badge {badge} you want to revoke hasn't been awarded to the user {username} previously")]
    BadgeNotAwarded { badge: String, username: String },

    #[error("reputation score can only be incremented by a positive value")]
    InvalidIncrement,

    #[error("reputation score can only be decremented by a positive value")]
    InvalidDecrement,

    #[error("reputation score cannot be negative")]
    InvalidReputationScore,

    #[error("the user {username} is already a {role}")]
    AlreadyHasRole { username: String, role: Role },

    #[error("reason to ban a user can't be empty")]
    EmptyBanReason,

    #[error("user is already banned")]
    AlreadyBanned,

    #[error("you must pass correct ban timeline if user ban is not indefinitely")]
    BanTimelineRequired,

    #[error("user you are trying to unban is not banned")]
    NotBanned,

    #[error("user already exists")]
    AlreadyExists,

    #[error("user not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Coarse classification a transport maps onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Conflict,
    NotFound,
    Timeout,
    Internal,
}

impl UserError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UserError::IdRequired
            | UserError::EmailRequired
            | UserError::UsernameRequired
            | UserError::InvalidRole(_)
            | UserError::BadgeRequired
            | UserError::InvalidIncrement
            | UserError::InvalidDecrement
            | UserError::InvalidReputationScore
            | UserError::EmptyBanReason
            | UserError::BanTimelineRequired
            | UserError::Validation(_) => ErrorKind::Validation,
            UserError::Unauthorized => ErrorKind::Unauthorized,
            UserError::AlreadyExists
            | UserError::AlreadyBanned
            | UserError::NotBanned
            | UserError::BadgeAlreadyAwarded { .. }
            | UserError::BadgeNotAwarded { .. }
            | UserError::AlreadyHasRole { .. } => ErrorKind::Conflict,
            UserError::NotFound(_) => ErrorKind::NotFound,
            UserError::Timeout(_) => ErrorKind::Timeout,
            UserError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::NotFound(_))
    }
}

#[cfg(feature = "postgres")]
impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        UserError::Internal(format!("Database error: {}", err))
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Internal(format!("Database error: {}", err))
    }
}
