use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Caller role. `Guest` is the unauthenticated caller and is never persisted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Guest,
    Regular,
    Moderator,
    Admin,
}

impl Role {
    /// Roles a stored user may hold.
    pub fn is_persistable(&self) -> bool {
        !matches!(self, Role::Guest)
    }
}

/// Capability checked by the role policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Permission {
    #[strum(serialize = "ban:user")]
    #[serde(rename = "ban:user")]
    BanUser,
    #[strum(serialize = "unban:user")]
    #[serde(rename = "unban:user")]
    UnbanUser,
    #[strum(serialize = "delete:user")]
    #[serde(rename = "delete:user")]
    DeleteUser,
    #[strum(serialize = "award:badge")]
    #[serde(rename = "award:badge")]
    AwardBadge,
    #[strum(serialize = "revoke:badge")]
    #[serde(rename = "revoke:badge")]
    RevokeBadge,
    #[strum(serialize = "make:moderator")]
    #[serde(rename = "make:moderator")]
    MakeModerator,
    #[strum(serialize = "make:regular")]
    #[serde(rename = "make:regular")]
    MakeRegular,
    #[strum(serialize = "create:account")]
    #[serde(rename = "create:account")]
    CreateAccount,
    #[strum(serialize = "view:user")]
    #[serde(rename = "view:user")]
    ViewUser,
    #[strum(serialize = "list:users")]
    #[serde(rename = "list:users")]
    ListUsers,
}
