//! The `User` aggregate: the consistency boundary for one account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::banning::BanStatus;
use crate::error::{UserError, UserResult};

/// Reputation score plus the badges awarded so far.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reputation {
    pub score: i64,
    pub badges: Vec<String>,
}

impl Reputation {
    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.iter().any(|b| b == badge)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: String,
    email: String,
    username: String,
    role: Role,
    reputation: Reputation,
    pub(crate) ban_status: BanStatus,
    joined_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Full persisted state, used by storage adapters to rebuild an aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub reputation: Reputation,
    pub ban_status: BanStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn require(value: &str, err: UserError) -> UserResult<()> {
    if value.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}

fn require_persistable(role: Role) -> UserResult<()> {
    if role.is_persistable() {
        Ok(())
    } else {
        Err(UserError::InvalidRole(role.to_string()))
    }
}

impl User {
    /// Creates a fresh account with zero reputation and no ban. Emails are stored lowercased.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        role: Role,
    ) -> UserResult<Self> {
        let (id, username) = (id.into(), username.into());
        let email = email.into().trim().to_lowercase();
        require(&id, UserError::IdRequired)?;
        require(&email, UserError::EmailRequired)?;
        require(&username, UserError::UsernameRequired)?;
        require_persistable(role)?;

        let now = Utc::now();
        Ok(Self {
            id,
            email,
            username,
            role,
            reputation: Reputation::default(),
            ban_status: BanStatus::default(),
            joined_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds an aggregate from stored state, re-checking the stored invariants.
    pub fn restore(snapshot: UserSnapshot) -> UserResult<Self> {
        require(&snapshot.id, UserError::IdRequired)?;
        require(&snapshot.email, UserError::EmailRequired)?;
        require(&snapshot.username, UserError::UsernameRequired)?;
        require_persistable(snapshot.role)?;
        if snapshot.reputation.score < 0 {
            return Err(UserError::InvalidReputationScore);
        }

        Ok(Self {
            id: snapshot.id,
            email: snapshot.email,
            username: snapshot.username,
            role: snapshot.role,
            reputation: snapshot.reputation,
            ban_status: snapshot.ban_status,
            joined_at: snapshot.joined_at,
            updated_at: snapshot.updated_at,
        })
    }

    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            reputation: self.reputation.clone(),
            ban_status: self.ban_status.clone(),
            joined_at: self.joined_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn reputation(&self) -> &Reputation {
        &self.reputation
    }

    pub fn reputation_score(&self) -> i64 {
        self.reputation.score
    }

    pub fn badges(&self) -> &[String] {
        &self.reputation.badges
    }

    pub fn ban_status(&self) -> &BanStatus {
        &self.ban_status
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn change_username(&mut self, username: impl Into<String>) -> UserResult<()> {
        let username = username.into();
        require(&username, UserError::UsernameRequired)?;

        self.username = username;
        self.touch();
        Ok(())
    }

    /// Awards a badge. A label already held is rejected rather than duplicated.
    pub fn award_badge(&mut self, badge: impl Into<String>) -> UserResult<()> {
        let badge = badge.into();
        require(&badge, UserError::BadgeRequired)?;
        if self.reputation.has_badge(&badge) {
            return Err(UserError::BadgeAlreadyAwarded {
                badge,
                username: self.username.clone(),
            });
        }

        self.reputation.badges.push(badge);
        self.touch();
        Ok(())
    }

    pub fn revoke_badge(&mut self, badge: &str) -> UserResult<()> {
        require(badge, UserError::BadgeRequired)?;
        let Some(pos) = self.reputation.badges.iter().position(|b| b == badge) else {
            return Err(UserError::BadgeNotAwarded {
                badge: badge.to_string(),
                username: self.username.clone(),
            });
        };

        self.reputation.badges.remove(pos);
        self.touch();
        Ok(())
    }

    pub fn increment_reputation_score_by(&mut self, value: i64) -> UserResult<()> {
        if value < 1 {
            return Err(UserError::InvalidIncrement);
        }

        self.reputation.score = self.reputation.score.saturating_add(value);
        self.touch();
        Ok(())
    }

    pub fn decrement_reputation_score_by(&mut self, value: i64) -> UserResult<()> {
        if value < 1 {
            return Err(UserError::InvalidDecrement);
        }
        let score = self.reputation.score - value;
        if score < 0 {
            return Err(UserError::InvalidReputationScore);
        }

        self.reputation.score = score;
        self.touch();
        Ok(())
    }

    pub fn make_moderator(&mut self) -> UserResult<()> {
        self.transition_to(Role::Moderator)
    }

    pub fn make_regular(&mut self) -> UserResult<()> {
        self.transition_to(Role::Regular)
    }

    fn transition_to(&mut self, role: Role) -> UserResult<()> {
        if self.role == role {
            return Err(UserError::AlreadyHasRole {
                username: self.username.clone(),
                role,
            });
        }

        self.role = role;
        self.touch();
        Ok(())
    }
}
