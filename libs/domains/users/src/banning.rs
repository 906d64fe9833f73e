use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{UserError, UserResult};
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BanStatus {
    pub is_banned: bool,
    pub reason: String,
    pub is_indefinite: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub banned_at: Option<DateTime<Utc>>,
}

/// Start and end of a time-boxed ban.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanTimeline {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl BanTimeline {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> UserResult<Self> {
        if to <= from {
            return Err(UserError::Validation(
                "ban end date must be after its start date".to_string(),
            ));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }
}

impl User {
    /// Bans the user. An explicit timeline always wins over `indefinite`.
    pub fn ban(
        &mut self,
        reason: impl Into<String>,
        indefinite: bool,
        timeline: Option<BanTimeline>,
    ) -> UserResult<()> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(UserError::EmptyBanReason);
        }
        if self.ban_status.is_banned {
            return Err(UserError::AlreadyBanned);
        }
        if !indefinite && timeline.is_none() {
            return Err(UserError::BanTimelineRequired);
        }

        let now = Utc::now();
        self.ban_status = BanStatus {
            is_banned: true,
            reason,
            is_indefinite: timeline.is_none(),
            start_date: timeline.map(|t| t.from),
            end_date: timeline.map(|t| t.to),
            banned_at: Some(now),
        };
        self.updated_at = now;
        Ok(())
    }

    pub fn unban(&mut self) -> UserResult<()> {
        if !self.ban_status.is_banned {
            return Err(UserError::NotBanned);
        }

        self.ban_status = BanStatus::default();
        self.touch();
        Ok(())
    }

    pub fn is_banned(&self) -> bool {
        self.ban_status.is_banned
    }

    pub fn is_ban_indefinite(&self) -> bool {
        self.ban_status.is_indefinite
    }

    pub fn ban_reason(&self) -> &str {
        &self.ban_status.reason
    }

    pub fn ban_start_date(&self) -> Option<DateTime<Utc>> {
        self.ban_status.start_date
    }

    pub fn ban_end_date(&self) -> Option<DateTime<Utc>> {
        self.ban_status.end_date
    }

    pub fn banned_at(&self) -> Option<DateTime<Utc>> {
        self.ban_status.banned_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Duration;

    fn user() -> User {
        User::new("u-1", "bob@example.com", "bob", Role::Regular).unwrap()
    }

    fn week() -> BanTimeline {
        let from = Utc::now();
        BanTimeline::new(from, from + Duration::days(7)).unwrap()
    }

    #[test]
    fn test_indefinite_ban() {
        let mut user = user();
        user.ban("abuse", true, None).unwrap();
        assert!(user.is_banned());
        assert!(user.is_ban_indefinite());
        assert_eq!(user.ban_reason(), "abuse");
        assert!(user.ban_start_date().is_none());
        assert!(user.ban_end_date().is_none());
        assert!(user.banned_at().is_some());
    }

    #[test]
    fn test_timeline_wins_over_indefinite_flag() {
        let mut user = user();
        let timeline = week();
        user.ban("spam", true, Some(timeline)).unwrap();
        assert!(!user.is_ban_indefinite());
        assert_eq!(user.ban_start_date(), Some(timeline.from()));
        assert_eq!(user.ban_end_date(), Some(timeline.to()));
    }

    #[test]
    fn test_ban_validation() {
        let mut user = user();
        assert_eq!(user.ban(" ", true, None), Err(UserError::EmptyBanReason));
        assert_eq!(
            user.ban("spam", false, None),
            Err(UserError::BanTimelineRequired)
        );
        assert!(!user.is_banned());
    }

    #[test]
    fn test_double_ban_keeps_first() {
        let mut user = user();
        let timeline = week();
        user.ban("first", false, Some(timeline)).unwrap();
        assert_eq!(user.ban("second", true, None), Err(UserError::AlreadyBanned));
        assert_eq!(user.ban_reason(), "first");
        assert_eq!(user.ban_end_date(), Some(timeline.to()));
    }

    #[test]
    fn test_unban() {
        let mut user = user();
        assert_eq!(user.unban(), Err(UserError::NotBanned));

        user.ban("abuse", true, None).unwrap();
        user.unban().unwrap();
        assert_eq!(user.ban_status(), &BanStatus::default());
        assert_eq!(user.unban(), Err(UserError::NotBanned));
    }

    #[test]
    fn test_timeline_order() {
        let now = Utc::now();
        assert!(BanTimeline::new(now, now).is_err());
        assert!(BanTimeline::new(now, now - Duration::hours(1)).is_err());
    }
}
