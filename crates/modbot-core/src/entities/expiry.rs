//! Pending expiry - the scheduled reversal of a timed mute

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Identity of a sanction slot: one per (community, subject)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpiryKey {
    pub community_id: Snowflake,
    pub subject_id: Snowflake,
}

/// An armed timed mute waiting to be reversed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingExpiry {
    pub community_id: Snowflake,
    pub subject_id: Snowflake,
    pub role_id: Snowflake,
    pub fire_at: DateTime<Utc>,
}

impl PendingExpiry {
    /// Expiry `minutes` after `now`
    pub fn after_minutes(
        community_id: Snowflake,
        subject_id: Snowflake,
        role_id: Snowflake,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            community_id,
            subject_id,
            role_id,
            fire_at: now + Duration::minutes(i64::from(minutes)),
        }
    }

    #[inline]
    pub fn key(&self) -> ExpiryKey {
        ExpiryKey {
            community_id: self.community_id,
            subject_id: self.subject_id,
        }
    }

    /// Time left before firing; zero once overdue
    pub fn remaining(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.fire_at - now).to_std().unwrap_or_default()
    }

    #[inline]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.fire_at
    }
}
