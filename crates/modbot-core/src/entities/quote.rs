//! Quote entity

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// A quote attributed to a community member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub id: i64,
    pub community_id: Snowflake,
    pub subject_id: Snowflake,
    pub text: String,
    pub added_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the quote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuote {
    pub community_id: Snowflake,
    pub subject_id: Snowflake,
    pub text: String,
    pub added_by: Snowflake,
}

impl NewQuote {
    pub fn new(
        community_id: Snowflake,
        subject_id: Snowflake,
        text: impl Into<String>,
        added_by: Snowflake,
    ) -> Self {
        Self {
            community_id,
            subject_id,
            text: text.into().trim().to_string(),
            added_by,
        }
    }
}
