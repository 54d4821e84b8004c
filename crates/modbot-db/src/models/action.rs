//! Moderation action database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for moderation_actions table
#[derive(Debug, Clone, FromRow)]
pub struct ModerationActionModel {
    pub id: i64,
    pub community_id: i64,
    pub subject_id: i64,
    pub kind: String,
    pub duration_minutes: Option<i32>,
    pub reason: String,
    pub issuer_id: i64,
    pub created_at: DateTime<Utc>,
}
