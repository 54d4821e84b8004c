use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for community_settings table
#[derive(Debug, Clone, FromRow)]
pub struct CommunitySettingsModel {
    pub community_id: i64,
    pub modlog_channel_id: Option<i64>,
    pub suggestion_channel_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}
