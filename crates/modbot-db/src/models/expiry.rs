use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for pending_expiries table
#[derive(Debug, Clone, FromRow)]
pub struct PendingExpiryModel {
    pub community_id: i64,
    pub subject_id: i64,
    pub role_id: i64,
    pub fire_at: DateTime<Utc>,
}
