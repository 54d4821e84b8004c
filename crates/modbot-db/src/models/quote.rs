//! Quote database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for quotes table
#[derive(Debug, Clone, FromRow)]
pub struct QuoteModel {
    pub id: i64,
    pub community_id: i64,
    pub subject_id: i64,
    pub text: String,
    pub added_by: i64,
    pub created_at: DateTime<Utc>,
}
