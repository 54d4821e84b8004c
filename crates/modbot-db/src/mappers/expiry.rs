//! PendingExpiry entity <-> model mapper

use chrono::{DateTime, Utc};
use modbot_core::entities::PendingExpiry;
use modbot_core::value_objects::Snowflake;

use crate::models::PendingExpiryModel;

impl From<PendingExpiryModel> for PendingExpiry {
    fn from(model: PendingExpiryModel) -> Self {
        PendingExpiry {
            community_id: Snowflake::new(model.community_id),
            subject_id: Snowflake::new(model.subject_id),
            role_id: Snowflake::new(model.role_id),
            fire_at: model.fire_at,
        }
    }
}

pub struct ExpiryInsert {
    pub community_id: i64,
    pub subject_id: i64,
    pub role_id: i64,
    pub fire_at: DateTime<Utc>,
}

impl ExpiryInsert {
    pub fn new(expiry: &PendingExpiry) -> Self {
        Self {
            community_id: expiry.community_id.into_inner(),
            subject_id: expiry.subject_id.into_inner(),
            role_id: expiry.role_id.into_inner(),
            fire_at: expiry.fire_at,
        }
    }
}
