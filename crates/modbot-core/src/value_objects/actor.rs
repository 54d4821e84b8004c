//! Actor - the member on whose behalf an operation runs

use serde::{Deserialize, Serialize};

use super::{Permissions, Snowflake};
use crate::error::DomainError;

/// Invoking member with the permissions the dispatch layer resolved for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Snowflake,
    #[serde(default)]
    pub permissions: Permissions,
}

impl Actor {
    pub fn new(user_id: Snowflake, permissions: Permissions) -> Self {
        Self {
            user_id,
            permissions,
        }
    }

    /// Moderation authority: may end polls and close any ticket
    #[inline]
    pub fn is_moderator(&self) -> bool {
        self.permissions.has(Permissions::MANAGE_MESSAGES)
    }

    /// Fail with `Forbidden` unless the actor holds `required`
    pub fn require(&self, required: Permissions) -> Result<(), DomainError> {
        if self.permissions.has(required) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(required.list().join(", ")))
        }
    }
}
