//! Notification - a modlog-bound summary of something that happened

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    /// Embed accent colour
    pub fn color(self) -> u32 {
        match self {
            Self::Info => 0x1A_BC_9C,
            Self::Success => 0x2E_CC_71,
            Self::Warning => 0xE6_7E_22,
            Self::Danger => 0xE7_4C_3C,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub community_id: Snowflake,
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(
        community_id: Snowflake,
        severity: Severity,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            community_id,
            title: title.into(),
            body: body.into(),
            severity,
        }
    }

    pub fn info(community_id: Snowflake, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(community_id, Severity::Info, title, body)
    }

    pub fn success(
        community_id: Snowflake,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(community_id, Severity::Success, title, body)
    }

    pub fn warning(
        community_id: Snowflake,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(community_id, Severity::Warning, title, body)
    }

    pub fn danger(
        community_id: Snowflake,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(community_id, Severity::Danger, title, body)
    }
}
