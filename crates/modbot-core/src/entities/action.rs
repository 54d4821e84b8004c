//! Moderation action entity - one immutable ledger record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Snowflake;

/// Reason stored when the issuer gives none
pub const DEFAULT_REASON: &str = "No reason provided";

/// What kind of sanction a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Warn,
    Kick,
    Ban,
    /// `None` duration means indefinite
    Mute {
        duration_minutes: Option<u32>,
    },
    Unmute,
}

impl ActionKind {
    /// Build a mute kind; a zero duration is indefinite
    pub fn mute(duration_minutes: u32) -> Self {
        Self::Mute {
            duration_minutes: (duration_minutes > 0).then_some(duration_minutes),
        }
    }

    /// Storage label (the `kind` column)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Mute { .. } => "mute",
            Self::Unmute => "unmute",
        }
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        match self {
            Self::Mute { duration_minutes } => *duration_minutes,
            _ => None,
        }
    }

    /// Rebuild from the stored label and duration column
    pub fn from_parts(label: &str, duration_minutes: Option<i32>) -> Option<Self> {
        let kind = match label {
            "warn" => Self::Warn,
            "kick" => Self::Kick,
            "ban" => Self::Ban,
            "mute" => Self::Mute {
                duration_minutes: duration_minutes
                    .and_then(|m| u32::try_from(m).ok())
                    .filter(|m| *m > 0),
            },
            "unmute" => Self::Unmute,
            _ => return None,
        };
        Some(kind)
    }

    #[inline]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warn)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mute {
                duration_minutes: Some(minutes),
            } => write!(f, "mute ({minutes} min)"),
            Self::Mute {
                duration_minutes: None,
            } => f.write_str("mute (indefinite)"),
            other => f.write_str(other.label()),
        }
    }
}

/// A recorded moderation action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationAction {
    /// Monotonic, assigned by the store at insert
    pub id: i64,
    pub community_id: Snowflake,
    pub subject_id: Snowflake,
    pub kind: ActionKind,
    pub reason: String,
    pub issuer_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewModerationAction {
    pub community_id: Snowflake,
    pub subject_id: Snowflake,
    pub kind: ActionKind,
    pub reason: String,
    pub issuer_id: Snowflake,
}

impl NewModerationAction {
    /// Create a new record; blank reasons become [`DEFAULT_REASON`]
    pub fn new(
        community_id: Snowflake,
        subject_id: Snowflake,
        kind: ActionKind,
        reason: Option<String>,
        issuer_id: Snowflake,
    ) -> Self {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REASON.to_string());

        Self {
            community_id,
            subject_id,
            kind,
            reason,
            issuer_id,
        }
    }
}
