//! Response DTOs
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use modbot_core::entities::{OptionTally, PickerEntry, SessionOutcome};
use modbot_core::events::Notification;
use modbot_core::value_objects::Snowflake;

// ============================================================================
// Command Outcome
// ============================================================================

/// What a dispatched command produced
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub payload: CommandPayload,
    /// Modlog notifications emitted as side effects
    pub notifications: Vec<Notification>,
}

/// Result payload, tagged by shape
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandPayload {
    Action(ModerationActionResponse),
    Actions { actions: Vec<ModerationActionResponse> },
    Mute(MuteResponse),
    WarningsCleared { removed: u64 },
    RoleToggled(RoleToggledResponse),
    ChannelLock(ChannelLockResponse),
    Slowmode(SlowmodeResponse),
    PollStarted(PollStartedResponse),
    GiveawayStarted(GiveawayStartedResponse),
    TicketOpened(TicketOpenedResponse),
    TicketPanelPosted(MessagePostedResponse),
    RolePickerStarted(RolePickerStartedResponse),
    Session(SessionOutcome),
    Quote(QuoteResponse),
    Quotes { quotes: Vec<QuoteResponse> },
    SettingUpdated(SettingUpdatedResponse),
    SuggestionPosted(MessagePostedResponse),
    AnnouncementPosted(MessagePostedResponse),
}

// ============================================================================
// Moderation Responses
// ============================================================================

/// A ledger record
#[derive(Debug, Clone, Serialize)]
pub struct ModerationActionResponse {
    pub id: i64,
    pub community_id: Snowflake,
    pub subject_id: Snowflake,
    /// `warn`, `kick`, `ban`, `mute` or `unmute`
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Human-readable kind, e.g. `mute (5 min)`
    pub summary: String,
    pub reason: String,
    pub issuer_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MuteResponse {
    pub action: ModerationActionResponse,
    pub role_id: Snowflake,
    /// When the automatic unmute fires; absent for indefinite mutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleToggledResponse {
    pub subject_id: Snowflake,
    pub role_id: Snowflake,
    /// `true` when the role was granted, `false` when removed
    pub added: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelLockResponse {
    pub channel_id: Snowflake,
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlowmodeResponse {
    pub channel_id: Snowflake,
    /// Zero when slowmode was turned off
    pub seconds: u32,
}

// ============================================================================
// Session Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PollStartedResponse {
    pub session_id: Snowflake,
    pub channel_id: Snowflake,
    pub question: String,
    pub options: Vec<OptionTally>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GiveawayStartedResponse {
    pub session_id: Snowflake,
    pub channel_id: Snowflake,
    pub prize: String,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketOpenedResponse {
    pub session_id: Snowflake,
    pub channel_id: Snowflake,
    pub channel_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RolePickerStartedResponse {
    pub session_id: Snowflake,
    pub channel_id: Snowflake,
    pub title: String,
    pub roles: Vec<PickerEntry>,
}

// ============================================================================
// Quote and Settings Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteResponse {
    /// 1-based position in the subject's list at the time of the query
    pub position: usize,
    pub id: i64,
    pub subject_id: Snowflake,
    pub text: String,
    pub added_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingUpdatedResponse {
    pub setting: &'static str,
    pub channel_id: Snowflake,
}

/// A message the bot posted on someone's behalf
#[derive(Debug, Clone, Serialize)]
pub struct MessagePostedResponse {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}
