//! Command payloads
//!
//! Every command the dispatch layer can send, as one serde-tagged enum.
//! Payload structs implement `Validate` for shape checks; domain rules
//! (positive limits, non-negative durations, option counts) are enforced by
//! the services so they surface as domain errors.

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use modbot_core::entities::ActionKind;
use modbot_core::value_objects::{Actor, Permissions, Snowflake};

fn default_recent_limit() -> i64 {
    10
}

// ============================================================================
// Moderation
// ============================================================================

/// A command aimed at one member
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubjectRequest {
    pub subject_id: Snowflake,
}

/// Warn, kick or ban
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SanctionRequest {
    pub subject_id: Snowflake,

    #[validate(length(max = 512, message = "Reason must be at most 512 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MuteRequest {
    pub subject_id: Snowflake,

    /// Zero means indefinite
    #[serde(default)]
    pub duration_minutes: i64,

    #[validate(length(max = 512, message = "Reason must be at most 512 characters"))]
    pub reason: Option<String>,
}

/// Ledger entry without any platform side effect
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordActionRequest {
    pub subject_id: Snowflake,

    pub action: ActionKind,

    #[validate(length(max = 512, message = "Reason must be at most 512 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecentActionsRequest {
    /// Any positive count; the ledger rejects anything below one
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

/// Toggle, add or remove one role on one member
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MemberRoleRequest {
    pub subject_id: Snowflake,
    pub role_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChannelRequest {
    pub channel_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SlowmodeRequest {
    pub channel_id: Snowflake,

    /// Zero turns slowmode off
    #[validate(range(max = 21_600, message = "Slowmode must be at most 21600 seconds"))]
    pub seconds: u32,
}

// ============================================================================
// Sessions
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionRequest {
    pub session_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartPollRequest {
    /// Channel the poll is posted in
    pub channel_id: Snowflake,

    #[validate(length(min = 1, max = 256, message = "Question must be 1-256 characters"))]
    pub question: String,

    /// Option labels separated by `|`
    #[validate(length(min = 1, max = 2000, message = "Options must be 1-2000 characters"))]
    pub options: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleVoteRequest {
    pub session_id: Snowflake,

    #[validate(length(min = 1, max = 100, message = "Option must be 1-100 characters"))]
    pub option: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartGiveawayRequest {
    pub channel_id: Snowflake,

    #[validate(length(min = 1, max = 256, message = "Prize must be 1-256 characters"))]
    pub prize: String,

    #[validate(range(max = 2_592_000, message = "Duration must be at most 30 days"))]
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRolePickerRequest {
    pub channel_id: Snowflake,

    #[validate(length(min = 1, max = 256, message = "Title must be 1-256 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,

    /// Role ids or `<@&id>` mentions separated by commas
    #[validate(length(min = 1, max = 2000, message = "Roles must be 1-2000 characters"))]
    pub roles: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PickRoleRequest {
    pub session_id: Snowflake,
    pub role_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct OpenTicketRequest {
    /// Display name used for the channel name; the user id when absent
    #[validate(length(max = 90, message = "Name must be at most 90 characters"))]
    pub name: Option<String>,
}

// ============================================================================
// Quotes and community
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddQuoteRequest {
    pub subject_id: Snowflake,

    #[validate(length(min = 1, max = 2000, message = "Quote must be 1-2000 characters"))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RemoveQuoteRequest {
    pub subject_id: Snowflake,
    /// 1-based position in the subject's current list
    pub position: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnnounceRequest {
    pub channel_id: Snowflake,

    #[validate(length(min = 1, max = 256, message = "Title must be 1-256 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SuggestRequest {
    #[validate(length(min = 1, max = 2000, message = "Suggestion must be 1-2000 characters"))]
    pub text: String,
}

// ============================================================================
// Command
// ============================================================================

/// Every operation the command surface exposes
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    Warn(SanctionRequest),
    ListWarnings(SubjectRequest),
    ClearWarnings(SubjectRequest),
    Mute(MuteRequest),
    Unmute(SubjectRequest),
    Kick(SanctionRequest),
    Ban(SanctionRequest),
    RecordGenericAction(RecordActionRequest),
    RecentActions(RecentActionsRequest),
    ToggleRole(MemberRoleRequest),
    AddRole(MemberRoleRequest),
    RemoveRole(MemberRoleRequest),
    LockChannel(ChannelRequest),
    UnlockChannel(ChannelRequest),
    Slowmode(SlowmodeRequest),
    OpenTicket(OpenTicketRequest),
    CloseTicket(SessionRequest),
    PostTicketPanel(ChannelRequest),
    StartPoll(StartPollRequest),
    ToggleVote(ToggleVoteRequest),
    EndPoll(SessionRequest),
    StartGiveaway(StartGiveawayRequest),
    EnterGiveaway(SessionRequest),
    CreateRolePicker(CreateRolePickerRequest),
    PickRole(PickRoleRequest),
    AddQuote(AddQuoteRequest),
    ListQuotes(SubjectRequest),
    RemoveQuoteByPosition(RemoveQuoteRequest),
    SetModlogChannel(ChannelRequest),
    SetSuggestionChannel(ChannelRequest),
    Suggest(SuggestRequest),
    Announce(AnnounceRequest),
}

impl Command {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Self::Warn(_) => "warn",
            Self::ListWarnings(_) => "list-warnings",
            Self::ClearWarnings(_) => "clear-warnings",
            Self::Mute(_) => "mute",
            Self::Unmute(_) => "unmute",
            Self::Kick(_) => "kick",
            Self::Ban(_) => "ban",
            Self::RecordGenericAction(_) => "record-generic-action",
            Self::RecentActions(_) => "recent-actions",
            Self::ToggleRole(_) => "toggle-role",
            Self::AddRole(_) => "add-role",
            Self::RemoveRole(_) => "remove-role",
            Self::LockChannel(_) => "lock-channel",
            Self::UnlockChannel(_) => "unlock-channel",
            Self::Slowmode(_) => "slowmode",
            Self::OpenTicket(_) => "open-ticket",
            Self::CloseTicket(_) => "close-ticket",
            Self::PostTicketPanel(_) => "post-ticket-panel",
            Self::StartPoll(_) => "start-poll",
            Self::ToggleVote(_) => "toggle-vote",
            Self::EndPoll(_) => "end-poll",
            Self::StartGiveaway(_) => "start-giveaway",
            Self::EnterGiveaway(_) => "enter-giveaway",
            Self::CreateRolePicker(_) => "create-role-picker",
            Self::PickRole(_) => "pick-role",
            Self::AddQuote(_) => "add-quote",
            Self::ListQuotes(_) => "list-quotes",
            Self::RemoveQuoteByPosition(_) => "remove-quote-by-position",
            Self::SetModlogChannel(_) => "set-modlog-channel",
            Self::SetSuggestionChannel(_) => "set-suggestion-channel",
            Self::Suggest(_) => "suggest",
            Self::Announce(_) => "announce",
        }
    }

    /// Permission the invoking member must hold before the command runs.
    ///
    /// `end-poll` and `close-ticket` return `None`: their authority depends on
    /// the session and is checked by the session engine.
    pub fn required_permission(&self) -> Option<Permissions> {
        match self {
            Self::Warn(_) | Self::Kick(_) | Self::ListWarnings(_) | Self::RecordGenericAction(_) => {
                Some(Permissions::KICK_MEMBERS)
            }
            Self::Ban(_) => Some(Permissions::BAN_MEMBERS),
            Self::Mute(_)
            | Self::Unmute(_)
            | Self::ToggleRole(_)
            | Self::AddRole(_)
            | Self::RemoveRole(_)
            | Self::CreateRolePicker(_) => Some(Permissions::MANAGE_ROLES),
            Self::ClearWarnings(_)
            | Self::RecentActions(_)
            | Self::StartGiveaway(_)
            | Self::PostTicketPanel(_)
            | Self::SetModlogChannel(_)
            | Self::SetSuggestionChannel(_)
            | Self::Announce(_) => Some(Permissions::ADMINISTRATOR),
            Self::StartPoll(_) | Self::RemoveQuoteByPosition(_) => {
                Some(Permissions::MANAGE_MESSAGES)
            }
            Self::LockChannel(_) | Self::UnlockChannel(_) | Self::Slowmode(_) => {
                Some(Permissions::MANAGE_CHANNELS)
            }
            Self::OpenTicket(_)
            | Self::CloseTicket(_)
            | Self::ToggleVote(_)
            | Self::EndPoll(_)
            | Self::EnterGiveaway(_)
            | Self::PickRole(_)
            | Self::AddQuote(_)
            | Self::ListQuotes(_)
            | Self::Suggest(_) => None,
        }
    }

    /// Run the payload's field validation
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Warn(r) | Self::Kick(r) | Self::Ban(r) => r.validate(),
            Self::ListWarnings(r)
            | Self::ClearWarnings(r)
            | Self::Unmute(r)
            | Self::ListQuotes(r) => r.validate(),
            Self::Mute(r) => r.validate(),
            Self::RecordGenericAction(r) => r.validate(),
            Self::RecentActions(r) => r.validate(),
            Self::ToggleRole(r) | Self::AddRole(r) | Self::RemoveRole(r) => r.validate(),
            Self::LockChannel(r)
            | Self::UnlockChannel(r)
            | Self::PostTicketPanel(r)
            | Self::SetModlogChannel(r)
            | Self::SetSuggestionChannel(r) => r.validate(),
            Self::Slowmode(r) => r.validate(),
            Self::OpenTicket(r) => r.validate(),
            Self::CloseTicket(r) | Self::EndPoll(r) | Self::EnterGiveaway(r) => r.validate(),
            Self::StartPoll(r) => r.validate(),
            Self::ToggleVote(r) => r.validate(),
            Self::StartGiveaway(r) => r.validate(),
            Self::CreateRolePicker(r) => r.validate(),
            Self::PickRole(r) => r.validate(),
            Self::AddQuote(r) => r.validate(),
            Self::RemoveQuoteByPosition(r) => r.validate(),
            Self::Suggest(r) => r.validate(),
            Self::Announce(r) => r.validate(),
        }
    }
}

/// Body of a dispatched command: who invoked it and what they asked for
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchRequest {
    pub actor: Actor,
    pub command: Command,
}

impl Validate for DispatchRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.command.validate()
    }
}
