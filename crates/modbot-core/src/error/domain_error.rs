//! Domain errors - the failure taxonomy shared by every component

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Invalid Argument
    // =========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid index {position}: choose 1..{count}")]
    InvalidIndex { position: i64, count: usize },

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("{kind} sessions do not accept {action}")]
    UnsupportedAction {
        kind: &'static str,
        action: &'static str,
    },

    // =========================================================================
    // Not Found
    // =========================================================================
    #[error("Session not found: {0}")]
    SessionNotFound(Snowflake),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Setting not configured: {0}")]
    SettingNotConfigured(&'static str),

    // =========================================================================
    // State Preconditions
    // =========================================================================
    #[error("Member is not muted")]
    NotMuted,

    #[error("Session is closed")]
    SessionClosed,

    // =========================================================================
    // Authorization
    // =========================================================================
    #[error("Forbidden: missing {0}")]
    Forbidden(String),

    #[error("Forbidden: only the ticket owner or a moderator may close it")]
    NotTicketOwner,

    // =========================================================================
    // External Failures
    // =========================================================================
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Invalid argument
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidIndex { .. } => "INVALID_INDEX",
            Self::UnknownOption(_) => "UNKNOWN_OPTION",
            Self::UnsupportedAction { .. } => "UNSUPPORTED_ACTION",

            // Not found
            Self::SessionNotFound(_) => "UNKNOWN_SESSION",
            Self::RoleNotFound(_) => "UNKNOWN_ROLE",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::SettingNotConfigured(_) => "SETTING_NOT_CONFIGURED",

            // Preconditions
            Self::NotMuted => "NOT_MUTED",
            Self::SessionClosed => "SESSION_CLOSED",

            // Authorization
            Self::Forbidden(_) | Self::NotTicketOwner => "FORBIDDEN",

            // External
            Self::Platform(_) => "PLATFORM_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound(_)
                | Self::RoleNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::SettingNotConfigured(_)
        )
    }

    /// Check if this is an invalid-argument error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_)
                | Self::InvalidIndex { .. }
                | Self::UnknownOption(_)
                | Self::UnsupportedAction { .. }
        )
    }

    /// Check if a state precondition was violated
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NotMuted | Self::SessionClosed)
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Forbidden(_) | Self::NotTicketOwner)
    }

    /// Check if a remote collaborator failed
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Platform(_) | Self::Persistence(_))
    }
}
