//! Platform port - the membership, role, channel and message mutations the
//! core requests. Every call is a fallible remote call; nothing is retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::Notification;
use crate::value_objects::{Permissions, Snowflake};

/// A remote platform call failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PlatformError {
    /// HTTP status when the platform answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl From<PlatformError> for DomainError {
    fn from(err: PlatformError) -> Self {
        match err.status {
            Some(status) => DomainError::Platform(format!("{} (status {status})", err.message)),
            None => DomainError::Platform(err.message),
        }
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHandle {
    pub id: Snowflake,
    pub name: String,
}

/// Result of `create_role_if_absent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredRole {
    pub role: RoleHandle,
    /// `false` when an existing role was reused unmodified
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHandle {
    pub id: Snowflake,
    pub name: String,
}

/// Whom a permission overwrite applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum OverwriteTarget {
    Role(Snowflake),
    Member(Snowflake),
}

impl OverwriteTarget {
    /// The implicit everyone role shares the community's id
    pub fn everyone(community_id: Snowflake) -> Self {
        Self::Role(community_id)
    }

    pub fn id(&self) -> Snowflake {
        match self {
            Self::Role(id) | Self::Member(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub target: OverwriteTarget,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl PermissionOverwrite {
    pub fn allow(target: OverwriteTarget, allow: Permissions) -> Self {
        Self {
            target,
            allow,
            deny: Permissions::empty(),
        }
    }

    pub fn deny(target: OverwriteTarget, deny: Permissions) -> Self {
        Self {
            target,
            allow: Permissions::empty(),
            deny,
        }
    }
}

/// Request to create a text channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub name: String,
    pub topic: Option<String>,
    pub overwrites: Vec<PermissionOverwrite>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub embed: Option<Embed>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embed: None,
        }
    }

    pub fn embed(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            content: None,
            embed: Some(Embed {
                title: title.into(),
                description: description.into(),
                color,
                footer: None,
            }),
        }
    }

    /// Attach a footer line; a text-only message is left unchanged
    pub fn with_footer(mut self, text: impl Into<String>) -> Self {
        if let Some(embed) = self.embed.as_mut() {
            embed.footer = Some(EmbedFooter { text: text.into() });
        }
        self
    }
}

impl From<&Notification> for OutgoingMessage {
    fn from(n: &Notification) -> Self {
        Self::embed(n.title.clone(), n.body.clone(), n.severity.color())
    }
}

#[async_trait]
pub trait PlatformClient: Send + Sync {
    // Membership
    async fn grant_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    async fn revoke_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    async fn member_has_role(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<bool>;

    async fn kick_member(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    async fn ban_member(
        &self,
        community_id: Snowflake,
        user_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    // Roles
    async fn find_role(&self, community_id: Snowflake, name: &str)
        -> PlatformResult<Option<RoleHandle>>;

    /// Return the role named `name`, creating it (with no permissions) if absent
    async fn create_role_if_absent(
        &self,
        community_id: Snowflake,
        name: &str,
    ) -> PlatformResult<EnsuredRole>;

    // Channels
    async fn list_channels(&self, community_id: Snowflake) -> PlatformResult<Vec<ChannelHandle>>;

    async fn create_channel(
        &self,
        community_id: Snowflake,
        spec: &ChannelSpec,
    ) -> PlatformResult<ChannelHandle>;

    async fn delete_channel(&self, channel_id: Snowflake, reason: &str) -> PlatformResult<()>;

    async fn set_channel_permission(
        &self,
        channel_id: Snowflake,
        overwrite: &PermissionOverwrite,
    ) -> PlatformResult<()>;

    /// Per-member delay between messages in a channel; zero turns it off
    async fn set_slowmode(
        &self,
        channel_id: Snowflake,
        seconds: u32,
        reason: &str,
    ) -> PlatformResult<()>;

    // Messages
    /// Post a message, returning its id
    async fn send_message(
        &self,
        channel_id: Snowflake,
        message: &OutgoingMessage,
    ) -> PlatformResult<Snowflake>;
}
