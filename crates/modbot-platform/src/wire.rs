//! Wire formats for the platform REST API

use serde::{Deserialize, Serialize};

use modbot_core::traits::{
    ChannelHandle, ChannelSpec, Embed, OutgoingMessage, OverwriteTarget, PermissionOverwrite,
    RoleHandle,
};
use modbot_core::value_objects::{Permissions, Snowflake};

/// Text channel type code
const GUILD_TEXT: u8 = 0;

const OVERWRITE_ROLE: u8 = 0;
const OVERWRITE_MEMBER: u8 = 1;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleBody {
    pub id: Snowflake,
    pub name: String,
}

impl From<RoleBody> for RoleHandle {
    fn from(role: RoleBody) -> Self {
        Self {
            id: role.id,
            name: role.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRole<'a> {
    pub name: &'a str,
    pub permissions: Permissions,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelBody {
    pub id: Snowflake,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<ChannelBody> for ChannelHandle {
    fn from(channel: ChannelBody) -> Self {
        Self {
            id: channel.id,
            name: channel.name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberBody {
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Overwrite {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl From<&PermissionOverwrite> for Overwrite {
    fn from(o: &PermissionOverwrite) -> Self {
        let kind = match o.target {
            OverwriteTarget::Role(_) => OVERWRITE_ROLE,
            OverwriteTarget::Member(_) => OVERWRITE_MEMBER,
        };
        Self {
            id: o.target.id(),
            kind,
            allow: o.allow,
            deny: o.deny,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateChannel<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<&'a str>,
    pub permission_overwrites: Vec<Overwrite>,
}

impl<'a> From<&'a ChannelSpec> for CreateChannel<'a> {
    fn from(spec: &'a ChannelSpec) -> Self {
        Self {
            name: &spec.name,
            kind: GUILD_TEXT,
            topic: spec.topic.as_deref(),
            permission_overwrites: spec.overwrites.iter().map(Overwrite::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EditChannel {
    pub rate_limit_per_user: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<&'a Embed>,
}

impl<'a> From<&'a OutgoingMessage> for CreateMessage<'a> {
    fn from(m: &'a OutgoingMessage) -> Self {
        Self {
            content: m.content.as_deref(),
            embeds: m.embed.iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
    pub id: Snowflake,
}
