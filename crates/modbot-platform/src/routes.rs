//! REST route builders

use modbot_core::value_objects::Snowflake;

pub(crate) fn member_role(community: Snowflake, user: Snowflake, role: Snowflake) -> String {
    format!("/guilds/{community}/members/{user}/roles/{role}")
}

pub(crate) fn member(community: Snowflake, user: Snowflake) -> String {
    format!("/guilds/{community}/members/{user}")
}

pub(crate) fn ban(community: Snowflake, user: Snowflake) -> String {
    format!("/guilds/{community}/bans/{user}")
}

pub(crate) fn roles(community: Snowflake) -> String {
    format!("/guilds/{community}/roles")
}

pub(crate) fn guild_channels(community: Snowflake) -> String {
    format!("/guilds/{community}/channels")
}

pub(crate) fn channel(channel: Snowflake) -> String {
    format!("/channels/{channel}")
}

pub(crate) fn channel_permission(channel: Snowflake, target: Snowflake) -> String {
    format!("/channels/{channel}/permissions/{target}")
}

pub(crate) fn channel_messages(channel: Snowflake) -> String {
    format!("/channels/{channel}/messages")
}
