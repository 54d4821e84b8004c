//! Ticket state - a private support channel bound to its requester

use crate::value_objects::{Actor, Snowflake};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub owner_id: Snowflake,
    pub channel_id: Snowflake,
    pub channel_name: String,
}

impl Ticket {
    pub const NAME_PREFIX: &'static str = "ticket-";

    pub fn new(owner_id: Snowflake, channel_id: Snowflake, channel_name: impl Into<String>) -> Self {
        Self {
            owner_id,
            channel_id,
            channel_name: channel_name.into(),
        }
    }

    /// `ticket-<name>` reduced to characters valid in a channel name
    pub fn requested_name(requester_name: &str) -> String {
        let mut slug = String::with_capacity(requester_name.len());
        for ch in requester_name.trim().chars().flat_map(char::to_lowercase) {
            if ch.is_alphanumeric() || ch == '_' {
                slug.push(ch);
            } else if (ch == '-' || ch.is_whitespace()) && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_matches('-');
        if slug.is_empty() {
            format!("{}member", Self::NAME_PREFIX)
        } else {
            format!("{}{slug}", Self::NAME_PREFIX)
        }
    }

    /// First of `name`, `name-1`, `name-2`, ... not present in `existing`
    pub fn unique_name<'a, I>(requested: &str, existing: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let taken: std::collections::HashSet<&str> = existing.into_iter().collect();
        if !taken.contains(requested) {
            return requested.to_string();
        }
        (1u32..)
            .map(|n| format!("{requested}-{n}"))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or_else(|| requested.to_string())
    }

    /// Moderators and the original requester may close
    pub fn may_close(&self, actor: &Actor) -> bool {
        actor.is_moderator() || actor.user_id == self.owner_id
    }
}
