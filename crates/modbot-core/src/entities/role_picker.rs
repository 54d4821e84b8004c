//! Self-service role picker - a fixed set of roles members toggle on themselves

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Markers handed out to picker entries, cycling when there are more roles
const MARKERS: [&str; 10] = ["🔹", "🔸", "🔺", "🔻", "⭐", "🌟", "💎", "🔥", "🎯", "🎵"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerEntry {
    pub marker: String,
    pub role_id: Snowflake,
}

#[derive(Debug, Clone)]
pub struct RolePicker {
    title: String,
    description: String,
    entries: Vec<PickerEntry>,
}

impl RolePicker {
    /// One button per role, same component limit as polls
    pub const MAX_ROLES: usize = 25;

    /// Split a comma-separated list of role ids or `<@&id>` mentions.
    /// Tokens that are neither are skipped.
    pub fn parse_roles(raw: &str) -> Vec<Snowflake> {
        raw.split(',')
            .map(str::trim)
            .filter_map(|token| {
                let id = token
                    .strip_prefix("<@&")
                    .and_then(|rest| rest.strip_suffix('>'))
                    .unwrap_or(token);
                if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Snowflake::parse(id).ok()
            })
            .collect()
    }

    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        role_ids: Vec<Snowflake>,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(DomainError::InvalidArgument(
                "role picker title must not be empty".into(),
            ));
        }

        let mut entries: Vec<PickerEntry> = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            if entries.iter().any(|e| e.role_id == role_id) {
                continue;
            }
            entries.push(PickerEntry {
                marker: MARKERS[entries.len() % MARKERS.len()].to_string(),
                role_id,
            });
        }

        if entries.is_empty() {
            return Err(DomainError::InvalidArgument(
                "a role picker needs at least one valid role".into(),
            ));
        }
        if entries.len() > Self::MAX_ROLES {
            return Err(DomainError::InvalidArgument(format!(
                "a role picker offers at most {} roles",
                Self::MAX_ROLES
            )));
        }

        Ok(Self {
            title,
            description: description.into().trim().to_string(),
            entries,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn offers(&self, role_id: Snowflake) -> bool {
        self.entries.iter().any(|e| e.role_id == role_id)
    }

    /// Message body: the description followed by one `marker - role` line per entry
    pub fn render(&self) -> String {
        let lines = self
            .entries
            .iter()
            .map(|e| format!("{} - <@&{}>", e.marker, e.role_id))
            .collect::<Vec<_>>()
            .join("\n");
        if self.description.is_empty() {
            lines
        } else {
            format!("{}\n\n{lines}", self.description)
        }
    }
}
