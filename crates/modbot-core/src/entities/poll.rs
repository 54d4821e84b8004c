//! Poll state - independent per-option vote toggles

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Vote count for a single option, in option order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTally {
    pub label: String,
    pub votes: usize,
}

#[derive(Debug, Clone)]
struct PollOption {
    label: String,
    voters: HashSet<Snowflake>,
}

/// A poll question with its options and voters
#[derive(Debug, Clone)]
pub struct Poll {
    question: String,
    options: Vec<PollOption>,
}

impl Poll {
    pub const MIN_OPTIONS: usize = 2;
    /// One button per option; the platform allows 25 components per message
    pub const MAX_OPTIONS: usize = 25;

    /// Split a `"A | B | C"` option string
    pub fn parse_options(raw: &str) -> Vec<String> {
        raw.split('|')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    pub fn new(question: impl Into<String>, labels: Vec<String>) -> Result<Self, DomainError> {
        let question = question.into().trim().to_string();
        if question.is_empty() {
            return Err(DomainError::InvalidArgument(
                "poll question must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.trim().to_string();
            if label.is_empty() {
                continue;
            }
            if !seen.insert(label.clone()) {
                return Err(DomainError::InvalidArgument(format!(
                    "duplicate poll option: {label}"
                )));
            }
            options.push(PollOption {
                label,
                voters: HashSet::new(),
            });
        }

        if !(Self::MIN_OPTIONS..=Self::MAX_OPTIONS).contains(&options.len()) {
            return Err(DomainError::InvalidArgument(format!(
                "a poll needs between {} and {} options",
                Self::MIN_OPTIONS,
                Self::MAX_OPTIONS
            )));
        }

        Ok(Self { question, options })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.label.as_str())
    }

    /// Add the voter to `option`, or remove them if already present.
    /// Returns whether the voter is now counted under that option.
    pub fn toggle_vote(&mut self, voter: Snowflake, option: &str) -> Result<bool, DomainError> {
        let entry = self
            .options
            .iter_mut()
            .find(|o| o.label == option.trim())
            .ok_or_else(|| DomainError::UnknownOption(option.to_string()))?;

        if entry.voters.remove(&voter) {
            Ok(false)
        } else {
            entry.voters.insert(voter);
            Ok(true)
        }
    }

    pub fn tally(&self) -> Vec<OptionTally> {
        self.options
            .iter()
            .map(|o| OptionTally {
                label: o.label.clone(),
                votes: o.voters.len(),
            })
            .collect()
    }
}
