//! Giveaway state - an entrant set with a deadline

use chrono::{DateTime, Duration, Utc};
use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::value_objects::Snowflake;

#[derive(Debug, Clone)]
pub struct Giveaway {
    prize: String,
    entrants: HashSet<Snowflake>,
    duration_seconds: u64,
    started_at: DateTime<Utc>,
}

impl Giveaway {
    pub fn new(prize: impl Into<String>, duration_seconds: u64, started_at: DateTime<Utc>) -> Self {
        Self {
            prize: prize.into().trim().to_string(),
            entrants: HashSet::new(),
            duration_seconds,
            started_at,
        }
    }

    pub fn prize(&self) -> &str {
        &self.prize
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        i64::try_from(self.duration_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| self.started_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    /// Returns `true` if the user was newly added
    pub fn enter(&mut self, user_id: Snowflake) -> bool {
        self.entrants.insert(user_id)
    }

    pub fn entrant_count(&self) -> usize {
        self.entrants.len()
    }

    pub fn has_entered(&self, user_id: Snowflake) -> bool {
        self.entrants.contains(&user_id)
    }

    /// Pick one entrant uniformly at random
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Snowflake> {
        self.entrants.iter().copied().choose(rng)
    }
}
