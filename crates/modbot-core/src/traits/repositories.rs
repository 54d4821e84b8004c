//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-memory).

use async_trait::async_trait;

use crate::entities::{ModerationAction, NewModerationAction, NewQuote, PendingExpiry, Quote};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Action Ledger
// ============================================================================

#[async_trait]
pub trait ActionRepository: Send + Sync {
    /// Append a record; the store assigns a strictly increasing id
    async fn record(&self, action: &NewModerationAction) -> RepoResult<ModerationAction>;

    /// Warn records for a subject, oldest first
    async fn find_warnings(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Vec<ModerationAction>>;

    /// Delete every Warn record for a subject, returning how many went
    async fn delete_warnings(&self, community_id: Snowflake, subject_id: Snowflake)
        -> RepoResult<u64>;

    /// The `limit` most recent records in a community, newest first
    async fn find_recent(
        &self,
        community_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationAction>>;
}

// ============================================================================
// Quote Store
// ============================================================================

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create(&self, quote: &NewQuote) -> RepoResult<Quote>;

    /// Quotes about a subject in insertion order
    async fn find_by_subject(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Vec<Quote>>;

    /// Atomically resolve a 1-based position in the subject's current list
    /// to its persistent id and delete it.
    ///
    /// Fails with `InvalidIndex` when the position is out of range.
    ///
    /// The position is only meaningful against the current list. A listing
    /// shown earlier may have shifted if quotes were added or removed since;
    /// callers accept that race.
    async fn delete_at_position(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        position: i64,
    ) -> RepoResult<Quote>;
}

// ============================================================================
// Community Settings
// ============================================================================

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_modlog_channel(&self, community_id: Snowflake) -> RepoResult<Option<Snowflake>>;

    async fn set_modlog_channel(&self, community_id: Snowflake, channel_id: Snowflake)
        -> RepoResult<()>;

    async fn get_suggestion_channel(&self, community_id: Snowflake)
        -> RepoResult<Option<Snowflake>>;

    async fn set_suggestion_channel(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<()>;
}

// ============================================================================
// Pending Expiries
// ============================================================================

#[async_trait]
pub trait ExpiryRepository: Send + Sync {
    /// Insert or replace the expiry for its (community, subject)
    async fn upsert(&self, expiry: &PendingExpiry) -> RepoResult<()>;

    /// Delete the stored row for the expiry's (community, subject) only while
    /// it still holds this exact expiry. A row replaced by a later `upsert`
    /// is left alone. Returns whether a row was deleted.
    async fn delete_exact(&self, expiry: &PendingExpiry) -> RepoResult<bool>;

    async fn find_all(&self) -> RepoResult<Vec<PendingExpiry>>;
}
