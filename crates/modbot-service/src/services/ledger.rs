//! Ledger service
//!
//! Read and maintenance operations over the moderation-action ledger.
//! Recording happens through the moderation service, which owns the side
//! effects that go with each record.

use modbot_core::events::Notification;
use modbot_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::ModerationActionResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::outcome::Outcome;

pub struct LedgerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LedgerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Warn records for a subject, oldest first
    #[instrument(skip(self))]
    pub async fn list_warnings(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> ServiceResult<Vec<ModerationActionResponse>> {
        let warnings = self
            .ctx
            .action_repo()
            .find_warnings(community_id, subject_id)
            .await?;
        Ok(warnings.iter().map(ModerationActionResponse::from).collect())
    }

    /// Delete every warning for a subject; other kinds are untouched
    #[instrument(skip(self))]
    pub async fn clear_warnings(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<u64>> {
        let removed = self
            .ctx
            .action_repo()
            .delete_warnings(community_id, subject_id)
            .await?;

        info!(community_id = %community_id, subject_id = %subject_id, removed, "Warnings cleared");

        Ok(Outcome::notify(
            removed,
            Notification::info(
                community_id,
                "Warnings Cleared",
                format!("**User:** <@{subject_id}>\n**Moderator:** <@{moderator_id}>\n**Removed:** {removed}"),
            ),
        ))
    }

    /// The `limit` most recent records, newest first
    #[instrument(skip(self))]
    pub async fn recent_actions(
        &self,
        community_id: Snowflake,
        limit: i64,
    ) -> ServiceResult<Vec<ModerationActionResponse>> {
        if limit < 1 {
            return Err(DomainError::InvalidArgument(format!(
                "limit must be a positive integer, got {limit}"
            ))
            .into());
        }

        let actions = self
            .ctx
            .action_repo()
            .find_recent(community_id, limit)
            .await?;
        Ok(actions.iter().map(ModerationActionResponse::from).collect())
    }
}
