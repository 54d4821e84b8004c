//! Quote service

use modbot_core::entities::NewQuote;
use modbot_core::events::Notification;
use modbot_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::QuoteResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::outcome::Outcome;

pub struct QuoteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> QuoteService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Attribute a quote to a member. The response carries the quote's
    /// position in the subject's list at the time it was added.
    #[instrument(skip(self, text))]
    pub async fn add(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        text: &str,
        added_by: Snowflake,
    ) -> ServiceResult<Outcome<QuoteResponse>> {
        let new_quote = NewQuote::new(community_id, subject_id, text, added_by);
        if new_quote.text.is_empty() {
            return Err(DomainError::InvalidArgument("quote text must not be empty".into()).into());
        }

        let quote = self.ctx.quote_repo().create(&new_quote).await?;
        let listed = self
            .ctx
            .quote_repo()
            .find_by_subject(community_id, subject_id)
            .await?;
        let position = listed
            .iter()
            .position(|q| q.id == quote.id)
            .map_or(listed.len(), |index| index + 1);

        info!(community_id = %community_id, subject_id = %subject_id, quote_id = quote.id, "Quote added");

        let body = format!(
            "**User:** <@{subject_id}>\n**Added by:** <@{added_by}>\n**Quote:** {}",
            quote.text
        );
        let response = QuoteResponse {
            position,
            id: quote.id,
            subject_id,
            text: quote.text,
            added_by,
            created_at: quote.created_at,
        };
        Ok(Outcome::notify(
            response,
            Notification::info(community_id, "Quote Added", body),
        ))
    }

    /// A subject's quotes numbered from 1 in insertion order
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> ServiceResult<Vec<QuoteResponse>> {
        let quotes = self
            .ctx
            .quote_repo()
            .find_by_subject(community_id, subject_id)
            .await?;
        Ok(QuoteResponse::numbered(quotes))
    }

    /// Remove the quote at a 1-based position of the subject's current list
    #[instrument(skip(self))]
    pub async fn remove_by_position(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        position: i64,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<QuoteResponse>> {
        let removed = self
            .ctx
            .quote_repo()
            .delete_at_position(community_id, subject_id, position)
            .await?;

        info!(community_id = %community_id, subject_id = %subject_id, quote_id = removed.id, "Quote removed");

        let body = format!(
            "**User:** <@{subject_id}>\n**Moderator:** <@{moderator_id}>\n**Quote:** {}",
            removed.text
        );
        let response = QuoteResponse {
            position: usize::try_from(position).unwrap_or_default(),
            id: removed.id,
            subject_id,
            text: removed.text,
            added_by: removed.added_by,
            created_at: removed.created_at,
        };
        Ok(Outcome::notify(
            response,
            Notification::warning(community_id, "Quote Removed", body),
        ))
    }
}
