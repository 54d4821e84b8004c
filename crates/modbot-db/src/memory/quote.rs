use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use modbot_core::entities::{NewQuote, Quote};
use modbot_core::error::DomainError;
use modbot_core::traits::{QuoteRepository, RepoResult};
use modbot_core::value_objects::Snowflake;

#[derive(Default)]
struct Quotes {
    next_id: i64,
    rows: Vec<Quote>,
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    inner: Mutex<Quotes>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn create(&self, quote: &NewQuote) -> RepoResult<Quote> {
        let mut quotes = self.inner.lock();
        quotes.next_id += 1;
        let row = Quote {
            id: quotes.next_id,
            community_id: quote.community_id,
            subject_id: quote.subject_id,
            text: quote.text.clone(),
            added_by: quote.added_by,
            created_at: Utc::now(),
        };
        quotes.rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_subject(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Vec<Quote>> {
        let quotes = self.inner.lock();
        Ok(quotes
            .rows
            .iter()
            .filter(|q| q.community_id == community_id && q.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn delete_at_position(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        position: i64,
    ) -> RepoResult<Quote> {
        let mut quotes = self.inner.lock();
        let ids: Vec<i64> = quotes
            .rows
            .iter()
            .filter(|q| q.community_id == community_id && q.subject_id == subject_id)
            .map(|q| q.id)
            .collect();

        let id = usize::try_from(position)
            .ok()
            .and_then(|p| p.checked_sub(1))
            .and_then(|index| ids.get(index).copied())
            .ok_or(DomainError::InvalidIndex {
                position,
                count: ids.len(),
            })?;

        let index = quotes
            .rows
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| DomainError::Persistence(format!("quote {id} vanished")))?;
        Ok(quotes.rows.remove(index))
    }
}
