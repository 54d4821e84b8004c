//! PostgreSQL implementation of QuoteRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::{NewQuote, Quote};
use modbot_core::traits::{QuoteRepository, RepoResult};
use modbot_core::value_objects::Snowflake;

use crate::mappers::QuoteInsert;
use crate::models::QuoteModel;

use super::error::{invalid_index, map_db_error};

/// PostgreSQL implementation of QuoteRepository
#[derive(Clone)]
pub struct PgQuoteRepository {
    pool: PgPool,
}

impl PgQuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteRepository for PgQuoteRepository {
    #[instrument(skip(self, quote), fields(community_id = %quote.community_id))]
    async fn create(&self, quote: &NewQuote) -> RepoResult<Quote> {
        let insert = QuoteInsert::new(quote);

        let model = sqlx::query_as::<_, QuoteModel>(
            r"
            INSERT INTO quotes (community_id, subject_id, text, added_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, community_id, subject_id, text, added_by, created_at
            ",
        )
        .bind(insert.community_id)
        .bind(insert.subject_id)
        .bind(insert.text)
        .bind(insert.added_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn find_by_subject(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Vec<Quote>> {
        let results = sqlx::query_as::<_, QuoteModel>(
            r"
            SELECT id, community_id, subject_id, text, added_by, created_at
            FROM quotes
            WHERE community_id = $1 AND subject_id = $2
            ORDER BY id ASC
            ",
        )
        .bind(community_id.into_inner())
        .bind(subject_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Quote::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_at_position(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
        position: i64,
    ) -> RepoResult<Quote> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Lock the subject's rows so the position resolves against a stable list
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM quotes
            WHERE community_id = $1 AND subject_id = $2
            ORDER BY id ASC
            FOR UPDATE
            ",
        )
        .bind(community_id.into_inner())
        .bind(subject_id.into_inner())
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let id = usize::try_from(position)
            .ok()
            .and_then(|p| p.checked_sub(1))
            .and_then(|index| ids.get(index).copied())
            .ok_or_else(|| invalid_index(position, ids.len()))?;

        let model = sqlx::query_as::<_, QuoteModel>(
            r"
            DELETE FROM quotes WHERE id = $1
            RETURNING id, community_id, subject_id, text, added_by, created_at
            ",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(model.into())
    }
}
