//! PostgreSQL implementation of ExpiryRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::PendingExpiry;
use modbot_core::traits::{ExpiryRepository, RepoResult};

use crate::mappers::ExpiryInsert;
use crate::models::PendingExpiryModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ExpiryRepository
#[derive(Clone)]
pub struct PgExpiryRepository {
    pool: PgPool,
}

impl PgExpiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpiryRepository for PgExpiryRepository {
    #[instrument(skip(self, expiry), fields(community_id = %expiry.community_id, subject_id = %expiry.subject_id))]
    async fn upsert(&self, expiry: &PendingExpiry) -> RepoResult<()> {
        let insert = ExpiryInsert::new(expiry);

        sqlx::query(
            r"
            INSERT INTO pending_expiries (community_id, subject_id, role_id, fire_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (community_id, subject_id)
            DO UPDATE SET role_id = EXCLUDED.role_id, fire_at = EXCLUDED.fire_at
            ",
        )
        .bind(insert.community_id)
        .bind(insert.subject_id)
        .bind(insert.role_id)
        .bind(insert.fire_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, expiry), fields(community_id = %expiry.community_id, subject_id = %expiry.subject_id))]
    async fn delete_exact(&self, expiry: &PendingExpiry) -> RepoResult<bool> {
        let key = ExpiryInsert::new(expiry);

        let result = sqlx::query(
            r"
            DELETE FROM pending_expiries
            WHERE community_id = $1 AND subject_id = $2 AND role_id = $3 AND fire_at = $4
            ",
        )
        .bind(key.community_id)
        .bind(key.subject_id)
        .bind(key.role_id)
        .bind(key.fire_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<PendingExpiry>> {
        let results = sqlx::query_as::<_, PendingExpiryModel>(
            r"
            SELECT community_id, subject_id, role_id, fire_at
            FROM pending_expiries
            ORDER BY fire_at ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PendingExpiry::from).collect())
    }
}
