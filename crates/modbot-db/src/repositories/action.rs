//! PostgreSQL implementation of ActionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::entities::{ModerationAction, NewModerationAction};
use modbot_core::traits::{ActionRepository, RepoResult};
use modbot_core::value_objects::Snowflake;

use crate::mappers::ActionInsert;
use crate::models::ModerationActionModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ActionRepository
#[derive(Clone)]
pub struct PgActionRepository {
    pool: PgPool,
}

impl PgActionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionRepository for PgActionRepository {
    #[instrument(skip(self, action), fields(community_id = %action.community_id, kind = action.kind.label()))]
    async fn record(&self, action: &NewModerationAction) -> RepoResult<ModerationAction> {
        let insert = ActionInsert::new(action);

        let model = sqlx::query_as::<_, ModerationActionModel>(
            r"
            INSERT INTO moderation_actions
                (community_id, subject_id, kind, duration_minutes, reason, issuer_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, community_id, subject_id, kind, duration_minutes, reason,
                      issuer_id, created_at
            ",
        )
        .bind(insert.community_id)
        .bind(insert.subject_id)
        .bind(insert.kind)
        .bind(insert.duration_minutes)
        .bind(insert.reason)
        .bind(insert.issuer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        ModerationAction::try_from(model)
    }

    #[instrument(skip(self))]
    async fn find_warnings(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Vec<ModerationAction>> {
        let results = sqlx::query_as::<_, ModerationActionModel>(
            r"
            SELECT id, community_id, subject_id, kind, duration_minutes, reason,
                   issuer_id, created_at
            FROM moderation_actions
            WHERE community_id = $1 AND subject_id = $2 AND kind = 'warn'
            ORDER BY id ASC
            ",
        )
        .bind(community_id.into_inner())
        .bind(subject_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(ModerationAction::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn delete_warnings(
        &self,
        community_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM moderation_actions
            WHERE community_id = $1 AND subject_id = $2 AND kind = 'warn'
            ",
        )
        .bind(community_id.into_inner())
        .bind(subject_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_recent(
        &self,
        community_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationAction>> {
        let results = sqlx::query_as::<_, ModerationActionModel>(
            r"
            SELECT id, community_id, subject_id, kind, duration_minutes, reason,
                   issuer_id, created_at
            FROM moderation_actions
            WHERE community_id = $1
            ORDER BY id DESC
            LIMIT $2
            ",
        )
        .bind(community_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(ModerationAction::try_from).collect()
    }
}
