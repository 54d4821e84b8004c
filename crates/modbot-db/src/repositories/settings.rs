//! PostgreSQL implementation of SettingsRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modbot_core::traits::{RepoResult, SettingsRepository};
use modbot_core::value_objects::Snowflake;

use crate::models::CommunitySettingsModel;

use super::error::map_db_error;

/// PostgreSQL implementation of SettingsRepository
#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find(&self, community_id: Snowflake) -> RepoResult<Option<CommunitySettingsModel>> {
        sqlx::query_as::<_, CommunitySettingsModel>(
            r"
            SELECT community_id, modlog_channel_id, suggestion_channel_id, updated_at
            FROM community_settings
            WHERE community_id = $1
            ",
        )
        .bind(community_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    #[instrument(skip(self))]
    async fn get_modlog_channel(&self, community_id: Snowflake) -> RepoResult<Option<Snowflake>> {
        let settings = self.find(community_id).await?;
        Ok(settings
            .and_then(|s| s.modlog_channel_id)
            .map(Snowflake::new))
    }

    #[instrument(skip(self))]
    async fn set_modlog_channel(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO community_settings (community_id, modlog_channel_id)
            VALUES ($1, $2)
            ON CONFLICT (community_id)
            DO UPDATE SET modlog_channel_id = EXCLUDED.modlog_channel_id, updated_at = NOW()
            ",
        )
        .bind(community_id.into_inner())
        .bind(channel_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_suggestion_channel(
        &self,
        community_id: Snowflake,
    ) -> RepoResult<Option<Snowflake>> {
        let settings = self.find(community_id).await?;
        Ok(settings
            .and_then(|s| s.suggestion_channel_id)
            .map(Snowflake::new))
    }

    #[instrument(skip(self))]
    async fn set_suggestion_channel(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO community_settings (community_id, suggestion_channel_id)
            VALUES ($1, $2)
            ON CONFLICT (community_id)
            DO UPDATE SET suggestion_channel_id = EXCLUDED.suggestion_channel_id, updated_at = NOW()
            ",
        )
        .bind(community_id.into_inner())
        .bind(channel_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
