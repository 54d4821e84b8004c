use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use modbot_core::traits::{RepoResult, SettingsRepository};
use modbot_core::value_objects::Snowflake;

#[derive(Debug, Default, Clone, Copy)]
struct CommunitySettings {
    modlog_channel: Option<Snowflake>,
    suggestion_channel: Option<Snowflake>,
}

#[derive(Default)]
pub struct InMemorySettingsRepository {
    inner: Mutex<HashMap<Snowflake, CommunitySettings>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn get_modlog_channel(&self, community_id: Snowflake) -> RepoResult<Option<Snowflake>> {
        Ok(self
            .inner
            .lock()
            .get(&community_id)
            .and_then(|s| s.modlog_channel))
    }

    async fn set_modlog_channel(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<()> {
        self.inner
            .lock()
            .entry(community_id)
            .or_default()
            .modlog_channel = Some(channel_id);
        Ok(())
    }

    async fn get_suggestion_channel(
        &self,
        community_id: Snowflake,
    ) -> RepoResult<Option<Snowflake>> {
        Ok(self
            .inner
            .lock()
            .get(&community_id)
            .and_then(|s| s.suggestion_channel))
    }

    async fn set_suggestion_channel(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
    ) -> RepoResult<()> {
        self.inner
            .lock()
            .entry(community_id)
            .or_default()
            .suggestion_channel = Some(channel_id);
        Ok(())
    }
}
