//! Community settings, suggestions and announcements

use modbot_core::events::{Notification, Severity};
use modbot_core::traits::OutgoingMessage;
use modbot_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{SettingUpdatedResponse, MessagePostedResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::moderation::channel_error;
use super::outcome::Outcome;

const ANNOUNCEMENT_COLOR: u32 = 0xF1_C4_0F;

pub struct SettingsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SettingsService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Route future modlog notifications to `channel_id`
    #[instrument(skip(self))]
    pub async fn set_modlog_channel(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
    ) -> ServiceResult<SettingUpdatedResponse> {
        self.ctx
            .settings_repo()
            .set_modlog_channel(community_id, channel_id)
            .await?;
        info!(community_id = %community_id, channel_id = %channel_id, "Modlog channel set");

        Ok(SettingUpdatedResponse {
            setting: "modlog_channel",
            channel_id,
        })
    }

    #[instrument(skip(self))]
    pub async fn set_suggestion_channel(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
    ) -> ServiceResult<SettingUpdatedResponse> {
        self.ctx
            .settings_repo()
            .set_suggestion_channel(community_id, channel_id)
            .await?;
        info!(community_id = %community_id, channel_id = %channel_id, "Suggestion channel set");

        Ok(SettingUpdatedResponse {
            setting: "suggestion_channel",
            channel_id,
        })
    }

    /// Post a member's suggestion to the configured suggestion channel
    #[instrument(skip(self, text))]
    pub async fn suggest(
        &self,
        community_id: Snowflake,
        author_id: Snowflake,
        text: &str,
    ) -> ServiceResult<MessagePostedResponse> {
        let text = text.trim();
        if text.is_empty() {
            return Err(
                DomainError::InvalidArgument("suggestion text must not be empty".into()).into(),
            );
        }

        let channel_id = self
            .ctx
            .settings_repo()
            .get_suggestion_channel(community_id)
            .await?
            .ok_or(DomainError::SettingNotConfigured("suggestion channel"))?;

        let message = OutgoingMessage::embed(
            "New Suggestion",
            format!("{text}\n\nSuggested by <@{author_id}>"),
            Severity::Info.color(),
        );
        let message_id = self
            .ctx
            .platform()
            .send_message(channel_id, &message)
            .await
            .map_err(|e| channel_error(e, channel_id))?;

        info!(community_id = %community_id, channel_id = %channel_id, "Suggestion posted");

        Ok(MessagePostedResponse {
            channel_id,
            message_id,
        })
    }

    /// Post an announcement embed signed by the moderator
    #[instrument(skip(self, title, message))]
    pub async fn announce(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
        title: &str,
        message: &str,
        moderator_id: Snowflake,
    ) -> ServiceResult<Outcome<MessagePostedResponse>> {
        let (title, message) = (title.trim(), message.trim());
        if title.is_empty() || message.is_empty() {
            return Err(DomainError::InvalidArgument(
                "announcement title and message must not be empty".into(),
            )
            .into());
        }

        let embed = OutgoingMessage::embed(title, message, ANNOUNCEMENT_COLOR)
            .with_footer(format!("Announcement by <@{moderator_id}>"));
        let message_id = self
            .ctx
            .platform()
            .send_message(channel_id, &embed)
            .await
            .map_err(|e| channel_error(e, channel_id))?;

        info!(community_id = %community_id, channel_id = %channel_id, "Announcement posted");

        Ok(Outcome::notify(
            MessagePostedResponse {
                channel_id,
                message_id,
            },
            Notification::warning(
                community_id,
                "Announcement Made",
                format!(
                    "**Moderator:** <@{moderator_id}>\n**Channel:** <#{channel_id}>\n**Title:** {title}"
                ),
            ),
        ))
    }
}
