//! Modlog notification sink
//!
//! Posts notifications into the community's configured modlog channel.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use modbot_core::events::Notification;
use modbot_core::traits::{NotificationSink, OutgoingMessage, PlatformClient, SettingsRepository};

pub struct ModlogNotifier {
    settings: Arc<dyn SettingsRepository>,
    platform: Arc<dyn PlatformClient>,
}

impl ModlogNotifier {
    pub fn new(settings: Arc<dyn SettingsRepository>, platform: Arc<dyn PlatformClient>) -> Self {
        Self { settings, platform }
    }
}

#[async_trait]
impl NotificationSink for ModlogNotifier {
    async fn notify(&self, notification: &Notification) {
        let community_id = notification.community_id;
        let channel_id = match self.settings.get_modlog_channel(community_id).await {
            Ok(Some(channel_id)) => channel_id,
            Ok(None) => {
                debug!(community_id = %community_id, title = %notification.title, "No modlog channel configured");
                return;
            }
            Err(e) => {
                warn!(community_id = %community_id, error = %e, "Failed to read modlog channel");
                return;
            }
        };

        let message = OutgoingMessage::from(notification);
        if let Err(e) = self.platform.send_message(channel_id, &message).await {
            warn!(
                community_id = %community_id,
                channel_id = %channel_id,
                error = %e,
                "Failed to deliver modlog notification"
            );
        }
    }
}
