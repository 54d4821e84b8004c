use async_trait::async_trait;

use crate::events::Notification;

/// Fire-and-forget delivery of notifications.
///
/// Implementations swallow their own failures: an unset or deleted
/// notification channel must never surface to the command issuer.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification);
}
