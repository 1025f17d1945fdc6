use crate::{error::SdkwaError, messenger::RequestOptions, notification::Notification};
use async_trait::async_trait;

/// Remote notification queue.
///
/// The HTTP client implements this against `receiveNotification` and
/// `deleteNotification`; the poller only depends on the trait.
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Fetch the next pending notification. An empty notification means the
    /// queue had nothing pending.
    async fn receive_notification(&self, opts: RequestOptions)
        -> Result<Notification, SdkwaError>;

    /// Remove a handled notification from the queue by its receipt id.
    async fn delete_notification(
        &self,
        receipt_id: i64,
        opts: RequestOptions,
    ) -> Result<bool, SdkwaError>;
}
