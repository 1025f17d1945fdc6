//! Notification queue and chat history endpoints.

use async_trait::async_trait;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use sdkwa_core::notification::Notification;
use sdkwa_core::traits::NotificationQueue;
use serde::{Deserialize, Serialize};

use crate::{Client, JsonObject};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteNotificationResponse {
    pub result: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetChatHistoryParams {
    pub chat_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl Client {
    /// Fetch one pending notification.
    ///
    /// An empty body, `null` or `{}` all come back as an empty notification.
    pub async fn receive_notification(
        &self,
        opts: RequestOptions,
    ) -> Result<Notification, SdkwaError> {
        let body = self.get_raw("receiveNotification", opts).await?;
        Notification::from_slice(body.as_bytes())
    }

    /// Remove a notification from the queue by receipt id.
    pub async fn delete_notification(
        &self,
        receipt_id: i64,
        opts: RequestOptions,
    ) -> Result<DeleteNotificationResponse, SdkwaError> {
        self.delete(&format!("deleteNotification/{receipt_id}"), opts)
            .await
    }

    pub async fn get_chat_history(
        &self,
        params: &GetChatHistoryParams,
        opts: RequestOptions,
    ) -> Result<Vec<JsonObject>, SdkwaError> {
        self.post("getChatHistory", params, opts).await
    }
}

#[async_trait]
impl NotificationQueue for Client {
    async fn receive_notification(
        &self,
        opts: RequestOptions,
    ) -> Result<Notification, SdkwaError> {
        Client::receive_notification(self, opts).await
    }

    async fn delete_notification(
        &self,
        receipt_id: i64,
        opts: RequestOptions,
    ) -> Result<bool, SdkwaError> {
        Client::delete_notification(self, receipt_id, opts)
            .await
            .map(|r| r.result)
    }
}
