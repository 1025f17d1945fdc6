use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use serde::Deserialize;

use crate::{Client, JsonObject};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClearMessagesQueueResponse {
    pub is_cleared: bool,
}

impl Client {
    /// Drop every outgoing message still waiting to be sent.
    pub async fn clear_messages_queue(
        &self,
        opts: RequestOptions,
    ) -> Result<ClearMessagesQueueResponse, SdkwaError> {
        self.get("clearMessagesQueue", opts).await
    }

    pub async fn show_messages_queue(
        &self,
        opts: RequestOptions,
    ) -> Result<Vec<JsonObject>, SdkwaError> {
        self.get("showMessagesQueue", opts).await
    }
}
