//! Contacts, chats and profile endpoints.

use reqwest::multipart::Form;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Client, FileUpload, JsonObject};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadChatParams {
    pub chat_id: String,
    /// Mark up to this message; all messages when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadChatResponse {
    pub set_read: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetProfilePictureResponse {
    pub set_profile_picture: bool,
    pub url_avatar: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckWhatsappResponse {
    #[serde(rename = "existsWhatsapp")]
    pub exists_whatsapp: bool,
}

impl Client {
    pub async fn get_contacts(&self, opts: RequestOptions) -> Result<Vec<JsonObject>, SdkwaError> {
        self.get("getContacts", opts).await
    }

    pub async fn get_chats(&self, opts: RequestOptions) -> Result<Vec<JsonObject>, SdkwaError> {
        self.get("getChats", opts).await
    }

    /// The gateway reads `chatId` from a JSON body on this GET endpoint.
    pub async fn get_contact_info(
        &self,
        chat_id: &str,
        opts: RequestOptions,
    ) -> Result<JsonObject, SdkwaError> {
        self.get_with_body("getContactInfo", &json!({ "chatId": chat_id }), opts)
            .await
    }

    pub async fn set_profile_picture(
        &self,
        file: FileUpload,
        opts: RequestOptions,
    ) -> Result<SetProfilePictureResponse, SdkwaError> {
        let form = Form::new().part("file", file.into_part()?);
        self.post_multipart("setProfilePicture", form, opts).await
    }

    pub async fn set_profile_name(&self, name: &str, opts: RequestOptions) -> Result<(), SdkwaError> {
        self.post_unit("setProfileName", &json!({ "name": name }), opts)
            .await
    }

    pub async fn set_profile_status(
        &self,
        status: &str,
        opts: RequestOptions,
    ) -> Result<(), SdkwaError> {
        self.post_unit("setProfileStatus", &json!({ "status": status }), opts)
            .await
    }

    pub async fn get_avatar(&self, chat_id: &str, opts: RequestOptions) -> Result<JsonObject, SdkwaError> {
        self.post("getAvatar", &json!({ "chatId": chat_id }), opts)
            .await
    }

    /// Whether a phone number has a WhatsApp account.
    pub async fn check_whatsapp(
        &self,
        phone_number: i64,
        opts: RequestOptions,
    ) -> Result<CheckWhatsappResponse, SdkwaError> {
        self.post("checkWhatsapp", &json!({ "phoneNumber": phone_number }), opts)
            .await
    }

    pub async fn read_chat(
        &self,
        params: &ReadChatParams,
        opts: RequestOptions,
    ) -> Result<ReadChatResponse, SdkwaError> {
        self.post("readChat", params, opts).await
    }

    pub async fn archive_chat(&self, chat_id: &str, opts: RequestOptions) -> Result<(), SdkwaError> {
        self.post_unit("archiveChat", &json!({ "chatId": chat_id }), opts)
            .await
    }

    pub async fn unarchive_chat(&self, chat_id: &str, opts: RequestOptions) -> Result<(), SdkwaError> {
        self.post_unit("unarchiveChat", &json!({ "chatId": chat_id }), opts)
            .await
    }

    pub async fn delete_message(
        &self,
        chat_id: &str,
        id_message: &str,
        opts: RequestOptions,
    ) -> Result<(), SdkwaError> {
        let params = json!({ "chatId": chat_id, "idMessage": id_message });
        self.post_unit("deleteMessage", &params, opts).await
    }
}
