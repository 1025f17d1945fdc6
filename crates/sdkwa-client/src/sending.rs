//! Outgoing message endpoints.

use reqwest::multipart::{Form, Part};
use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use serde::{Deserialize, Serialize};

use crate::Client;

/// In-memory file for multipart uploads.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime_type: None,
        }
    }

    pub fn with_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub(crate) fn into_part(self) -> Result<Part, SdkwaError> {
        let part = Part::bytes(self.bytes).file_name(self.file_name);
        match self.mime_type {
            Some(mime) => part
                .mime_str(&mime)
                .map_err(|e| SdkwaError::Config(format!("invalid mime type '{mime}': {e}"))),
            None => Ok(part),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageParams {
    pub chat_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_message_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub archive_chat: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub link_preview: bool,
}

impl SendMessageParams {
    pub fn new(chat_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message: message.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub phone_contact: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendContactParams {
    pub chat_id: String,
    pub contact: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_message_id: Option<String>,
}

/// Upload-and-send. Sent as multipart, not JSON.
#[derive(Debug, Clone)]
pub struct SendFileByUploadParams {
    pub chat_id: String,
    pub file: FileUpload,
    pub caption: Option<String>,
    pub quoted_message_id: Option<String>,
}

impl SendFileByUploadParams {
    fn into_form(self) -> Result<Form, SdkwaError> {
        let mut form = Form::new().text("chatId", self.chat_id);
        if let Some(caption) = self.caption.filter(|c| !c.is_empty()) {
            form = form.text("caption", caption);
        }
        if let Some(quoted) = self.quoted_message_id.filter(|q| !q.is_empty()) {
            form = form.text("quotedMessageId", quoted);
        }
        Ok(form.part("file", self.file.into_part()?))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFileByUrlParams {
    pub chat_id: String,
    pub url_file: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_message_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub archive_chat: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendLocationParams {
    pub chat_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_message_id: Option<String>,
}

/// Id of a message accepted for delivery.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub id_message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadFileResponse {
    pub url_file: String,
}

impl Client {
    pub async fn send_message(
        &self,
        params: &SendMessageParams,
        opts: RequestOptions,
    ) -> Result<SendMessageResponse, SdkwaError> {
        self.post("sendMessage", params, opts).await
    }

    pub async fn send_contact(
        &self,
        params: &SendContactParams,
        opts: RequestOptions,
    ) -> Result<SendMessageResponse, SdkwaError> {
        self.post("sendContact", params, opts).await
    }

    pub async fn send_file_by_upload(
        &self,
        params: SendFileByUploadParams,
        opts: RequestOptions,
    ) -> Result<SendMessageResponse, SdkwaError> {
        let form = params.into_form()?;
        self.post_multipart("sendFileByUpload", form, opts).await
    }

    pub async fn send_file_by_url(
        &self,
        params: &SendFileByUrlParams,
        opts: RequestOptions,
    ) -> Result<SendMessageResponse, SdkwaError> {
        self.post("sendFileByUrl", params, opts).await
    }

    pub async fn send_location(
        &self,
        params: &SendLocationParams,
        opts: RequestOptions,
    ) -> Result<SendMessageResponse, SdkwaError> {
        self.post("sendLocation", params, opts).await
    }

    /// Upload a file to gateway storage; the returned URL can be sent later
    /// with [`send_file_by_url`](Self::send_file_by_url).
    pub async fn upload_file(
        &self,
        file: FileUpload,
        opts: RequestOptions,
    ) -> Result<UploadFileResponse, SdkwaError> {
        let form = Form::new().part("file", file.into_part()?);
        self.post_multipart("uploadFile", form, opts).await
    }
}
