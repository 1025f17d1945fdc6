//! Telegram-only endpoints: app registration and phone sign-in.
//!
//! These are usually called with `RequestOptions::messenger(MessengerType::Telegram)`
//! when the session default is WhatsApp.

use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use serde::{Deserialize, Serialize};

use crate::Client;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppParams {
    pub title: String,
    pub short_name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateAppData {
    pub app_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateAppResponse {
    pub result: bool,
    pub data: CreateAppData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfirmationCodeParams {
    pub phone_number: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInWithConfirmationCodeParams {
    pub code: String,
}

/// Outcome of a confirmation-code step.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmationResponse {
    pub result: bool,
    pub message: String,
}

impl Client {
    pub async fn create_app(
        &self,
        params: &CreateAppParams,
        opts: RequestOptions,
    ) -> Result<CreateAppResponse, SdkwaError> {
        self.post("createApp", params, opts).await
    }

    pub async fn send_confirmation_code(
        &self,
        params: &SendConfirmationCodeParams,
        opts: RequestOptions,
    ) -> Result<ConfirmationResponse, SdkwaError> {
        self.post("sendConfirmationCode", params, opts).await
    }

    pub async fn sign_in_with_confirmation_code(
        &self,
        params: &SignInWithConfirmationCodeParams,
        opts: RequestOptions,
    ) -> Result<ConfirmationResponse, SdkwaError> {
        self.post("signInWithConfirmationCode", params, opts).await
    }
}
