//! Account and instance state endpoints.

use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use serde::{Deserialize, Serialize};

use crate::{Client, JsonObject};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetSettingsResponse {
    pub save_settings: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateInstanceResponse {
    /// e.g. `authorized`, `notAuthorized`, `blocked`.
    pub state_instance: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RebootResponse {
    pub is_reboot: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogoutResponse {
    pub is_logout: bool,
}

/// `type` is `qrCode` (base64 PNG in `message`), `alreadyLogged` or `error`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QrResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAuthorizationCodeParams {
    pub phone_number: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GetAuthorizationCodeResponse {
    pub status: bool,
    pub code: String,
}

/// Delivery method for a registration code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeMethod {
    Sms,
    Voice,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRegistrationCodeParams {
    pub phone_number: i64,
    pub method: CodeMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendRegistrationCodeParams {
    pub code: String,
}

impl Client {
    pub async fn get_settings(&self, opts: RequestOptions) -> Result<JsonObject, SdkwaError> {
        self.get("getSettings", opts).await
    }

    /// Apply instance settings. Keys follow the gateway's settings schema.
    pub async fn set_settings(
        &self,
        settings: &JsonObject,
        opts: RequestOptions,
    ) -> Result<SetSettingsResponse, SdkwaError> {
        self.post("setSettings", settings, opts).await
    }

    pub async fn get_state_instance(
        &self,
        opts: RequestOptions,
    ) -> Result<StateInstanceResponse, SdkwaError> {
        self.get("getStateInstance", opts).await
    }

    pub async fn get_warming_phone_status(
        &self,
        opts: RequestOptions,
    ) -> Result<JsonObject, SdkwaError> {
        self.get("getWarmingPhoneStatus", opts).await
    }

    pub async fn reboot(&self, opts: RequestOptions) -> Result<RebootResponse, SdkwaError> {
        self.get("reboot", opts).await
    }

    pub async fn logout(&self, opts: RequestOptions) -> Result<LogoutResponse, SdkwaError> {
        self.get("logout", opts).await
    }

    pub async fn qr(&self, opts: RequestOptions) -> Result<QrResponse, SdkwaError> {
        self.get("qr", opts).await
    }

    /// Request a pairing code for phone-number login.
    pub async fn get_authorization_code(
        &self,
        params: &GetAuthorizationCodeParams,
        opts: RequestOptions,
    ) -> Result<GetAuthorizationCodeResponse, SdkwaError> {
        self.post("getAuthorizationCode", params, opts).await
    }

    pub async fn request_registration_code(
        &self,
        params: &RequestRegistrationCodeParams,
        opts: RequestOptions,
    ) -> Result<JsonObject, SdkwaError> {
        self.post("requestRegistrationCode", params, opts).await
    }

    pub async fn send_registration_code(
        &self,
        params: &SendRegistrationCodeParams,
        opts: RequestOptions,
    ) -> Result<JsonObject, SdkwaError> {
        self.post("sendRegistrationCode", params, opts).await
    }
}
