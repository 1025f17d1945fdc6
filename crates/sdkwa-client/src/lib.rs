//! # sdkwa-client
//!
//! HTTP client for the SDKWA messaging gateway.
//!
//! Every instance-scoped call goes to
//! `<host>/<messengerType>/<idInstance>/<endpoint>` with the instance token as
//! a bearer credential. Instance-management calls use the user credentials
//! instead. See [`Client::new`].

mod account;
mod chat;
mod group;
mod instance;
mod queue;
mod receiving;
mod sending;
mod telegram;
mod transport;


pub use account::*;
pub use chat::*;
pub use group::*;
pub use instance::*;
pub use queue::*;
pub use receiving::*;
pub use sending::*;
pub use telegram::*;

use sdkwa_core::config::ClientConfig;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::MessengerType;
use std::fmt;

/// Untyped JSON object returned by endpoints without a fixed schema.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// SDKWA API client.
///
/// Immutable after construction. Cloning is cheap and shares the underlying
/// connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_host: String,
    id_instance: String,
    api_token: String,
    messenger_type: MessengerType,
    user_id: Option<String>,
    user_token: Option<String>,
}

impl Client {
    /// Build a client from session settings.
    ///
    /// Fails with a config error when the instance id or token is empty.
    pub fn new(config: &ClientConfig) -> Result<Self, SdkwaError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()
            .map_err(|e| SdkwaError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_host: config.normalized_host(),
            id_instance: config.id_instance.trim().to_string(),
            api_token: config.api_token_instance.trim().to_string(),
            messenger_type: config.messenger_type,
            user_id: config.user_id.clone().filter(|s| !s.is_empty()),
            user_token: config.user_token.clone().filter(|s| !s.is_empty()),
        })
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn id_instance(&self) -> &str {
        &self.id_instance
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Session default; individual calls may override it.
    pub fn messenger_type(&self) -> MessengerType {
        self.messenger_type
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_host", &self.api_host)
            .field("id_instance", &self.id_instance)
            .field("messenger_type", &self.messenger_type)
            .field("user_auth", &(self.user_id.is_some() && self.user_token.is_some()))
            .finish_non_exhaustive()
    }
}
