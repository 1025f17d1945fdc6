mod defaults;


pub use defaults::DEFAULT_API_HOST;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::SdkwaError;
use crate::messenger::MessengerType;
use defaults::*;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sdkwa: SdkwaConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkwaConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SdkwaConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Session settings for the HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_host")]
    pub api_host: String,
    #[serde(default)]
    pub id_instance: String,
    #[serde(default)]
    pub api_token_instance: String,
    #[serde(default)]
    pub messenger_type: MessengerType,
    /// Credentials for `/api/v1/instance/user/...` calls.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            id_instance: String::new(),
            api_token_instance: String::new(),
            messenger_type: MessengerType::default(),
            user_id: None,
            user_token: None,
            timeout_secs: default_timeout_secs(),
            insecure_skip_verify: false,
        }
    }
}

impl ClientConfig {
    pub fn new(id_instance: impl Into<String>, api_token_instance: impl Into<String>) -> Self {
        Self {
            id_instance: id_instance.into(),
            api_token_instance: api_token_instance.into(),
            ..Default::default()
        }
    }

    /// Reject a session that cannot address an instance.
    pub fn validate(&self) -> Result<(), SdkwaError> {
        if self.id_instance.trim().is_empty() {
            return Err(SdkwaError::Config("id_instance is required".into()));
        }
        if self.api_token_instance.trim().is_empty() {
            return Err(SdkwaError::Config("api_token_instance is required".into()));
        }
        Ok(())
    }

    /// API host without trailing slashes; blank falls back to the default host.
    pub fn normalized_host(&self) -> String {
        let host = self.api_host.trim().trim_end_matches('/');
        if host.is_empty() {
            DEFAULT_API_HOST.to_string()
        } else {
            host.to_string()
        }
    }

    /// Request timeout. Zero falls back to the default.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(default_timeout_secs()),
            secs => Duration::from_secs(secs),
        }
    }
}

/// Notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
        }
    }
}

impl NotificationsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs.max(1))
    }
}

/// Inbound webhook server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_host")]
    pub host: String,
    #[serde(default = "default_webhook_port")]
    pub port: u16,
    #[serde(default = "default_webhook_path")]
    pub path: String,
    /// Bearer token required on inbound requests. Empty = no auth.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: default_webhook_host(),
            port: default_webhook_port(),
            path: default_webhook_path(),
            token: None,
        }
    }
}

impl WebhookConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured token, treating an empty string as unset.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, SdkwaError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| SdkwaError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    parse(&content)
}

/// Parse configuration from TOML text.
pub fn parse(content: &str) -> Result<Config, SdkwaError> {
    toml::from_str(content).map_err(|e| SdkwaError::Config(format!("failed to parse config: {e}")))
}
