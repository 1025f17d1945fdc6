//! Default value functions used by serde for config deserialization.

pub const DEFAULT_API_HOST: &str = "https://api.sdkwa.pro";

pub fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_poll_interval_secs() -> u64 {
    5
}

pub fn default_handshake_timeout_secs() -> u64 {
    10
}

pub fn default_webhook_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_webhook_port() -> u16 {
    8080
}

pub fn default_webhook_path() -> String {
    "/webhook".to_string()
}
