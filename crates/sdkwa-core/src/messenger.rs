use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SdkwaError;

/// Messenger backend addressed by an instance-scoped call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessengerType {
    #[default]
    WhatsApp,
    Telegram,
}

impl MessengerType {
    /// Path segment used in instance URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessengerType::WhatsApp => "whatsapp",
            MessengerType::Telegram => "telegram",
        }
    }
}

impl fmt::Display for MessengerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessengerType {
    type Err = SdkwaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whatsapp" => Ok(MessengerType::WhatsApp),
            "telegram" => Ok(MessengerType::Telegram),
            other => Err(SdkwaError::Config(format!(
                "unknown messenger type '{other}'"
            ))),
        }
    }
}

/// Per-call overrides for instance-scoped requests.
///
/// The session is never mutated; an override only applies to the call it is
/// passed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub messenger_type: Option<MessengerType>,
}

impl RequestOptions {
    pub fn messenger(messenger_type: MessengerType) -> Self {
        Self {
            messenger_type: Some(messenger_type),
        }
    }

    /// The messenger for this call: the override if set, otherwise `default`.
    pub fn resolve(&self, default: MessengerType) -> MessengerType {
        self.messenger_type.unwrap_or(default)
    }
}
