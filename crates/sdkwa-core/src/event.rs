//! Event classification for inbound notification payloads.
//!
//! Every delivery path (queue polling, websocket push, webhook) derives the
//! same [`EventKind`] from a payload: the `typeWebhook` category, optionally
//! joined with `messageData.typeMessage` as `category_subtype`.

use serde_json::{Map, Value};
use std::fmt;

/// Discrete kind of a notification, used as the callback registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    StateInstanceChanged,
    OutgoingMessageStatus,
    DeviceInfo,
    IncomingMessageText,
    IncomingMessageImage,
    IncomingMessageLocation,
    IncomingMessageContact,
    IncomingMessageExtendedText,
    /// A well-formed tag with no dedicated variant.
    Other(String),
    /// Missing or malformed category. Never matches a callback.
    Unknown,
}

const STATE_INSTANCE_CHANGED: &str = "stateInstanceChanged";
const OUTGOING_MESSAGE_STATUS: &str = "outgoingMessageStatus";
const DEVICE_INFO: &str = "deviceInfo";
const INCOMING_TEXT: &str = "incomingMessageReceived_textMessage";
const INCOMING_IMAGE: &str = "incomingMessageReceived_imageMessage";
const INCOMING_LOCATION: &str = "incomingMessageReceived_locationMessage";
const INCOMING_CONTACT: &str = "incomingMessageReceived_contactMessage";
const INCOMING_EXTENDED_TEXT: &str = "incomingMessageReceived_extendedTextMessage";

impl EventKind {
    /// Every kind with a dedicated variant.
    pub const KNOWN: [EventKind; 8] = [
        EventKind::StateInstanceChanged,
        EventKind::OutgoingMessageStatus,
        EventKind::DeviceInfo,
        EventKind::IncomingMessageText,
        EventKind::IncomingMessageImage,
        EventKind::IncomingMessageLocation,
        EventKind::IncomingMessageContact,
        EventKind::IncomingMessageExtendedText,
    ];

    /// Map a derived tag onto a kind. Empty tags are `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "" => EventKind::Unknown,
            STATE_INSTANCE_CHANGED => EventKind::StateInstanceChanged,
            OUTGOING_MESSAGE_STATUS => EventKind::OutgoingMessageStatus,
            DEVICE_INFO => EventKind::DeviceInfo,
            INCOMING_TEXT => EventKind::IncomingMessageText,
            INCOMING_IMAGE => EventKind::IncomingMessageImage,
            INCOMING_LOCATION => EventKind::IncomingMessageLocation,
            INCOMING_CONTACT => EventKind::IncomingMessageContact,
            INCOMING_EXTENDED_TEXT => EventKind::IncomingMessageExtendedText,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// The wire tag for this kind. `Unknown` has an empty tag.
    pub fn tag(&self) -> &str {
        match self {
            EventKind::StateInstanceChanged => STATE_INSTANCE_CHANGED,
            EventKind::OutgoingMessageStatus => OUTGOING_MESSAGE_STATUS,
            EventKind::DeviceInfo => DEVICE_INFO,
            EventKind::IncomingMessageText => INCOMING_TEXT,
            EventKind::IncomingMessageImage => INCOMING_IMAGE,
            EventKind::IncomingMessageLocation => INCOMING_LOCATION,
            EventKind::IncomingMessageContact => INCOMING_CONTACT,
            EventKind::IncomingMessageExtendedText => INCOMING_EXTENDED_TEXT,
            EventKind::Other(tag) => tag,
            EventKind::Unknown => "",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, EventKind::Unknown)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Unknown => f.write_str("unknown"),
            other => f.write_str(other.tag()),
        }
    }
}

/// Derive the event kind of a payload object.
pub fn classify(payload: &Map<String, Value>) -> EventKind {
    let category = match payload.get("typeWebhook").and_then(Value::as_str) {
        Some(c) if !c.is_empty() => c,
        _ => return EventKind::Unknown,
    };

    let subtype = payload
        .get("messageData")
        .and_then(Value::as_object)
        .and_then(|data| data.get("typeMessage"))
        .and_then(Value::as_str);

    match subtype {
        Some(sub) => EventKind::from_tag(&format!("{category}_{sub}")),
        None => EventKind::from_tag(category),
    }
}

/// Like [`classify`], for any JSON value. Non-objects are `Unknown`.
pub fn classify_value(payload: &Value) -> EventKind {
    payload.as_object().map(classify).unwrap_or(EventKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_without_subtype() {
        let payload = json!({"typeWebhook": "stateInstanceChanged", "stateInstance": "authorized"});
        assert_eq!(classify_value(&payload), EventKind::StateInstanceChanged);
    }

    #[test]
    fn test_category_with_subtype() {
        let payload = json!({
            "typeWebhook": "incomingMessageReceived",
            "messageData": {"typeMessage": "textMessage"}
        });
        assert_eq!(classify_value(&payload), EventKind::IncomingMessageText);
    }

    #[test]
    fn test_unlisted_tags_are_other() {
        let payload = json!({"typeWebhook": "C", "messageData": {"typeMessage": "S"}});
        let kind = classify_value(&payload);
        assert_eq!(kind, EventKind::Other("C_S".into()));
        assert_eq!(kind.tag(), "C_S");
    }

    #[test]
    fn test_message_data_without_type_message() {
        let payload = json!({"typeWebhook": "incomingMessageReceived", "messageData": {}});
        assert_eq!(
            classify_value(&payload),
            EventKind::Other("incomingMessageReceived".into())
        );

        let payload = json!({"typeWebhook": "deviceInfo", "messageData": {"typeMessage": 7}});
        assert_eq!(classify_value(&payload), EventKind::DeviceInfo);
    }

    #[test]
    fn test_missing_or_malformed_category() {
        assert_eq!(classify_value(&json!({})), EventKind::Unknown);
        assert_eq!(classify_value(&json!({"typeWebhook": 5})), EventKind::Unknown);
        assert_eq!(classify_value(&json!({"typeWebhook": ""})), EventKind::Unknown);
        assert_eq!(
            classify_value(&json!({"messageData": {"typeMessage": "textMessage"}})),
            EventKind::Unknown
        );
        assert_eq!(classify_value(&json!([1, 2])), EventKind::Unknown);
    }

    #[test]
    fn test_known_tags_round_trip() {
        for kind in EventKind::KNOWN {
            assert_eq!(EventKind::from_tag(kind.tag()), kind);
        }
        assert_eq!(EventKind::from_tag(""), EventKind::Unknown);
        assert_eq!(EventKind::Unknown.to_string(), "unknown");
    }
}
