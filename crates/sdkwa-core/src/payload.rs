//! Typed views over notification payloads.
//!
//! Decode with [`Notification::decode`](crate::notification::Notification::decode).
//! Every field the gateway may omit is optional, so a view decodes from any
//! payload of the matching category.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Instance that produced a notification.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceData {
    #[serde(default)]
    pub id_instance: Option<i64>,
    #[serde(default)]
    pub wid: Option<String>,
    #[serde(default)]
    pub type_instance: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderData {
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub chat_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageData {
    #[serde(default)]
    pub text_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedTextMessageData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMessageData {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMessageData {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub name_location: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageData {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub vcard: String,
}

/// The `messageData` object of an incoming message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    #[serde(default)]
    pub type_message: String,
    #[serde(default)]
    pub text_message_data: Option<TextMessageData>,
    #[serde(default)]
    pub extended_text_message_data: Option<ExtendedTextMessageData>,
    #[serde(default)]
    pub file_message_data: Option<FileMessageData>,
    #[serde(default)]
    pub location_message_data: Option<LocationMessageData>,
    #[serde(default)]
    pub contact_message_data: Option<ContactMessageData>,
}

/// `incomingMessageReceived` notification.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    #[serde(default)]
    pub type_webhook: String,
    #[serde(default)]
    pub instance_data: Option<InstanceData>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub id_message: String,
    #[serde(default)]
    pub sender_data: SenderData,
    #[serde(default)]
    pub message_data: MessageData,
}

impl IncomingMessage {
    /// Plain text body, if this is a text message.
    pub fn text(&self) -> Option<&str> {
        self.message_data
            .text_message_data
            .as_ref()
            .map(|d| d.text_message.as_str())
    }

    /// Text of an extended text message (links, quotes).
    pub fn extended_text(&self) -> Option<&str> {
        self.message_data
            .extended_text_message_data
            .as_ref()
            .map(|d| d.text.as_str())
    }

    /// Either kind of text body.
    pub fn any_text(&self) -> Option<&str> {
        self.text().or_else(|| self.extended_text())
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_utc(self.timestamp)
    }
}

/// `stateInstanceChanged` notification.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateInstanceChanged {
    #[serde(default)]
    pub type_webhook: String,
    #[serde(default)]
    pub instance_data: Option<InstanceData>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub state_instance: String,
}

impl StateInstanceChanged {
    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_utc(self.timestamp)
    }
}

/// `outgoingMessageStatus` notification.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessageStatus {
    #[serde(default)]
    pub type_webhook: String,
    #[serde(default)]
    pub instance_data: Option<InstanceData>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub id_message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub send_by_api: Option<bool>,
}

impl OutgoingMessageStatus {
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_utc(self.timestamp)
    }
}

/// Unix seconds to UTC. Zero means the gateway did not send a timestamp.
fn timestamp_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Notification;
    use serde_json::json;

    #[test]
    fn test_decode_incoming_text() {
        let n = Notification::from_value(json!({
            "typeWebhook": "incomingMessageReceived",
            "instanceData": {"idInstance": 1101, "wid": "79001234567@c.us", "typeInstance": "whatsapp"},
            "timestamp": 1_700_000_000,
            "idMessage": "BAE5F4886F1E",
            "senderData": {"chatId": "79001234567@c.us", "sender": "79001234567@c.us", "senderName": "Ann"},
            "messageData": {"typeMessage": "textMessage", "textMessageData": {"textMessage": "hello"}},
            "receiptId": 3
        }))
        .unwrap();

        let msg: IncomingMessage = n.decode().unwrap();
        assert_eq!(msg.id_message, "BAE5F4886F1E");
        assert_eq!(msg.sender_data.chat_id, "79001234567@c.us");
        assert_eq!(msg.sender_data.sender_name.as_deref(), Some("Ann"));
        assert_eq!(msg.text(), Some("hello"));
        assert_eq!(msg.any_text(), Some("hello"));
        assert_eq!(msg.instance_data.as_ref().unwrap().id_instance, Some(1101));
        assert_eq!(msg.received_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_decode_extended_text_and_location() {
        let n = Notification::from_value(json!({
            "typeWebhook": "incomingMessageReceived",
            "messageData": {
                "typeMessage": "extendedTextMessage",
                "extendedTextMessageData": {"text": "see https://sdkwa.pro", "title": "SDKWA"}
            }
        }))
        .unwrap();
        let msg: IncomingMessage = n.decode().unwrap();
        assert_eq!(msg.text(), None);
        assert_eq!(msg.any_text(), Some("see https://sdkwa.pro"));
        assert!(msg.received_at().is_none());

        let n = Notification::from_value(json!({
            "typeWebhook": "incomingMessageReceived",
            "messageData": {
                "typeMessage": "locationMessage",
                "locationMessageData": {"latitude": 44.9, "longitude": 37.3, "nameLocation": "Port"}
            }
        }))
        .unwrap();
        let msg: IncomingMessage = n.decode().unwrap();
        let loc = msg.message_data.location_message_data.unwrap();
        assert_eq!(loc.latitude, 44.9);
        assert_eq!(loc.name_location.as_deref(), Some("Port"));
    }

    #[test]
    fn test_decode_state_and_status() {
        let n = Notification::from_value(json!({
            "typeWebhook": "stateInstanceChanged",
            "timestamp": 1_700_000_100,
            "stateInstance": "authorized"
        }))
        .unwrap();
        let state: StateInstanceChanged = n.decode().unwrap();
        assert_eq!(state.state_instance, "authorized");
        assert!(state.changed_at().is_some());

        let n = Notification::from_value(json!({
            "typeWebhook": "outgoingMessageStatus",
            "chatId": "79001234567@c.us",
            "idMessage": "3EB0C767D097",
            "status": "read",
            "sendByApi": true
        }))
        .unwrap();
        let status: OutgoingMessageStatus = n.decode().unwrap();
        assert_eq!(status.status, "read");
        assert_eq!(status.send_by_api, Some(true));
    }

    #[test]
    fn test_decode_wrong_field_type_fails() {
        let n = Notification::from_value(json!({"typeWebhook": "stateInstanceChanged", "timestamp": "soon"}))
            .unwrap();
        assert!(n.decode::<StateInstanceChanged>().is_err());
    }
}
