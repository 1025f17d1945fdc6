//! Logging callbacks used by the `poll`, `listen` and `webhook` subcommands.

use sdkwa_core::event::EventKind;
use sdkwa_core::notification::Notification;
use sdkwa_core::payload::{IncomingMessage, OutgoingMessageStatus, StateInstanceChanged};
use sdkwa_notifications::CallbackRegistry;
use tracing::info;

/// Log every known notification kind.
pub fn register_logging(registry: &CallbackRegistry) {
    registry.on_state_instance(log_state);
    registry.on_outgoing_message_status(log_status);
    registry.on_device_info(|n| {
        info!("device info: {}", serde_json::Value::Object(n.payload().clone()));
        Ok(())
    });
    for kind in [
        EventKind::IncomingMessageText,
        EventKind::IncomingMessageExtendedText,
        EventKind::IncomingMessageImage,
        EventKind::IncomingMessageLocation,
        EventKind::IncomingMessageContact,
    ] {
        registry.register_fn(kind, log_incoming);
    }
}

fn log_state(n: &Notification) -> anyhow::Result<()> {
    let state: StateInstanceChanged = n.decode()?;
    match state.changed_at() {
        Some(at) => info!("instance state: {} at {at}", state.state_instance),
        None => info!("instance state: {}", state.state_instance),
    }
    Ok(())
}

fn log_status(n: &Notification) -> anyhow::Result<()> {
    let status: OutgoingMessageStatus = n.decode()?;
    info!(
        "message {} to {}: {}",
        status.id_message, status.chat_id, status.status
    );
    Ok(())
}

fn log_incoming(n: &Notification) -> anyhow::Result<()> {
    let msg: IncomingMessage = n.decode()?;
    let from = msg
        .sender_data
        .sender_name
        .as_deref()
        .unwrap_or(&msg.sender_data.chat_id);
    let data = &msg.message_data;

    let summary = if let Some(text) = msg.any_text() {
        text.to_string()
    } else if let Some(file) = &data.file_message_data {
        format!(
            "[file {}] {}",
            file.file_name.as_deref().unwrap_or("?"),
            file.caption.as_deref().unwrap_or_default()
        )
    } else if let Some(loc) = &data.location_message_data {
        format!("[location {}, {}]", loc.latitude, loc.longitude)
    } else if let Some(contact) = &data.contact_message_data {
        format!("[contact {}]", contact.display_name)
    } else {
        format!("[{}]", data.type_message)
    };

    info!("{} from {from}: {summary}", n.kind());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registers_every_known_kind() {
        let registry = CallbackRegistry::new();
        register_logging(&registry);
        for kind in EventKind::KNOWN {
            assert!(registry.is_registered(&kind), "{kind}");
        }
    }

    #[tokio::test]
    async fn test_logging_handlers_accept_real_payloads() {
        let registry = CallbackRegistry::new();
        register_logging(&registry);

        let payloads = [
            json!({"typeWebhook": "stateInstanceChanged", "stateInstance": "authorized", "timestamp": 1700000000}),
            json!({"typeWebhook": "outgoingMessageStatus", "chatId": "1@c.us", "idMessage": "m1", "status": "read"}),
            json!({
                "typeWebhook": "incomingMessageReceived",
                "idMessage": "m2",
                "senderData": {"chatId": "1@c.us", "senderName": "Ann"},
                "messageData": {"typeMessage": "locationMessage", "locationMessageData": {"latitude": 1.5, "longitude": 2.5}}
            }),
        ];
        for payload in payloads {
            let n = Notification::from_value(payload).unwrap();
            registry.dispatch_notification(&n).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_handler_error() {
        let registry = CallbackRegistry::new();
        register_logging(&registry);
        let n = Notification::from_value(json!({"typeWebhook": "stateInstanceChanged", "stateInstance": 5})).unwrap();
        assert!(registry.dispatch_notification(&n).await.is_err());
    }
}
