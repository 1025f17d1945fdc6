use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SdkwaError;
use crate::event::{classify, EventKind};

/// A loosely-structured notification payload.
///
/// Wraps the JSON object as received; accessors read the well-known fields
/// (`typeWebhook`, `messageData.typeMessage`, `receiptId`) without requiring
/// the rest of the payload to have any particular shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Notification {
    body: Map<String, Value>,
}

impl Notification {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_map(body: Map<String, Value>) -> Self {
        Self { body }
    }

    /// Wrap a JSON value. `null` is the empty notification; any other
    /// non-object is a decode error.
    pub fn from_value(value: Value) -> Result<Self, SdkwaError> {
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Object(body) => Ok(Self { body }),
            other => Err(SdkwaError::Decode(format!(
                "notification must be a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Parse raw bytes. Blank input is the empty notification.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SdkwaError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| SdkwaError::Decode(format!("invalid notification JSON: {e}")))?;
        Self::from_value(value)
    }

    /// True when no notification was pending.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// The `typeWebhook` field.
    pub fn category(&self) -> Option<&str> {
        self.body.get("typeWebhook").and_then(Value::as_str)
    }

    /// The `messageData.typeMessage` field.
    pub fn subtype(&self) -> Option<&str> {
        self.body
            .get("messageData")
            .and_then(Value::as_object)
            .and_then(|data| data.get("typeMessage"))
            .and_then(Value::as_str)
    }

    /// The acknowledgement id. Integral floats such as `42.0` are accepted.
    pub fn receipt_id(&self) -> Option<i64> {
        let id = self.body.get("receiptId")?;
        if let Some(n) = id.as_i64() {
            return Some(n);
        }
        let f = id.as_f64()?;
        // `i64::MAX as f64` rounds up to 2^63, which does not fit.
        if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f) {
            Some(f as i64)
        } else {
            None
        }
    }

    pub fn kind(&self) -> EventKind {
        classify(&self.body)
    }

    /// The full payload object.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }

    /// Decode the payload into a typed view.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, SdkwaError> {
        serde_json::from_value(Value::Object(self.body.clone()))
            .map_err(|e| SdkwaError::Decode(format!("failed to decode notification: {e}")))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_receipt_id_accepts_integral_float() {
        let n = Notification::from_value(json!({"typeWebhook": "x", "receiptId": 42})).unwrap();
        assert_eq!(n.receipt_id(), Some(42));

        let n = Notification::from_value(json!({"typeWebhook": "x", "receiptId": 42.0})).unwrap();
        assert_eq!(n.receipt_id(), Some(42));

        let n = Notification::from_value(json!({"receiptId": 4.5})).unwrap();
        assert_eq!(n.receipt_id(), None);

        let n = Notification::from_value(json!({"receiptId": "42"})).unwrap();
        assert_eq!(n.receipt_id(), None);
    }

    #[test]
    fn test_receipt_id_out_of_range_is_rejected() {
        let n = Notification::from_slice(br#"{"receiptId": 9223372036854775808}"#).unwrap();
        assert_eq!(n.receipt_id(), None);

        let n = Notification::from_slice(br#"{"receiptId": 1e19}"#).unwrap();
        assert_eq!(n.receipt_id(), None);

        let n = Notification::from_slice(br#"{"receiptId": 9223372036854775807}"#).unwrap();
        assert_eq!(n.receipt_id(), Some(i64::MAX));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(Notification::from_value(Value::Null).unwrap().is_empty());
        assert!(Notification::from_slice(b"").unwrap().is_empty());
        assert!(Notification::from_slice(b"  \n").unwrap().is_empty());
        assert!(Notification::from_slice(b"null").unwrap().is_empty());
        assert!(Notification::from_slice(b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_non_object_is_decode_error() {
        let err = Notification::from_value(json!([1])).unwrap_err();
        assert!(matches!(err, SdkwaError::Decode(ref m) if m.contains("array")));
        assert!(Notification::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_accessors() {
        let n = Notification::from_value(json!({
            "typeWebhook": "incomingMessageReceived",
            "messageData": {"typeMessage": "imageMessage"},
            "receiptId": 7
        }))
        .unwrap();
        assert_eq!(n.category(), Some("incomingMessageReceived"));
        assert_eq!(n.subtype(), Some("imageMessage"));
        assert_eq!(n.kind(), EventKind::IncomingMessageImage);
        assert_eq!(n.payload().len(), 3);
    }
}
