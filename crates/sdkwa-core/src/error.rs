use serde::Deserialize;
use thiserror::Error;

/// Structured error body returned by the gateway on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    pub message: String,
}

/// Top-level error type for the SDKWA client.
#[derive(Debug, Error)]
pub enum SdkwaError {
    /// Network failure, timeout, or refused connection.
    #[error("transport error: {0}")]
    Transport(String),

    /// Structured error reported by the remote API.
    #[error("API error {}: {}", .0.status_code, .0.message)]
    Api(ApiError),

    /// Non-2xx response whose body was not a structured error.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A registered notification handler failed.
    #[error("handler for '{kind}' failed: {message}")]
    Handler { kind: String, message: String },

    /// WebSocket connect, read, or close failure.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Invalid options or missing credentials.
    #[error("config error: {0}")]
    Config(String),

    /// The operation was stopped by its cancellation token.
    #[error("cancelled")]
    Cancelled,

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SdkwaError {
    /// Build the error for a non-2xx response body.
    ///
    /// Bodies that parse as an [`ApiError`] become `Api`; anything else keeps
    /// the raw text as `Http`. A structured body without `statusCode` takes the
    /// HTTP status.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiError>(body) {
            Ok(mut api) => {
                if api.status_code == 0 {
                    api.status_code = status;
                }
                SdkwaError::Api(api)
            }
            Err(_) => SdkwaError::Http {
                status,
                body: body.to_string(),
            },
        }
    }

    /// HTTP status carried by `Api` and `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkwaError::Api(api) => Some(api.status_code),
            SdkwaError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is the cancellation status rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SdkwaError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_error_body() {
        let err = SdkwaError::from_response(400, r#"{"statusCode":400,"message":"invalid chatId"}"#);
        match &err {
            SdkwaError::Api(api) => {
                assert_eq!(api.status_code, 400);
                assert_eq!(api.message, "invalid chatId");
                assert!(api.timestamp.is_none());
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(err.status(), Some(400));
        assert_eq!(format!("{err}"), "API error 400: invalid chatId");
    }

    #[test]
    fn test_structured_error_without_status_takes_http_status() {
        let err = SdkwaError::from_response(
            403,
            r#"{"timestamp":"2024-01-01T00:00:00Z","path":"/whatsapp/1/qr","message":"forbidden"}"#,
        );
        assert_eq!(err.status(), Some(403));
        if let SdkwaError::Api(api) = err {
            assert_eq!(api.path.as_deref(), Some("/whatsapp/1/qr"));
        } else {
            panic!("expected Api error");
        }
    }

    #[test]
    fn test_raw_error_body_falls_back() {
        let err = SdkwaError::from_response(502, "<html>bad gateway</html>");
        match &err {
            SdkwaError::Http { status, body } => {
                assert_eq!(*status, 502);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        assert_eq!(format!("{err}"), "HTTP 502: <html>bad gateway</html>");
    }

    #[test]
    fn test_cancelled_is_distinct() {
        assert!(SdkwaError::Cancelled.is_cancelled());
        assert!(!SdkwaError::Transport("refused".into()).is_cancelled());
        assert_eq!(SdkwaError::Cancelled.status(), None);
    }

    #[test]
    fn test_config_error_display() {
        let err = SdkwaError::Config("test".into());
        assert_eq!(format!("{err}"), "config error: test");
    }
}
