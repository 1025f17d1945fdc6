//! Realtime notifications over the gateway's WebSocket endpoint.
//!
//! Pushed payloads have the same shape as queued ones and go through the same
//! classification and dispatch, but are never acknowledged.

use async_trait::async_trait;
use futures_util::StreamExt;
use sdkwa_client::Client;
use sdkwa_core::config::NotificationsConfig;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::notification::Notification;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::delivery::{deliver, DeliveryError, ErrorReporter, NotificationSource, Pull, Stage};
use crate::registry::CallbackRegistry;


type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Streaming endpoint for an instance: `http(s)://host` becomes
/// `ws(s)://host/ws/<id>?token=<token>`.
pub fn push_url(api_host: &str, id_instance: &str, api_token: &str) -> Result<Url, SdkwaError> {
    let mut url = Url::parse(api_host.trim_end_matches('/'))
        .map_err(|e| SdkwaError::Config(format!("invalid API host '{api_host}': {e}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(SdkwaError::Config(format!(
                "unsupported API host scheme '{other}'"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| SdkwaError::Config(format!("cannot use scheme '{scheme}' for {api_host}")))?;

    let base = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base}/ws/{id_instance}"));
    url.set_query(None);
    url.query_pairs_mut().append_pair("token", api_token);
    Ok(url)
}

/// One WebSocket connection to the gateway.
///
/// `connect` opens it, `listen` consumes it until the server closes it,
/// `cancel` fires or [`close`](Self::close) is called from another task.
/// A closed channel can be connected again.
pub struct PushChannel {
    url: Url,
    handshake_timeout: Duration,
    stream: Mutex<Option<WsStream>>,
    connecting: AtomicBool,
    listening: AtomicBool,
    closed: StdMutex<CancellationToken>,
    reporter: ErrorReporter,
}

impl PushChannel {
    pub fn new(client: &Client) -> Result<Self, SdkwaError> {
        let url = push_url(client.api_host(), client.id_instance(), client.api_token())?;
        Ok(Self::with_url(url))
    }

    pub fn from_config(client: &Client, config: &NotificationsConfig) -> Result<Self, SdkwaError> {
        Ok(Self::new(client)?.with_handshake_timeout(config.handshake_timeout()))
    }

    pub fn with_url(url: Url) -> Self {
        Self {
            url,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            stream: Mutex::new(None),
            connecting: AtomicBool::new(false),
            listening: AtomicBool::new(false),
            closed: StdMutex::new(CancellationToken::new()),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Forward unparseable messages to `sink` in addition to logging them.
    pub fn with_error_sink(mut self, sink: mpsc::UnboundedSender<DeliveryError>) -> Self {
        self.reporter = ErrorReporter::with_sink(sink);
        self
    }

    /// URL without the token, for logs.
    fn display_url(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.to_string()
    }

    fn closed_token(&self) -> CancellationToken {
        self.closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    pub async fn is_connected(&self) -> bool {
        self.listening.load(Ordering::SeqCst) || self.stream.lock().await.is_some()
    }

    /// Open the connection. No retries; the handshake is bounded by the
    /// configured timeout. Only one connect may be in flight at a time.
    pub async fn connect(&self, cancel: &CancellationToken) -> Result<(), SdkwaError> {
        if self.connecting.swap(true, Ordering::SeqCst) {
            return Err(SdkwaError::WebSocket("push: connect already in progress".into()));
        }
        let result = self.open(cancel).await;
        self.connecting.store(false, Ordering::SeqCst);
        result
    }

    async fn open(&self, cancel: &CancellationToken) -> Result<(), SdkwaError> {
        if self.is_connected().await {
            return Err(SdkwaError::WebSocket("push: already connected".into()));
        }

        let handshake = tokio::time::timeout(
            self.handshake_timeout,
            tokio_tungstenite::connect_async(self.url.as_str()),
        );
        let (ws, _response) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SdkwaError::Cancelled),
            res = handshake => match res {
                Ok(Ok(pair)) => pair,
                Ok(Err(e)) => {
                    return Err(SdkwaError::WebSocket(format!("push: connect failed: {e}")))
                }
                Err(_) => {
                    return Err(SdkwaError::WebSocket(format!(
                        "push: handshake timed out after {:?}",
                        self.handshake_timeout
                    )))
                }
            },
        };

        *self.closed.lock().unwrap_or_else(PoisonError::into_inner) = CancellationToken::new();
        *self.stream.lock().await = Some(ws);
        info!("push: connected to {}", self.display_url());
        Ok(())
    }

    /// Read and dispatch pushed notifications.
    ///
    /// Returns `Ok` on normal, going-away or abnormal closure, end of stream,
    /// or [`close`](Self::close). Returns [`SdkwaError::Cancelled`] when
    /// `cancel` fires and a `WebSocket` error for any other close code or a
    /// read failure. The connection is consumed either way.
    pub async fn listen(
        &self,
        cancel: &CancellationToken,
        registry: &CallbackRegistry,
    ) -> Result<(), SdkwaError> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(SdkwaError::WebSocket("push: already has a listener".into()));
        }

        let Some(ws) = self.stream.lock().await.take() else {
            self.listening.store(false, Ordering::SeqCst);
            return Err(SdkwaError::WebSocket("push: not connected".into()));
        };

        let mut source = SocketSource {
            ws,
            closed: self.closed_token(),
        };
        let result = deliver(&mut source, registry, cancel, &self.reporter).await;
        source.shutdown().await;
        self.listening.store(false, Ordering::SeqCst);

        match &result {
            Ok(()) => info!("push: connection closed"),
            Err(e) if e.is_cancelled() => info!("push: listener cancelled"),
            Err(e) => warn!("push: listener stopped: {e}"),
        }
        result
    }

    /// Stop the listener, or close the idle connection if nobody listens.
    /// Safe to call repeatedly and from any task.
    pub async fn close(&self) -> Result<(), SdkwaError> {
        self.closed_token().cancel();
        if self.listening.load(Ordering::SeqCst) {
            // The listener sees the token and closes the socket itself.
            return Ok(());
        }

        let idle = self.stream.lock().await.take();
        if let Some(mut ws) = idle {
            match ws.close(None).await {
                Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => {}
                Err(e) => return Err(SdkwaError::WebSocket(format!("push: close failed: {e}"))),
            }
        }
        Ok(())
    }
}

struct SocketSource {
    ws: WsStream,
    closed: CancellationToken,
}

impl SocketSource {
    async fn shutdown(&mut self) {
        if let Err(e) = self.ws.close(None).await {
            debug!("push: close after listen: {e}");
        }
    }
}

#[async_trait]
impl NotificationSource for SocketSource {
    fn name(&self) -> &str {
        "push"
    }

    fn failure_stage(&self) -> Stage {
        Stage::Read
    }

    async fn pull(&mut self) -> Result<Pull, SdkwaError> {
        loop {
            let msg = tokio::select! {
                biased;
                _ = self.closed.cancelled() => return Ok(Pull::Closed),
                msg = self.ws.next() => msg,
            };

            match msg {
                None => return Ok(Pull::Closed),
                Some(Ok(Message::Text(text))) => return Ok(parse_message(text.as_bytes())),
                Some(Ok(Message::Binary(bytes))) => return Ok(parse_message(&bytes)),
                Some(Ok(Message::Close(frame))) => return close_outcome(frame),
                // Pings are answered by tungstenite itself.
                Some(Ok(_)) => continue,
                Some(Err(e)) => return read_error(e),
            }
        }
    }
}

fn parse_message(bytes: &[u8]) -> Pull {
    match Notification::from_slice(bytes) {
        Ok(n) if n.is_empty() => Pull::Empty,
        Ok(n) => Pull::Notification(n),
        Err(e) => Pull::Failed(e),
    }
}

fn close_outcome(frame: Option<CloseFrame<'_>>) -> Result<Pull, SdkwaError> {
    let Some(frame) = frame else {
        return Ok(Pull::Closed);
    };
    match frame.code {
        CloseCode::Normal | CloseCode::Away | CloseCode::Abnormal => Ok(Pull::Closed),
        code => Err(SdkwaError::WebSocket(format!(
            "push: server closed connection with code {}: {}",
            u16::from(code),
            frame.reason
        ))),
    }
}

fn read_error(e: WsError) -> Result<Pull, SdkwaError> {
    match e {
        WsError::ConnectionClosed
        | WsError::AlreadyClosed
        | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => Ok(Pull::Closed),
        WsError::Io(ref io)
            if matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::UnexpectedEof
                    | ErrorKind::BrokenPipe
            ) =>
        {
            Ok(Pull::Closed)
        }
        other => Err(SdkwaError::WebSocket(format!("push: read failed: {other}"))),
    }
}
