//! Event kind → callback table shared by every delivery path.

use async_trait::async_trait;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::event::EventKind;
use sdkwa_core::notification::Notification;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Callback invoked with the full notification payload.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Adapter for synchronous closures.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync,
{
    async fn handle(&self, notification: &Notification) -> anyhow::Result<()> {
        (self.0)(notification)
    }
}

/// Adapter for closures returning a future. The closure receives an owned
/// copy of the notification.
pub struct AsyncFnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> Handler for AsyncFnHandler<F>
where
    F: Fn(Notification) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, notification: &Notification) -> anyhow::Result<()> {
        (self.0)(notification.clone()).await
    }
}

/// At most one handler per [`EventKind`]; re-registering replaces the old one.
///
/// Shared as `Arc<CallbackRegistry>` between pollers, push channels and the
/// webhook server. Dispatch clones the handler out of the lock, so handlers
/// may run concurrently with registration.
#[derive(Default)]
pub struct CallbackRegistry {
    handlers: RwLock<HashMap<EventKind, Arc<dyn Handler>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`, replacing any previous one.
    /// Registrations for [`EventKind::Unknown`] are ignored.
    pub fn register_arc(&self, kind: EventKind, handler: Arc<dyn Handler>) {
        if kind.is_unknown() {
            tracing::debug!("registry: ignoring handler for unknown event kind");
            return;
        }
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, handler);
    }

    pub fn register<H: Handler + 'static>(&self, kind: EventKind, handler: H) {
        self.register_arc(kind, Arc::new(handler));
    }

    pub fn register_fn<F>(&self, kind: EventKind, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(kind, FnHandler(f));
    }

    pub fn register_async<F, Fut>(&self, kind: EventKind, f: F)
    where
        F: Fn(Notification) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.register(kind, AsyncFnHandler(f));
    }

    /// Remove the handler for `kind`. Returns whether one was registered.
    pub fn unregister(&self, kind: &EventKind) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(kind)
            .is_some()
    }

    pub fn is_registered(&self, kind: &EventKind) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke the handler for `kind`, if any.
    ///
    /// No handler is a successful no-op. A handler error is returned as
    /// [`SdkwaError::Handler`] and not logged here.
    pub async fn dispatch(
        &self,
        kind: &EventKind,
        notification: &Notification,
    ) -> Result<(), SdkwaError> {
        let handler = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers.get(kind).cloned()
        };
        let Some(handler) = handler else {
            return Ok(());
        };

        handler
            .handle(notification)
            .await
            .map_err(|e| SdkwaError::Handler {
                kind: kind.to_string(),
                message: format!("{e:#}"),
            })
    }

    /// Classify and dispatch in one step.
    pub async fn dispatch_notification(&self, notification: &Notification) -> Result<(), SdkwaError> {
        self.dispatch(&notification.kind(), notification).await
    }

    pub fn on_state_instance<F>(&self, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_fn(EventKind::StateInstanceChanged, f);
    }

    pub fn on_outgoing_message_status<F>(&self, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_fn(EventKind::OutgoingMessageStatus, f);
    }

    pub fn on_incoming_message_text<F>(&self, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_fn(EventKind::IncomingMessageText, f);
    }

    /// Image messages.
    pub fn on_incoming_message_file<F>(&self, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_fn(EventKind::IncomingMessageImage, f);
    }

    pub fn on_incoming_message_location<F>(&self, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_fn(EventKind::IncomingMessageLocation, f);
    }

    pub fn on_incoming_message_contact<F>(&self, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_fn(EventKind::IncomingMessageContact, f);
    }

    pub fn on_incoming_message_extended_text<F>(&self, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_fn(EventKind::IncomingMessageExtendedText, f);
    }

    pub fn on_device_info<F>(&self, f: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_fn(EventKind::DeviceInfo, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn text_message() -> Notification {
        Notification::from_value(json!({
            "typeWebhook": "incomingMessageReceived",
            "messageData": {"typeMessage": "textMessage", "textMessageData": {"textMessage": "hi"}}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_invokes_registered_handler_with_payload() {
        let registry = CallbackRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.on_incoming_message_text(move |n| {
            sink.lock().unwrap().push(n.clone());
            Ok(())
        });

        let n = text_message();
        registry.dispatch_notification(&n).await.unwrap();
        assert_eq!(seen.lock().unwrap().as_slice(), &[n]);
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let registry = CallbackRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&first);
        registry.register_fn(EventKind::IncomingMessageText, move |_| {
            f.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let s = Arc::clone(&second);
        registry.register_fn(EventKind::IncomingMessageText, move |_| {
            s.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        registry.dispatch_notification(&text_message()).await.unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_and_unknown_kinds_are_noops() {
        let registry = CallbackRegistry::new();
        registry.register_fn(EventKind::Unknown, |_| anyhow::bail!("must never run"));
        assert!(registry.is_empty());

        let unknown = Notification::from_value(json!({"messageData": {}})).unwrap();
        assert_eq!(unknown.kind(), EventKind::Unknown);
        registry.dispatch_notification(&unknown).await.unwrap();
        registry.dispatch_notification(&text_message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_error_is_returned_with_kind() {
        let registry = CallbackRegistry::new();
        registry.on_state_instance(|_| anyhow::bail!("db unavailable"));

        let n = Notification::from_value(json!({"typeWebhook": "stateInstanceChanged"})).unwrap();
        let err = registry.dispatch_notification(&n).await.unwrap_err();
        match err {
            SdkwaError::Handler { kind, message } => {
                assert_eq!(kind, "stateInstanceChanged");
                assert_eq!(message, "db unavailable");
            }
            other => panic!("expected Handler error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_async_handler_and_other_kinds() {
        let registry = CallbackRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        registry.register_async(EventKind::Other("incomingCall".into()), move |n| {
            let c = Arc::clone(&c);
            async move {
                assert_eq!(n.category(), Some("incomingCall"));
                tokio::task::yield_now().await;
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }
        });

        let n = Notification::from_value(json!({"typeWebhook": "incomingCall"})).unwrap();
        registry.dispatch_notification(&n).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    /// Handler that awaits before counting its call.
    fn counting(calls: &Arc<AtomicUsize>) -> impl Handler + 'static {
        let calls = Arc::clone(calls);
        AsyncFnHandler(move |_| {
            let calls = Arc::clone(&calls);
            async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dispatch_and_reregistration() {
        let registry = Arc::new(CallbackRegistry::new());
        let original = Arc::new(AtomicUsize::new(0));
        let interim = Arc::new(AtomicUsize::new(0));
        let newest = Arc::new(AtomicUsize::new(0));
        registry.register(EventKind::IncomingMessageText, counting(&original));

        let mut dispatchers = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            dispatchers.push(tokio::spawn(async move {
                for _ in 0..20 {
                    registry.dispatch_notification(&text_message()).await.unwrap();
                }
            }));
        }
        let writer = {
            let registry = Arc::clone(&registry);
            let interim = Arc::clone(&interim);
            let newest = Arc::clone(&newest);
            tokio::spawn(async move {
                for _ in 0..50 {
                    registry.register(EventKind::IncomingMessageText, counting(&interim));
                    tokio::task::yield_now().await;
                }
                registry.register(EventKind::IncomingMessageText, counting(&newest));
            })
        };

        tokio::time::timeout(Duration::from_secs(10), async {
            writer.await.unwrap();
            for task in dispatchers {
                task.await.unwrap();
            }
        })
        .await
        .expect("dispatch and registration deadlocked");

        let total = |c: &Arc<AtomicUsize>| c.load(Ordering::SeqCst);
        assert_eq!(total(&original) + total(&interim) + total(&newest), 160);
        assert_eq!(registry.len(), 1);

        let before = (total(&original), total(&interim), total(&newest));
        registry.dispatch_notification(&text_message()).await.unwrap();
        assert_eq!(total(&original), before.0);
        assert_eq!(total(&interim), before.1);
        assert_eq!(total(&newest), before.2 + 1);
    }

    #[tokio::test]
    async fn test_unregister() {
        let registry = CallbackRegistry::new();
        registry.on_device_info(|_| Ok(()));
        assert!(registry.is_registered(&EventKind::DeviceInfo));
        assert!(registry.unregister(&EventKind::DeviceInfo));
        assert!(!registry.unregister(&EventKind::DeviceInfo));
    }
}
