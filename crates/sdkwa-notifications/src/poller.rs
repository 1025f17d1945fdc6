//! Interval polling of the remote notification queue.

use async_trait::async_trait;
use sdkwa_client::Client;
use sdkwa_core::config::NotificationsConfig;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use sdkwa_core::notification::Notification;
use sdkwa_core::traits::NotificationQueue;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::delivery::{deliver, DeliveryError, ErrorReporter, NotificationSource, Pull, Stage};
use crate::registry::CallbackRegistry;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Pulls one notification per tick, dispatches it, then deletes it by
/// receipt id whether or not the handler succeeded.
pub struct NotificationPoller<Q = Client> {
    queue: Q,
    interval: Duration,
    options: RequestOptions,
    reporter: ErrorReporter,
}

impl<Q: NotificationQueue> NotificationPoller<Q> {
    pub fn new(queue: Q) -> Self {
        Self {
            queue,
            interval: DEFAULT_POLL_INTERVAL,
            options: RequestOptions::default(),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn from_config(queue: Q, config: &NotificationsConfig) -> Self {
        Self::new(queue).with_interval(config.poll_interval())
    }

    /// Zero is clamped to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Options applied to every fetch and delete, e.g. a messenger override.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Forward absorbed failures to `sink` in addition to logging them.
    pub fn with_error_sink(mut self, sink: mpsc::UnboundedSender<DeliveryError>) -> Self {
        self.reporter = ErrorReporter::with_sink(sink);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until `cancel` fires.
    ///
    /// The first fetch happens one interval after start. Always ends with
    /// [`SdkwaError::Cancelled`]; fetch, dispatch and delete failures are
    /// reported and polling carries on.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        registry: &CallbackRegistry,
    ) -> Result<(), SdkwaError> {
        info!("poller: started (interval {:?})", self.interval);

        let mut timer = interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut source = QueueSource {
            queue: &self.queue,
            timer,
            options: self.options,
        };
        let result = deliver(&mut source, registry, cancel, &self.reporter).await;

        info!("poller: stopped");
        result
    }
}

struct QueueSource<'a, Q> {
    queue: &'a Q,
    timer: Interval,
    options: RequestOptions,
}

#[async_trait]
impl<'a, Q: NotificationQueue> NotificationSource for QueueSource<'a, Q> {
    fn name(&self) -> &str {
        "poller"
    }

    fn failure_stage(&self) -> Stage {
        Stage::Fetch
    }

    async fn pull(&mut self) -> Result<Pull, SdkwaError> {
        self.timer.tick().await;
        match self.queue.receive_notification(self.options).await {
            Ok(n) if n.is_empty() => Ok(Pull::Empty),
            Ok(n) => Ok(Pull::Notification(n)),
            Err(e) => Ok(Pull::Failed(e)),
        }
    }

    async fn acknowledge(&mut self, notification: &Notification) -> Result<(), SdkwaError> {
        let Some(receipt_id) = notification.receipt_id() else {
            return Ok(());
        };
        let deleted = self
            .queue
            .delete_notification(receipt_id, self.options)
            .await?;
        if !deleted {
            debug!("poller: receipt {receipt_id} was already gone");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory queue that cancels the poller once its script runs out.
    struct MockQueue {
        responses: Mutex<VecDeque<Result<Value, SdkwaError>>>,
        deletes: Arc<Mutex<Vec<i64>>>,
        fetches: Arc<AtomicUsize>,
        fail_delete: bool,
        cancel: CancellationToken,
    }

    impl MockQueue {
        fn new(responses: Vec<Result<Value, SdkwaError>>, cancel: &CancellationToken) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                deletes: Arc::new(Mutex::new(Vec::new())),
                fetches: Arc::new(AtomicUsize::new(0)),
                fail_delete: false,
                cancel: cancel.clone(),
            }
        }
    }

    #[async_trait]
    impl NotificationQueue for MockQueue {
        async fn receive_notification(
            &self,
            _opts: RequestOptions,
        ) -> Result<Notification, SdkwaError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(value)) => Notification::from_value(value),
                Some(Err(e)) => Err(e),
                None => {
                    self.cancel.cancel();
                    Ok(Notification::empty())
                }
            }
        }

        async fn delete_notification(
            &self,
            receipt_id: i64,
            _opts: RequestOptions,
        ) -> Result<bool, SdkwaError> {
            self.deletes.lock().unwrap().push(receipt_id);
            if self.fail_delete {
                return Err(SdkwaError::Transport("delete timed out".into()));
            }
            Ok(true)
        }
    }

    fn text_payload(receipt_id: i64) -> Value {
        json!({
            "typeWebhook": "incomingMessageReceived",
            "messageData": {"typeMessage": "textMessage", "textMessageData": {"textMessage": "hi"}},
            "receiptId": receipt_id
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_then_deletes_once() {
        let cancel = CancellationToken::new();
        let queue = MockQueue::new(vec![Ok(text_payload(42))], &cancel);
        let deletes = Arc::clone(&queue.deletes);

        let registry = CallbackRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.on_incoming_message_text(move |n| {
            sink.lock().unwrap().push(n.payload().clone());
            Ok(())
        });

        let poller = NotificationPoller::new(queue);
        let err = poller.run(&cancel, &registry).await.unwrap_err();
        assert!(err.is_cancelled());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(Value::Object(seen[0].clone()), text_payload(42));
        assert_eq!(*deletes.lock().unwrap(), vec![42]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_notification_is_not_dispatched_or_deleted() {
        let cancel = CancellationToken::new();
        let queue = MockQueue::new(vec![Ok(json!({})), Ok(Value::Null)], &cancel);
        let deletes = Arc::clone(&queue.deletes);
        let fetches = Arc::clone(&queue.fetches);

        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        for kind in sdkwa_core::event::EventKind::KNOWN {
            let c = Arc::clone(&calls);
            registry.register_fn(kind, move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let err = NotificationPoller::new(queue)
            .run(&cancel, &registry)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(deletes.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_error_still_acknowledges() {
        let cancel = CancellationToken::new();
        let queue = MockQueue::new(vec![Ok(text_payload(7))], &cancel);
        let deletes = Arc::clone(&queue.deletes);

        let registry = CallbackRegistry::new();
        registry.on_incoming_message_text(|_| anyhow::bail!("boom"));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = NotificationPoller::new(queue).with_error_sink(tx);
        let err = poller.run(&cancel, &registry).await.unwrap_err();
        assert!(err.is_cancelled());

        assert_eq!(*deletes.lock().unwrap(), vec![7]);
        let reported = rx.try_recv().unwrap();
        assert_eq!(reported.stage, Stage::Dispatch);
        assert_eq!(reported.receipt_id, Some(7));
        assert!(matches!(reported.error, SdkwaError::Handler { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_and_delete_failures_do_not_stop_polling() {
        let cancel = CancellationToken::new();
        let mut queue = MockQueue::new(
            vec![
                Err(SdkwaError::Transport("connection refused".into())),
                Ok(text_payload(1)),
                Ok(text_payload(2)),
            ],
            &cancel,
        );
        queue.fail_delete = true;
        let deletes = Arc::clone(&queue.deletes);
        let fetches = Arc::clone(&queue.fetches);

        let registry = CallbackRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let err = NotificationPoller::new(queue)
            .with_error_sink(tx)
            .run(&cancel, &registry)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        assert_eq!(fetches.load(Ordering::SeqCst), 4);
        assert_eq!(*deletes.lock().unwrap(), vec![1, 2]);

        let mut stages = Vec::new();
        while let Ok(e) = rx.try_recv() {
            stages.push(e.stage);
        }
        assert_eq!(stages, vec![Stage::Fetch, Stage::Acknowledge, Stage::Acknowledge]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_first_wait_skips_fetch() {
        let cancel = CancellationToken::new();
        let queue = MockQueue::new(vec![Ok(text_payload(1))], &cancel);
        let fetches = Arc::clone(&queue.fetches);
        let registry = Arc::new(CallbackRegistry::new());

        let poller = NotificationPoller::new(queue);
        let token = cancel.clone();
        let reg = Arc::clone(&registry);
        let handle = tokio::spawn(async move { poller.run(&token, &reg).await });

        tokio::time::sleep(Duration::from_secs(2)).await;
        cancel.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_waits_one_interval() {
        let cancel = CancellationToken::new();
        let queue = MockQueue::new(Vec::new(), &cancel);
        let registry = CallbackRegistry::new();

        let started = Instant::now();
        let poller = NotificationPoller::new(queue).with_interval(Duration::from_secs(3));
        let err = poller.run(&cancel, &registry).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[test]
    fn test_from_config() {
        let cancel = CancellationToken::new();
        let config = NotificationsConfig {
            poll_interval_secs: 9,
            handshake_timeout_secs: 10,
        };
        let poller = NotificationPoller::from_config(MockQueue::new(Vec::new(), &cancel), &config);
        assert_eq!(poller.interval(), Duration::from_secs(9));
    }
}
