//! The delivery driver shared by the poller and the push channel.
//!
//! A [`NotificationSource`] yields payloads; [`deliver`] classifies each one,
//! dispatches it through the registry and asks the source to acknowledge it.
//! Per-notification failures are reported and never stop the loop.

use async_trait::async_trait;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::event::EventKind;
use sdkwa_core::notification::Notification;
use std::fmt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::registry::CallbackRegistry;

/// Outcome of one [`NotificationSource::pull`].
#[derive(Debug)]
pub enum Pull {
    Notification(Notification),
    /// Nothing pending; go around again.
    Empty,
    /// Reportable failure; the source stays usable.
    Failed(SdkwaError),
    /// The source ended cleanly.
    Closed,
}

/// Where in the pipeline a delivery failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Read,
    Dispatch,
    Acknowledge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Read => "read",
            Stage::Dispatch => "dispatch",
            Stage::Acknowledge => "acknowledge",
        })
    }
}

/// A stream of notifications: the remote queue or a push connection.
#[async_trait]
pub trait NotificationSource: Send {
    /// Short name used in logs and delivery errors.
    fn name(&self) -> &str;

    /// Stage attributed to [`Pull::Failed`] results.
    fn failure_stage(&self) -> Stage {
        Stage::Fetch
    }

    /// Wait for and return the next notification.
    ///
    /// `Err` ends delivery with that error.
    async fn pull(&mut self) -> Result<Pull, SdkwaError>;

    /// Confirm a dispatched notification. Called exactly once per pulled
    /// notification, whether or not its handler failed.
    async fn acknowledge(&mut self, _notification: &Notification) -> Result<(), SdkwaError> {
        Ok(())
    }
}

/// A failure absorbed by a delivery loop.
#[derive(Debug)]
pub struct DeliveryError {
    pub source: String,
    pub stage: Stage,
    pub kind: Option<EventKind>,
    pub receipt_id: Option<i64>,
    pub error: SdkwaError,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} failed", self.source, self.stage)?;
        if let Some(kind) = &self.kind {
            write!(f, " for {kind}")?;
        }
        if let Some(id) = self.receipt_id {
            write!(f, " (receipt {id})")?;
        }
        write!(f, ": {}", self.error)
    }
}

/// Logs delivery failures and forwards them to an optional side channel.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    sink: Option<mpsc::UnboundedSender<DeliveryError>>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: mpsc::UnboundedSender<DeliveryError>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn report(&self, err: DeliveryError) {
        match err.stage {
            Stage::Fetch | Stage::Read => warn!("{err}"),
            Stage::Dispatch | Stage::Acknowledge => error!("{err}"),
        }
        if let Some(sink) = &self.sink {
            // A dropped receiver only means nobody is listening any more.
            let _ = sink.send(err);
        }
    }
}

/// Drive `source` until it closes, fails, or `cancel` fires.
///
/// Cancellation is observed while waiting on the source and returns
/// [`SdkwaError::Cancelled`]. Dispatch and acknowledgement of a pulled
/// notification always run to completion.
pub async fn deliver<S>(
    source: &mut S,
    registry: &CallbackRegistry,
    cancel: &CancellationToken,
    reporter: &ErrorReporter,
) -> Result<(), SdkwaError>
where
    S: NotificationSource + ?Sized,
{
    loop {
        let pulled = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SdkwaError::Cancelled),
            pulled = source.pull() => pulled?,
        };

        let notification = match pulled {
            Pull::Notification(n) => n,
            Pull::Empty => continue,
            Pull::Failed(error) => {
                reporter.report(DeliveryError {
                    source: source.name().to_string(),
                    stage: source.failure_stage(),
                    kind: None,
                    receipt_id: None,
                    error,
                });
                continue;
            }
            Pull::Closed => return Ok(()),
        };

        let kind = notification.kind();
        let receipt_id = notification.receipt_id();
        debug!("{}: dispatching {kind}", source.name());

        if let Err(error) = registry.dispatch(&kind, &notification).await {
            reporter.report(DeliveryError {
                source: source.name().to_string(),
                stage: Stage::Dispatch,
                kind: Some(kind.clone()),
                receipt_id,
                error,
            });
        }

        if let Err(error) = source.acknowledge(&notification).await {
            reporter.report(DeliveryError {
                source: source.name().to_string(),
                stage: Stage::Acknowledge,
                kind: Some(kind),
                receipt_id,
                error,
            });
        }
    }
}
