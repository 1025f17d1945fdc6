//! # sdkwa-notifications
//!
//! Delivery of gateway notifications to registered callbacks.
//!
//! Three ways in, one way out: the [`NotificationPoller`] drains the remote
//! queue, the [`PushChannel`] reads the WebSocket stream and the
//! [`webhook`] router accepts HTTP pushes. All of them classify each payload
//! and dispatch it through a shared [`CallbackRegistry`].

pub mod delivery;
pub mod poller;
pub mod push;
pub mod registry;
pub mod webhook;

pub use delivery::{DeliveryError, Stage};
pub use poller::NotificationPoller;
pub use push::{push_url, PushChannel};
pub use registry::{CallbackRegistry, Handler};
