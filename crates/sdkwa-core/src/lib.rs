//! # sdkwa-core
//!
//! Core types, traits, configuration, and error handling for the SDKWA client.

pub mod config;
pub mod error;
pub mod event;
pub mod messenger;
pub mod notification;
pub mod payload;
pub mod traits;
