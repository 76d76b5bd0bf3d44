//! Core traits for the SMS dispatch service
//!
//! This module defines the abstract interfaces that all implementations
//! must follow.
//!
//! - [`SmsSender`]: Forward a message to one SMS gateway
//! - [`SmsSenderFactory`]: Construct a sender from provider configuration
//! - [`SettingsStore`]: Administrative settings records holding the
//!   provider configuration

pub mod settings_store;
pub mod sms_sender;

pub use settings_store::{AdminSettings, SettingsScope, SettingsStore};
pub use sms_sender::{SmsSender, SmsSenderFactory};
