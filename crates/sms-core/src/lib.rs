// # sms-core
//
// Core library for the SMS dispatch service.
//
// ## Architecture Overview
//
// This library provides the configuration-driven dispatch layer for
// outbound SMS:
// - **SmsSender**: Trait for provider-specific senders (one per gateway)
// - **SmsSenderFactory**: Trait for constructing senders from configuration
// - **SettingsStore**: Trait for the administrative settings records that
//   hold the provider configuration
// - **SenderRegistry**: Plugin-based registry mapping provider type names
//   to factories
// - **SmsService**: The dispatch service that holds at most one active
//   sender, refreshes it from stored configuration, and forwards send
//   calls to it
//
// ## Design Principles
//
// 1. **Separation of Concerns**: The service owns the sender lifecycle;
//    transport and protocol details live in provider crates
// 2. **Plugin-Based**: Providers are registered dynamically, no hard-coded
//    if-else over provider types
// 3. **Stale-Over-Outage**: A failed configuration refresh keeps the
//    previously working sender installed
// 4. **Library-First**: The service is constructed and started explicitly
//    by its owner; no ambient framework wiring

pub mod config;
pub mod error;
pub mod registry;
pub mod service;
pub mod settings;
pub mod traits;

// Re-export core types for convenience
pub use config::{SmsProviderConfig, TestSmsRequest};
pub use error::{Error, ErrorKind, Result, root_cause_message};
pub use registry::SenderRegistry;
pub use service::{SMS_SETTINGS_KEY, SmsService};
pub use settings::{FileSettingsStore, MemorySettingsStore};
pub use traits::{AdminSettings, SettingsScope, SettingsStore, SmsSender, SmsSenderFactory};
