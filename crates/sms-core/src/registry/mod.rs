//! Plugin-based sender registry
//!
//! The registry allows SMS provider factories to be registered dynamically
//! at runtime, avoiding hardcoded if-else chains over provider types.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sms_core::registry::SenderRegistry;
//! use sms_core::config::SmsProviderConfig;
//!
//! let registry = SenderRegistry::new();
//! registry.register("twilio", Box::new(twilio_factory));
//!
//! let config = SmsProviderConfig::Twilio { /* ... */ };
//! let sender = registry.create_sender(&config)?;
//! ```
//!
//! ## Registration
//!
//! Provider crates should register themselves during initialization:
//!
//! ```rust,ignore
//! // In the sms-provider-twilio crate
//! pub fn register(registry: &SenderRegistry) {
//!     registry.register("twilio", Box::new(TwilioFactory));
//! }
//! ```

use crate::config::SmsProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{SmsSender, SmsSenderFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry for plugin-based sender creation
///
/// Maintains a map of provider type names to factory objects, allowing
/// dynamic instantiation of senders based on configuration.
///
/// ## Thread Safety
///
/// Uses interior mutability with RwLock, allowing concurrent reads and
/// exclusive writes.
#[derive(Default)]
pub struct SenderRegistry {
    factories: RwLock<HashMap<String, Box<dyn SmsSenderFactory>>>,
}

impl SenderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sender factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "twilio")
    /// - `factory`: Factory object for creating sender instances
    pub fn register(&self, name: impl Into<String>, factory: Box<dyn SmsSenderFactory>) {
        let name = name.into();
        let mut factories = self.factories.write().unwrap();
        factories.insert(name, factory);
    }

    /// Create a sender from configuration
    ///
    /// Dispatches on the configuration's type tag to the registered
    /// factory.
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn SmsSender>)`: Created sender instance
    /// - `Err(Error)`: If the provider type is not registered or creation
    ///   fails
    pub fn create_sender(&self, config: &SmsProviderConfig) -> Result<Box<dyn SmsSender>> {
        let provider_type = config.type_name();
        let factories = self.factories.read().unwrap();

        let factory = factories
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_factories(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap();
        factories.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_factory(&self, name: &str) -> bool {
        let factories = self.factories.read().unwrap();
        factories.contains_key(name)
    }
}
