//! The SMS dispatch service
//!
//! `SmsService` holds at most one active provider sender, refreshes it
//! from stored configuration, and forwards outbound sends to it.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐    "sms" record    ┌────────────────┐
//! │ SettingsStore │ ──────────────────▶│ SenderRegistry │
//! └───────────────┘  SmsProviderConfig └────────────────┘
//!                                              │ create
//!                                              ▼
//!                   ┌────────────┐    ┌─────────────────┐
//!        send ─────▶│ SmsService │───▶│ active SmsSender │
//!                   └────────────┘    └─────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! 1. Construct with [`SmsService::new()`]
//! 2. [`start()`](SmsService::start) performs the initial configuration
//!    refresh
//! 3. [`refresh_configuration()`](SmsService::refresh_configuration) on
//!    every administrative settings change
//! 4. [`stop()`](SmsService::stop) destroys the active sender exactly once
//!
//! ## Concurrency
//!
//! `send`, `send_batch`, `send_test` and `refresh_configuration` may be
//! invoked concurrently. The active-sender slot is guarded by an async
//! RwLock; sends clone the `Arc` under the read lock and keep it for the
//! duration of the call, so a refresh swapping the slot never invalidates
//! a send already in flight. The displaced sender is destroyed after the
//! swap, outside the critical section.

use crate::config::{SmsProviderConfig, TestSmsRequest};
use crate::error::{Error, Result, root_cause_message};
use crate::registry::SenderRegistry;
use crate::traits::{AdminSettings, SettingsScope, SettingsStore, SmsSender};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Settings key under which the provider configuration is stored
pub const SMS_SETTINGS_KEY: &str = "sms";

/// Configuration-driven SMS dispatch service
///
/// Holds the single active sender and the collaborators needed to rebuild
/// it from stored configuration. The settings store and registry are
/// treated as externally synchronized; the sender slot is the only mutable
/// shared state.
pub struct SmsService {
    settings: Arc<dyn SettingsStore>,
    registry: Arc<SenderRegistry>,
    sender: RwLock<Option<Arc<dyn SmsSender>>>,
}

impl SmsService {
    /// Create a new, not-yet-configured dispatch service
    pub fn new(settings: Arc<dyn SettingsStore>, registry: Arc<SenderRegistry>) -> Self {
        Self {
            settings,
            registry,
            sender: RwLock::new(None),
        }
    }

    /// Start the service: perform the initial configuration refresh
    ///
    /// Absent or invalid stored configuration leaves the service in the
    /// "not configured" state; it does not fail startup.
    pub async fn start(&self) {
        self.refresh_configuration().await;
    }

    /// Stop the service: destroy the active sender, exactly once
    ///
    /// Safe to call more than once; later calls find the slot empty.
    pub async fn stop(&self) {
        let old = { self.sender.write().await.take() };
        if let Some(sender) = old {
            info!("destroying active {} sender on shutdown", sender.provider_name());
            sender.destroy();
        }
    }

    /// Rebuild the active sender from stored configuration
    ///
    /// Reads the `"sms"` record in the system scope. Absent configuration
    /// is treated as "not configured" and leaves the state unchanged. On
    /// any failure (fetch, parse, validate, construct) the previous sender
    /// stays installed and the failure is only logged.
    ///
    /// On success the displaced sender (if any) is destroyed after the new
    /// one is installed.
    pub async fn refresh_configuration(&self) {
        let settings = match self
            .settings
            .find_by_key(&SettingsScope::System, SMS_SETTINGS_KEY)
            .await
        {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!("no SMS provider settings stored; leaving sender unchanged");
                return;
            }
            Err(e) => {
                error!("failed to load SMS provider settings: {}", e);
                return;
            }
        };

        let new_sender = match self.build_sender(&settings) {
            Ok(sender) => sender,
            Err(e) => {
                error!("failed to create SMS sender: {}", e);
                return;
            }
        };

        info!("installing {} SMS sender", new_sender.provider_name());
        let old = {
            let mut slot = self.sender.write().await;
            slot.replace(Arc::from(new_sender))
        };

        // In-flight sends hold their own Arc clone; destroying here only
        // releases the displaced sender's handles.
        if let Some(old) = old {
            old.destroy();
        }
    }

    /// Send one message to one destination through the active sender
    ///
    /// # Returns
    ///
    /// - `Ok(i32)`: The provider's status code
    /// - `Err(Error::NotConfigured)`: No active sender installed
    /// - `Err(Error::SendFailed)`: The provider failed; the message is the
    ///   deepest cause from the provider's error chain
    pub async fn send(&self, number_to: &str, message: &str) -> Result<i32> {
        let sender = {
            self.sender
                .read()
                .await
                .clone()
                .ok_or(Error::NotConfigured)?
        };

        self.send_via(sender.as_ref(), number_to, message).await
    }

    /// Send one message to each destination, sequentially, in input order
    ///
    /// The first failure aborts the batch and propagates; destinations
    /// already sent to stay sent (at-least-once per prefix, not
    /// transactional).
    pub async fn send_batch(&self, numbers_to: &[String], message: &str) -> Result<()> {
        for number_to in numbers_to {
            self.send(number_to, message).await?;
        }
        Ok(())
    }

    /// Send a single test message through an ephemeral sender
    ///
    /// Builds a sender from the request's own configuration without
    /// touching the active one, sends once, and destroys the ephemeral
    /// sender on every exit path.
    ///
    /// # Returns
    ///
    /// - `Ok(i32)`: The provider's status code
    /// - `Err(Error::InvalidConfiguration)`: The factory rejected the
    ///   test configuration
    /// - `Err(Error::SendFailed)`: The test send itself failed
    pub async fn send_test(&self, request: &TestSmsRequest) -> Result<i32> {
        let sender = match self.create_sender(&request.provider_configuration) {
            Ok(sender) => sender,
            Err(e) => {
                let cause = root_cause_message(&e);
                warn!("rejected test SMS configuration: {}", cause);
                return Err(Error::InvalidConfiguration(cause));
            }
        };

        let result = self
            .send_via(sender.as_ref(), &request.number_to, &request.message)
            .await;
        sender.destroy();
        result
    }

    /// Parse, validate and construct a sender from a settings record
    fn build_sender(&self, settings: &AdminSettings) -> Result<Box<dyn SmsSender>> {
        let config: SmsProviderConfig = serde_json::from_value(settings.json_value.clone())?;
        self.create_sender(&config)
    }

    fn create_sender(&self, config: &SmsProviderConfig) -> Result<Box<dyn SmsSender>> {
        config.validate()?;
        self.registry.create_sender(config)
    }

    /// Forward one send to a specific sender, wrapping provider failures
    async fn send_via(
        &self,
        sender: &dyn SmsSender,
        number_to: &str,
        message: &str,
    ) -> Result<i32> {
        match sender.send_sms(number_to, message).await {
            Ok(code) => {
                debug!(
                    "sent SMS to {} via {} (status {})",
                    number_to,
                    sender.provider_name(),
                    code
                );
                Ok(code)
            }
            Err(e) => {
                let cause = root_cause_message(&e);
                warn!("unable to send SMS to {}: {}", number_to, cause);
                Err(Error::SendFailed(cause))
            }
        }
    }
}
