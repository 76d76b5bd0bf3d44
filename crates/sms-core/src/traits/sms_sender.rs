// # SMS Sender Trait
//
// Defines the interface for forwarding an outbound message to one SMS
// gateway.
//
// ## Implementations
//
// - Twilio: `sms-provider-twilio` crate
// - Future: AWS SNS, Vonage, SMPP bridges, etc.
//
// ## Usage
//
// ```rust,ignore
// use sms_core::SmsSender;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let sender = /* SmsSender implementation */;
//
//     let segments = sender.send_sms("+15551234567", "hello").await?;
//     println!("sent in {segments} segment(s)");
//
//     sender.destroy();
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for provider sender implementations
///
/// A sender wraps one provider account/session and performs a single
/// blocking network-bound API call per `send_sms` invocation.
///
/// # Thread Safety
///
/// Implementations must be thread-safe; the dispatch service shares one
/// sender across concurrent send calls.
///
/// # Boundaries
///
/// Senders are external integrations and stay isolated:
/// - One API call per `send_sms` invocation, no internal retries or
///   backoff (failures are surfaced immediately to the caller)
/// - No background tasks; timeouts are the sender's own blocking-call
///   timeout, nothing above it
/// - No access to the settings store or to other senders
/// - Credentials never appear in logs or `Debug` output
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send one message to one destination
    ///
    /// # Parameters
    ///
    /// - `number_to`: Destination address; format validation is owned by
    ///   the provider, not by the dispatch layer
    /// - `message`: Message body
    ///
    /// # Returns
    ///
    /// - `Ok(i32)`: Provider-defined status code (for Twilio, the segment
    ///   count the API reported)
    /// - `Err(Error)`: If the provider rejected or failed the send
    async fn send_sms(&self, number_to: &str, message: &str) -> Result<i32, crate::Error>;

    /// Release any held network/resource handles
    ///
    /// Called exactly once by the dispatch service when the sender is
    /// replaced or the service shuts down. Must be safe to call while a
    /// previously captured send is still completing.
    fn destroy(&self);

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing senders from configuration
pub trait SmsSenderFactory: Send + Sync {
    /// Create an SmsSender instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Provider configuration for this factory's provider type
    ///
    /// # Returns
    ///
    /// A boxed SmsSender trait object, or an error if the configuration is
    /// invalid for this provider
    fn create(
        &self,
        config: &crate::config::SmsProviderConfig,
    ) -> Result<Box<dyn SmsSender>, crate::Error>;
}
