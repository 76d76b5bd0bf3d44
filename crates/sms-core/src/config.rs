//! Configuration types for the SMS dispatch service
//!
//! Provider configuration is a tagged enum, one variant per supported
//! gateway, stored as the JSON value of the `"sms"` administrative
//! settings record.

use serde::{Deserialize, Serialize};

/// SMS provider configuration
///
/// Opaque to the dispatch service beyond its type tag; each variant is
/// interpreted by the matching [`SmsSenderFactory`](crate::SmsSenderFactory).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SmsProviderConfig {
    /// Twilio provider
    Twilio {
        /// Twilio account SID
        account_sid: String,
        /// Twilio auth token
        account_token: String,
        /// Sender phone number or messaging service identifier
        number_from: String,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl SmsProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SmsProviderConfig::Twilio {
                account_sid,
                account_token,
                number_from,
            } => {
                if account_sid.is_empty() {
                    return Err(crate::Error::config("Twilio account SID cannot be empty"));
                }
                if account_token.is_empty() {
                    return Err(crate::Error::config("Twilio auth token cannot be empty"));
                }
                if number_from.is_empty() {
                    return Err(crate::Error::config("Twilio sender number cannot be empty"));
                }
                Ok(())
            }
            SmsProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            SmsProviderConfig::Twilio { .. } => "twilio",
            SmsProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

/// A test-send request carrying its own transient provider configuration
///
/// The configuration here is never installed as the active sender; an
/// ephemeral sender is built for the single test send and destroyed
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSmsRequest {
    /// Provider configuration to test
    pub provider_configuration: SmsProviderConfig,
    /// Destination address
    pub number_to: String,
    /// Message body
    pub message: String,
}
