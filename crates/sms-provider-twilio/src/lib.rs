// # Twilio SMS Sender
//
// This crate provides a Twilio sender implementation for the SMS dispatch
// service.
//
// ## Behavior
//
// - Makes one HTTP request per send (no retry, no backoff, no queueing -
//   failures are surfaced to the dispatch service immediately)
// - HTTP timeout configured (30 seconds); nothing above it imposes one
// - Specific error handling for HTTP status codes (400, 401/403, 404,
//   429, 5xx)
// - Returns the segment count reported by the API as the send result
// - Destination checked against the E.164 shape before the API call
//   (address validation is delegated to providers by the dispatch layer)
//
// ## Security Requirements
//
// - Auth token NEVER appears in logs or Debug output
// - Sender fails fast on empty credentials (factory-validated)
//
// ## API Reference
//
// - Create Message: POST `/2010-04-01/Accounts/{AccountSid}/Messages.json`
//   with form fields `To`, `From`, `Body` and HTTP basic auth

use async_trait::async_trait;
use serde_json::Value;
use sms_core::config::SmsProviderConfig;
use sms_core::traits::{SmsSender, SmsSenderFactory};
use sms_core::{Error, Result, SenderRegistry};
use std::time::Duration;

/// Twilio API base URL
const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Twilio SMS sender
///
/// One instance wraps one Twilio account. Stateless between sends; the
/// only held resource is the HTTP connection pool, released on
/// `destroy()`.
pub struct TwilioSender {
    /// Twilio account SID
    account_sid: String,

    /// Twilio auth token
    /// ⚠️ NEVER log this value
    account_token: String,

    /// Sender phone number or messaging service identifier
    number_from: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the auth token
impl std::fmt::Debug for TwilioSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSender")
            .field("account_sid", &self.account_sid)
            .field("account_token", &"<REDACTED>")
            .field("number_from", &self.number_from)
            .finish()
    }
}

impl TwilioSender {
    /// Create a new Twilio sender
    ///
    /// # Parameters
    ///
    /// - `account_sid`: Twilio account SID
    /// - `account_token`: Twilio auth token
    /// - `number_from`: Sender number in E.164 form (or a messaging
    ///   service SID)
    ///
    /// # Security
    ///
    /// The auth token will never be logged or displayed in error
    /// messages.
    pub fn new(
        account_sid: impl Into<String>,
        account_token: impl Into<String>,
        number_from: impl Into<String>,
    ) -> Result<Self> {
        let account_sid = account_sid.into();
        let account_token = account_token.into();
        let number_from = number_from.into();

        if account_sid.is_empty() || account_token.is_empty() {
            return Err(Error::config("Twilio credentials cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::provider_with_source("twilio", "failed to build HTTP client", e))?;

        Ok(Self {
            account_sid,
            account_token,
            number_from,
            client,
        })
    }

    /// Check that a destination looks like an E.164 number
    ///
    /// `+` prefix optional, leading digit 1-9, at most 15 digits total.
    fn is_valid_number(number: &str) -> bool {
        let digits = number.strip_prefix('+').unwrap_or(number);
        !digits.is_empty()
            && digits.len() <= 15
            && !digits.starts_with('0')
            && digits.chars().all(|c| c.is_ascii_digit())
    }

    /// Map a non-success HTTP response to a provider error
    async fn status_error(response: reqwest::Response) -> Error {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        match status.as_u16() {
            400 => Error::provider(
                "twilio",
                format!("Invalid request rejected by Twilio: {}", error_text),
            ),
            401 | 403 => Error::provider(
                "twilio",
                format!(
                    "Authentication failed: invalid account SID or auth token. Status: {}",
                    status
                ),
            ),
            404 => Error::provider(
                "twilio",
                format!("Twilio account or resource not found. Status: {}", status),
            ),
            429 => Error::provider(
                "twilio",
                format!("Rate limit exceeded. Status: {}", status),
            ),
            500..=599 => Error::provider(
                "twilio",
                format!("Twilio server error (transient): {} - {}", status, error_text),
            ),
            _ => Error::provider(
                "twilio",
                format!("Send failed: {} - {}", status, error_text),
            ),
        }
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    /// Send one message through the Twilio Messages API
    ///
    /// Makes exactly one POST request. The returned status code is the
    /// segment count Twilio reports for the accepted message.
    async fn send_sms(&self, number_to: &str, message: &str) -> Result<i32> {
        if !Self::is_valid_number(number_to) {
            return Err(Error::provider(
                "twilio",
                format!("Invalid destination number: {}", number_to),
            ));
        }

        tracing::debug!("sending SMS to {} via Twilio", number_to);

        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.account_sid
        );

        let params = [
            ("To", number_to),
            ("From", self.number_from.as_str()),
            ("Body", message),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.account_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::provider_with_source("twilio", "HTTP request failed", e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::provider_with_source("twilio", "failed to parse response", e))?;

        // Twilio reports num_segments as a JSON string
        let segments = body["num_segments"]
            .as_str()
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(1);

        tracing::debug!(
            "Twilio accepted message to {} ({} segment(s))",
            number_to,
            segments
        );
        Ok(segments)
    }

    fn destroy(&self) {
        // The reqwest client's pool is released when the sender is
        // dropped; nothing else is held.
        tracing::debug!("destroying Twilio sender for account {}", self.account_sid);
    }

    fn provider_name(&self) -> &'static str {
        "twilio"
    }
}

/// Factory for creating Twilio senders
pub struct TwilioFactory;

impl SmsSenderFactory for TwilioFactory {
    fn create(&self, config: &SmsProviderConfig) -> Result<Box<dyn SmsSender>> {
        match config {
            SmsProviderConfig::Twilio {
                account_sid,
                account_token,
                number_from,
            } => {
                if account_sid.is_empty() || account_token.is_empty() {
                    return Err(Error::config("Twilio credentials are required"));
                }
                if number_from.is_empty() {
                    return Err(Error::config("Twilio sender number is required"));
                }

                Ok(Box::new(TwilioSender::new(
                    account_sid.clone(),
                    account_token.clone(),
                    number_from.clone(),
                )?))
            }
            _ => Err(Error::config("Invalid config for Twilio provider")),
        }
    }
}

/// Register the Twilio sender with a registry
///
/// Call during initialization to make the Twilio provider available:
///
/// ```rust
/// use sms_core::SenderRegistry;
///
/// let registry = SenderRegistry::new();
/// sms_provider_twilio::register(&registry);
/// assert!(registry.has_factory("twilio"));
/// ```
pub fn register(registry: &SenderRegistry) {
    registry.register("twilio", Box::new(TwilioFactory));
}
