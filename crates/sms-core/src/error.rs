//! Error types for the SMS dispatch service
//!
//! This module defines the uniform error type surfaced to callers, its
//! coarse classification, and the root-cause unwrapping helper used to
//! derive user-facing failure messages.

use thiserror::Error;

/// Result type alias for SMS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the SMS dispatch service
#[derive(Error, Debug)]
pub enum Error {
    /// No SMS provider has been configured
    #[error("unable to send SMS: no SMS provider configured")]
    NotConfigured,

    /// The provider configuration was rejected (parse or factory failure)
    #[error("invalid SMS provider configuration: {0}")]
    InvalidConfiguration(String),

    /// The provider accepted the configuration but the send itself failed
    #[error("unable to send SMS: {0}")]
    SendFailed(String),

    /// Settings store errors
    #[error("settings store error: {0}")]
    SettingsStore(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors (settings persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error, optionally chaining the underlying cause
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
        /// Underlying cause, if any (e.g. an HTTP client error)
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Coarse classification of an [`Error`], surfaced to API callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No active sender; the operation was never attempted
    NotConfigured,
    /// A factory or parser rejected the configuration
    InvalidConfiguration,
    /// The send call itself failed
    SendFailure,
    /// Anything internal (settings store, I/O, serialization)
    Internal,
}

impl Error {
    /// Create a settings store error
    pub fn settings_store(msg: impl Into<String>) -> Self {
        Self::SettingsStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider error without an underlying cause
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a provider error chaining the underlying cause
    pub fn provider_with_source(
        provider: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The coarse classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotConfigured => ErrorKind::NotConfigured,
            Error::InvalidConfiguration(_) | Error::Config(_) => ErrorKind::InvalidConfiguration,
            Error::SendFailed(_) | Error::Provider { .. } => ErrorKind::SendFailure,
            Error::SettingsStore(_) | Error::Io(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Walk an error's `source()` chain to its end and return the deepest
/// message.
///
/// This is the message shown to callers on send failures, so that a
/// "quota exceeded" buried under two layers of transport wrappers is
/// surfaced as "quota exceeded" rather than the outermost wrapper text.
pub fn root_cause_message(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
