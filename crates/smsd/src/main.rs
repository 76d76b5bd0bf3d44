// # smsd - SMS Dispatch Daemon
//
// Thin integration layer only:
// 1. Reading configuration from environment variables
// 2. Initializing the runtime and tracing
// 3. Registering provider factories
// 4. Seeding the settings store and starting the dispatch service
//
// All dispatch logic lives in sms-core; all provider protocol logic lives
// in the provider crates.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Provider (seeds the "sms" settings record when set)
// - `SMS_PROVIDER_TYPE`: Provider type (twilio)
// - `SMS_TWILIO_ACCOUNT_SID`: Twilio account SID
// - `SMS_TWILIO_ACCOUNT_TOKEN`: Twilio auth token
// - `SMS_TWILIO_NUMBER_FROM`: Sender number in E.164 form
//
// ### Settings Store
// - `SMS_SETTINGS_STORE_TYPE`: Type of settings store (file, memory)
// - `SMS_SETTINGS_STORE_PATH`: Path to settings file (for file store)
//
// ### Logging
// - `SMS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export SMS_PROVIDER_TYPE=twilio
// export SMS_TWILIO_ACCOUNT_SID=ACxxxxxxxx
// export SMS_TWILIO_ACCOUNT_TOKEN=your_token
// export SMS_TWILIO_NUMBER_FROM=+15550001111
// export SMS_SETTINGS_STORE_TYPE=file
// export SMS_SETTINGS_STORE_PATH=/var/lib/smsd/settings.json
//
// smsd
// ```

use anyhow::Result;
use sms_core::traits::{AdminSettings, SettingsScope, SettingsStore};
use sms_core::{SMS_SETTINGS_KEY, SenderRegistry, SmsService};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes following systemd conventions
#[derive(Debug, Clone, Copy)]
enum SmsdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SmsdExitCode> for ExitCode {
    fn from(code: SmsdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration, loaded from environment variables
struct Config {
    provider_type: Option<String>,
    twilio_account_sid: Option<String>,
    twilio_account_token: Option<String>,
    twilio_number_from: Option<String>,
    settings_store_type: String,
    settings_store_path: Option<String>,
    log_level: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            provider_type: env::var("SMS_PROVIDER_TYPE").ok(),
            twilio_account_sid: env::var("SMS_TWILIO_ACCOUNT_SID").ok(),
            twilio_account_token: env::var("SMS_TWILIO_ACCOUNT_TOKEN").ok(),
            twilio_number_from: env::var("SMS_TWILIO_NUMBER_FROM").ok(),
            settings_store_type: env::var("SMS_SETTINGS_STORE_TYPE")
                .unwrap_or_else(|_| "memory".to_string()),
            settings_store_path: env::var("SMS_SETTINGS_STORE_PATH").ok(),
            log_level: env::var("SMS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(ref provider_type) = self.provider_type {
            match provider_type.as_str() {
                "twilio" => {
                    for (name, value) in [
                        ("SMS_TWILIO_ACCOUNT_SID", &self.twilio_account_sid),
                        ("SMS_TWILIO_ACCOUNT_TOKEN", &self.twilio_account_token),
                        ("SMS_TWILIO_NUMBER_FROM", &self.twilio_number_from),
                    ] {
                        if value.as_ref().is_none_or(|v| v.is_empty()) {
                            anyhow::bail!("{} is required when SMS_PROVIDER_TYPE=twilio", name);
                        }
                    }

                    // Catch obvious placeholder tokens (common mistake)
                    let token = self.twilio_account_token.as_deref().unwrap_or_default();
                    let token_lower = token.to_lowercase();
                    if token_lower.contains("your_token") || token_lower.contains("example") {
                        anyhow::bail!(
                            "SMS_TWILIO_ACCOUNT_TOKEN appears to be a placeholder. \
                            Use an actual Twilio auth token."
                        );
                    }
                }
                _ => anyhow::bail!(
                    "SMS_PROVIDER_TYPE '{}' is not supported. Supported providers: twilio",
                    provider_type
                ),
            }
        }

        match self.settings_store_type.as_str() {
            "memory" => {}
            "file" => {
                if self
                    .settings_store_path
                    .as_ref()
                    .is_none_or(|p| p.is_empty())
                {
                    anyhow::bail!(
                        "SMS_SETTINGS_STORE_PATH is required when SMS_SETTINGS_STORE_TYPE=file"
                    );
                }
            }
            other => anyhow::bail!(
                "SMS_SETTINGS_STORE_TYPE '{}' is not supported. Supported types: file, memory",
                other
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => anyhow::bail!(
                "SMS_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        }
    }

    /// Provider configuration JSON to seed into the settings store, if
    /// provider credentials were given
    fn provider_settings_json(&self) -> Option<serde_json::Value> {
        match self.provider_type.as_deref()? {
            "twilio" => Some(serde_json::json!({
                "type": "twilio",
                "account_sid": self.twilio_account_sid.clone()?,
                "account_token": self.twilio_account_token.clone()?,
                "number_from": self.twilio_number_from.clone()?,
            })),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return SmsdExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SmsdExitCode::ConfigError.into();
    }

    info!("Starting smsd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SmsdExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            SmsdExitCode::RuntimeError
        } else {
            SmsdExitCode::CleanShutdown
        }
    })
    .into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let registry = Arc::new(SenderRegistry::new());

    #[cfg(feature = "twilio")]
    {
        info!("Registering Twilio provider");
        sms_provider_twilio::register(&registry);
    }

    let settings: Arc<dyn SettingsStore> = match config.settings_store_type.as_str() {
        "file" => {
            let path = config
                .settings_store_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("SMS_SETTINGS_STORE_PATH is required"))?;
            info!("Using file settings store at {}", path);
            Arc::new(sms_core::FileSettingsStore::new(path).await?)
        }
        _ => {
            info!("Using in-memory settings store");
            Arc::new(sms_core::MemorySettingsStore::new())
        }
    };

    // Seed the provider configuration from the environment, if given
    if let Some(json_value) = config.provider_settings_json() {
        settings
            .save(
                &SettingsScope::System,
                AdminSettings::new(SMS_SETTINGS_KEY, json_value),
            )
            .await?;
        info!("Seeded SMS provider settings from environment");
    }

    let service = SmsService::new(settings, registry);
    service.start().await;
    info!("SMS dispatch service started");

    let signal_name = wait_for_shutdown().await?;
    info!("Received {}; shutting down", signal_name);

    service.stop().await;
    info!("SMS dispatch service stopped");

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown (SIGINT only) on non-Unix platforms
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
