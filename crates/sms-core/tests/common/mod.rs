//! Test doubles and common utilities for dispatch contract tests
//!
//! Provides counting senders and factories that verify the service's
//! lifecycle guarantees without talking to any real gateway.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use serde_json::json;
use sms_core::config::{SmsProviderConfig, TestSmsRequest};
use sms_core::traits::{AdminSettings, SmsSender, SmsSenderFactory};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Innermost error used to exercise root-cause unwrapping
#[derive(Debug, thiserror::Error)]
#[error("quota exceeded")]
pub struct QuotaExceeded;

/// Middle wrapper in the nested test error chain
#[derive(Debug, thiserror::Error)]
#[error("gateway request rejected")]
pub struct RequestRejected(#[source] pub QuotaExceeded);

/// How a mock sender behaves on `send_sms`
#[derive(Debug, Clone)]
pub enum FailureMode {
    /// Every send succeeds
    Never,
    /// Sends to this destination fail with a flat provider error
    ForNumber(String),
    /// Every send fails with a nested wrapper → wrapper → "quota exceeded"
    /// error chain
    AlwaysChained,
}

/// Shared observation handles for one mock sender instance
#[derive(Debug, Clone, Default)]
pub struct SenderStats {
    send_calls: Arc<AtomicUsize>,
    destroy_calls: Arc<AtomicUsize>,
    delivered_to: Arc<Mutex<Vec<String>>>,
}

impl SenderStats {
    /// Number of send attempts (including failed ones)
    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    /// Number of destroy() calls
    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    /// Destinations successfully delivered to, in order
    pub fn delivered_to(&self) -> Vec<String> {
        self.delivered_to.lock().unwrap().clone()
    }
}

/// A mock SmsSender that tracks calls through shared stats
pub struct MockSmsSender {
    name: &'static str,
    stats: SenderStats,
    failure: FailureMode,
}

#[async_trait::async_trait]
impl SmsSender for MockSmsSender {
    async fn send_sms(&self, number_to: &str, _message: &str) -> Result<i32, sms_core::Error> {
        self.stats.send_calls.fetch_add(1, Ordering::SeqCst);

        match &self.failure {
            FailureMode::Never => {}
            FailureMode::ForNumber(number) if number == number_to => {
                return Err(sms_core::Error::provider(
                    self.name,
                    format!("delivery to {} refused", number_to),
                ));
            }
            FailureMode::ForNumber(_) => {}
            FailureMode::AlwaysChained => {
                return Err(sms_core::Error::provider_with_source(
                    self.name,
                    "send request failed",
                    RequestRejected(QuotaExceeded),
                ));
            }
        }

        self.stats
            .delivered_to
            .lock()
            .unwrap()
            .push(number_to.to_string());
        Ok(1)
    }

    fn destroy(&self) {
        self.stats.destroy_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

/// A mock factory that hands out counting senders
///
/// Every created sender gets its own [`SenderStats`], retained by the
/// factory so tests can assert per-instance send/destroy counts across
/// configuration swaps.
pub struct MockSenderFactory {
    name: &'static str,
    failure: FailureMode,
    reject_creation: AtomicBool,
    created: Mutex<Vec<SenderStats>>,
}

impl MockSenderFactory {
    pub fn new(name: &'static str) -> Arc<Self> {
        Self::with_failure(name, FailureMode::Never)
    }

    pub fn with_failure(name: &'static str, failure: FailureMode) -> Arc<Self> {
        Arc::new(Self {
            name,
            failure,
            reject_creation: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
        })
    }

    /// Make subsequent create() calls fail (simulates invalid config or an
    /// unreachable endpoint)
    pub fn set_reject_creation(&self, reject: bool) {
        self.reject_creation.store(reject, Ordering::SeqCst);
    }

    /// Number of senders this factory has created
    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Stats of the index-th created sender (creation order)
    pub fn sender_stats(&self, index: usize) -> SenderStats {
        self.created.lock().unwrap()[index].clone()
    }

    fn create_sender(&self) -> Result<Box<dyn SmsSender>, sms_core::Error> {
        if self.reject_creation.load(Ordering::SeqCst) {
            return Err(sms_core::Error::provider(
                self.name,
                "endpoint unreachable",
            ));
        }

        let stats = SenderStats::default();
        self.created.lock().unwrap().push(stats.clone());

        Ok(Box::new(MockSmsSender {
            name: self.name,
            stats,
            failure: self.failure.clone(),
        }))
    }
}

/// Registry adapter so one Arc'd factory can be shared between the
/// registry and the test's assertions
pub struct SharedFactory(pub Arc<MockSenderFactory>);

impl SmsSenderFactory for SharedFactory {
    fn create(
        &self,
        _config: &SmsProviderConfig,
    ) -> Result<Box<dyn SmsSender>, sms_core::Error> {
        self.0.create_sender()
    }
}

/// Settings record selecting the given mock factory
pub fn mock_settings(factory: &str) -> AdminSettings {
    AdminSettings::new(
        "sms",
        json!({
            "type": "custom",
            "factory": factory,
            "config": {},
        }),
    )
}

/// Provider configuration selecting the given mock factory
pub fn mock_config(factory: &str) -> SmsProviderConfig {
    SmsProviderConfig::Custom {
        factory: factory.to_string(),
        config: json!({}),
    }
}

/// Test-send request routed at the given mock factory
pub fn mock_test_request(factory: &str, number_to: &str, message: &str) -> TestSmsRequest {
    TestSmsRequest {
        provider_configuration: mock_config(factory),
        number_to: number_to.to_string(),
        message: message.to_string(),
    }
}
