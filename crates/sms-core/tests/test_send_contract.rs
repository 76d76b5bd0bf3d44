//! Dispatch Contract Test: Test Sends
//!
//! Constraints verified:
//! - A test send builds an ephemeral sender and never mutates the active
//!   one
//! - The ephemeral sender is destroyed on every exit path
//! - A rejected test configuration is classified as invalid
//!   configuration, distinct from a send failure

mod common;

use common::*;
use sms_core::traits::{SettingsScope, SettingsStore};
use sms_core::{ErrorKind, MemorySettingsStore, SenderRegistry, SmsService};
use std::sync::Arc;

struct Fixture {
    service: SmsService,
    store: MemorySettingsStore,
}

fn fixture(factories: &[(&str, Arc<MockSenderFactory>)]) -> Fixture {
    let store = MemorySettingsStore::new();
    let registry = SenderRegistry::new();
    for (name, factory) in factories {
        registry.register(*name, Box::new(SharedFactory(Arc::clone(factory))));
    }
    let service = SmsService::new(Arc::new(store.clone()), Arc::new(registry));
    Fixture { service, store }
}

#[tokio::test]
async fn test_send_does_not_touch_the_active_sender() {
    let active = MockSenderFactory::new("active");
    let other = MockSenderFactory::new("other");
    let fx = fixture(&[
        ("active", Arc::clone(&active)),
        ("other", Arc::clone(&other)),
    ]);

    // Provider A is the configured one
    fx.store
        .save(&SettingsScope::System, mock_settings("active"))
        .await
        .unwrap();
    fx.service.refresh_configuration().await;

    // Test provider B's configuration
    fx.service
        .send_test(&mock_test_request("other", "+15551230001", "test"))
        .await
        .unwrap();

    assert_eq!(other.created_count(), 1);
    assert_eq!(other.sender_stats(0).send_calls(), 1);

    // Regular sends still route through A
    fx.service.send("+15551230002", "hi").await.unwrap();
    assert_eq!(active.sender_stats(0).send_calls(), 1);
    assert_eq!(
        active.sender_stats(0).destroy_calls(),
        0,
        "active sender must survive the test send"
    );
}

#[tokio::test]
async fn test_send_destroys_the_ephemeral_sender_on_success() {
    let factory = MockSenderFactory::new("mock");
    let fx = fixture(&[("mock", Arc::clone(&factory))]);

    let code = fx
        .service
        .send_test(&mock_test_request("mock", "+15551230003", "test"))
        .await
        .unwrap();

    assert_eq!(code, 1);
    assert_eq!(factory.sender_stats(0).destroy_calls(), 1);
}

#[tokio::test]
async fn test_send_destroys_the_ephemeral_sender_on_send_failure() {
    let factory = MockSenderFactory::with_failure("mock", FailureMode::AlwaysChained);
    let fx = fixture(&[("mock", Arc::clone(&factory))]);

    let err = fx
        .service
        .send_test(&mock_test_request("mock", "+15551230004", "test"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SendFailure);
    assert_eq!(
        factory.sender_stats(0).destroy_calls(),
        1,
        "ephemeral sender released even when the send fails"
    );
}

#[tokio::test]
async fn rejected_test_configuration_is_invalid_configuration() {
    let factory = MockSenderFactory::new("mock");
    factory.set_reject_creation(true);
    let fx = fixture(&[("mock", Arc::clone(&factory))]);

    let err = fx
        .service
        .send_test(&mock_test_request("mock", "+15551230005", "test"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    assert_eq!(factory.created_count(), 0);
}

#[tokio::test]
async fn unknown_test_provider_type_is_invalid_configuration() {
    let fx = fixture(&[]);

    let err = fx
        .service
        .send_test(&mock_test_request("unregistered", "+15551230006", "test"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}

#[tokio::test]
async fn test_send_works_without_an_active_sender() {
    let factory = MockSenderFactory::new("mock");
    let fx = fixture(&[("mock", Arc::clone(&factory))]);

    // Nothing configured; a test send must still go through
    fx.service
        .send_test(&mock_test_request("mock", "+15551230007", "test"))
        .await
        .unwrap();

    let err = fx.service.send("+15551230008", "hi").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotConfigured);
}
