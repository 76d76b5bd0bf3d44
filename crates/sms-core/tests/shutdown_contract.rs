//! Dispatch Contract Test: Shutdown & Concurrency
//!
//! Constraints verified:
//! - stop() destroys the active sender exactly once, even after multiple
//!   refreshes, and a second stop() is a no-op
//! - Concurrent sends and refreshes never observe a torn sender slot:
//!   once configured, every send lands on exactly one live sender

mod common;

use common::*;
use sms_core::traits::{SettingsScope, SettingsStore};
use sms_core::{MemorySettingsStore, SenderRegistry, SmsService};
use std::sync::Arc;

async fn configured_service(
    factory: &Arc<MockSenderFactory>,
) -> SmsService {
    let store = MemorySettingsStore::new();
    store
        .save(&SettingsScope::System, mock_settings("mock"))
        .await
        .unwrap();

    let registry = SenderRegistry::new();
    registry.register("mock", Box::new(SharedFactory(Arc::clone(factory))));

    let service = SmsService::new(Arc::new(store), Arc::new(registry));
    service.start().await;
    service
}

#[tokio::test]
async fn stop_destroys_the_active_sender_exactly_once() {
    let factory = MockSenderFactory::new("mock");
    let service = configured_service(&factory).await;

    // A few more refreshes before shutdown
    service.refresh_configuration().await;
    service.refresh_configuration().await;
    assert_eq!(factory.created_count(), 3);

    service.stop().await;

    assert_eq!(factory.sender_stats(0).destroy_calls(), 1);
    assert_eq!(factory.sender_stats(1).destroy_calls(), 1);
    assert_eq!(
        factory.sender_stats(2).destroy_calls(),
        1,
        "shutdown destroys the last active sender exactly once"
    );

    // Double stop is a no-op
    service.stop().await;
    assert_eq!(factory.sender_stats(2).destroy_calls(), 1);
}

#[tokio::test]
async fn stop_without_a_sender_is_a_noop() {
    let service = SmsService::new(
        Arc::new(MemorySettingsStore::new()),
        Arc::new(SenderRegistry::new()),
    );

    service.stop().await;
}

#[tokio::test]
async fn send_after_stop_fails_not_configured() {
    let factory = MockSenderFactory::new("mock");
    let service = configured_service(&factory).await;

    service.stop().await;

    let err = service.send("+15551230001", "hi").await.unwrap_err();
    assert!(matches!(err, sms_core::Error::NotConfigured));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_and_refreshes_never_observe_a_torn_slot() {
    let factory = MockSenderFactory::new("mock");
    let service = Arc::new(configured_service(&factory).await);

    const SENDERS: usize = 8;
    const SENDS_PER_TASK: usize = 50;
    const REFRESHES: usize = 25;

    let mut tasks = Vec::new();

    for task in 0..SENDERS {
        let service = Arc::clone(&service);
        tasks.push(tokio::spawn(async move {
            for i in 0..SENDS_PER_TASK {
                let number = format!("+1555123{:02}{:02}", task, i % 100);
                // Once configured, the service must never report
                // NotConfigured and never fail a mock send
                service.send(&number, "hi").await.expect("send succeeds");
            }
        }));
    }

    {
        let service = Arc::clone(&service);
        tasks.push(tokio::spawn(async move {
            for _ in 0..REFRESHES {
                service.refresh_configuration().await;
                tokio::task::yield_now().await;
            }
        }));
    }

    for task in tasks {
        task.await.expect("task panicked");
    }

    // Every send landed on exactly one of the created senders
    let total_sends: usize = (0..factory.created_count())
        .map(|i| factory.sender_stats(i).send_calls())
        .sum();
    assert_eq!(total_sends, SENDERS * SENDS_PER_TASK);

    // Exactly one sender remains undestroyed (the active one)
    let destroyed: usize = (0..factory.created_count())
        .map(|i| factory.sender_stats(i).destroy_calls())
        .sum();
    assert_eq!(destroyed, factory.created_count() - 1);

    service.stop().await;
    let destroyed_after_stop: usize = (0..factory.created_count())
        .map(|i| factory.sender_stats(i).destroy_calls())
        .sum();
    assert_eq!(destroyed_after_stop, factory.created_count());
}
