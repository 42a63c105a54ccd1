//! Unit tests for `SessionRegistry`.
//!
//! The interesting property is stale-close safety: a close event from a
//! superseded channel must never evict the user's newer binding, because
//! close events carry only the channel id.

use reel_api::ws::SessionRegistry;

#[tokio::test]
async fn register_and_resolve_round_trip() {
    let registry = SessionRegistry::new();

    registry.register(1, "chan-a".into()).await;

    assert_eq!(registry.resolve(1).await.as_deref(), Some("chan-a"));
    assert_eq!(registry.resolve(2).await, None);
}

#[tokio::test]
async fn later_binding_supersedes_earlier_one() {
    let registry = SessionRegistry::new();

    registry.register(1, "chan-a".into()).await;
    registry.register(1, "chan-b".into()).await;

    // At most one channel per user: the newer binding wins.
    assert_eq!(registry.resolve(1).await.as_deref(), Some("chan-b"));
    assert_eq!(registry.binding_count().await, 1);
}

#[tokio::test]
async fn closing_superseded_channel_keeps_newer_binding() {
    let registry = SessionRegistry::new();

    // Channel A binds, then channel B supersedes it.
    registry.register(1, "chan-a".into()).await;
    registry.register(1, "chan-b".into()).await;

    // A's close event arrives late. It must not evict B's binding.
    registry.remove("chan-a").await;

    assert_eq!(registry.resolve(1).await.as_deref(), Some("chan-b"));
}

#[tokio::test]
async fn remove_deletes_only_the_matching_binding() {
    let registry = SessionRegistry::new();

    registry.register(1, "chan-a".into()).await;
    registry.register(2, "chan-b".into()).await;
    registry.register(3, "chan-c".into()).await;

    registry.remove("chan-b").await;

    assert_eq!(registry.resolve(1).await.as_deref(), Some("chan-a"));
    assert_eq!(registry.resolve(2).await, None);
    assert_eq!(registry.resolve(3).await.as_deref(), Some("chan-c"));
}

#[tokio::test]
async fn remove_unknown_channel_is_noop() {
    let registry = SessionRegistry::new();

    registry.register(1, "chan-a".into()).await;
    registry.remove("never-registered").await;

    assert_eq!(registry.resolve(1).await.as_deref(), Some("chan-a"));
    assert_eq!(registry.binding_count().await, 1);
}
