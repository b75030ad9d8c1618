//! Session cache tests against a live Redis server.
//!
//! These tests require a Redis server at `REDIS_URL`
//! (default `redis://127.0.0.1:6379`).
//!
//! Run with: cargo test -p sticky-cart-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use sticky_cart_admin::storage::{RedisSessionStorage, SessionStorage};
use sticky_cart_core::{Session, ShopDomain};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

async fn storage() -> RedisSessionStorage {
    RedisSessionStorage::connect(&redis_url())
        .await
        .expect("Failed to connect to Redis")
}

/// A session on a shop unique to the calling test, so runs don't collide.
fn completed_session(test: &str) -> Session {
    let shop = ShopDomain::parse(&format!("it-{test}-{}.myshopify.com", std::process::id())).unwrap();
    let mut session = Session::begin_offline(&shop, "123456789012345");
    session.complete("shpat_integration", "write_script_tags");
    session
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_store_then_load_returns_equal_session() {
    let storage = storage().await;
    let session = completed_session("roundtrip");

    assert!(storage.store(&session).await.unwrap());
    let loaded = storage.load(&session.id).await.unwrap();
    assert_eq!(loaded, Some(session.clone()));

    storage.delete(&session.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_load_never_stored_is_absent() {
    let storage = storage().await;

    let loaded = storage
        .load("offline_never-stored.myshopify.com")
        .await
        .unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_delete_then_load_is_absent() {
    let storage = storage().await;
    let session = completed_session("delete");
    storage.store(&session).await.unwrap();

    assert!(storage.delete(&session.id).await.unwrap());
    assert!(storage.load(&session.id).await.unwrap().is_none());
    assert!(!storage.delete(&session.id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_store_overwrites_pending_session() {
    let storage = storage().await;
    let shop = ShopDomain::parse(&format!("it-overwrite-{}.myshopify.com", std::process::id())).unwrap();
    let pending = Session::begin_offline(&shop, "111111111111111");
    storage.store(&pending).await.unwrap();

    let mut completed = pending.clone();
    completed.complete("shpat_integration", "write_script_tags");
    storage.store(&completed).await.unwrap();

    let loaded = storage.load(&pending.id).await.unwrap().unwrap();
    assert_eq!(loaded.access_token.as_deref(), Some("shpat_integration"));
    assert_eq!(loaded.state, "111111111111111");

    storage.delete(&pending.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_unreachable_server_is_a_backend_error() {
    let result = RedisSessionStorage::connect("redis://127.0.0.1:1").await;
    assert!(result.is_err());
}
