use async_trait::async_trait;
use dashmap::DashMap;
use sticky_cart_core::Session;

use super::{SessionStorage, SessionStorageError, decode_session, encode_session};

/// An in-memory session storage implementation.
///
/// Values are kept JSON-encoded, exactly as they would be in Redis.
///
/// ### Note
///
/// Sessions are lost when the process exits; every shop must re-authenticate.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    data: DashMap<String, String>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn store(&self, session: &Session) -> Result<bool, SessionStorageError> {
        let value = encode_session(session)?;
        self.data.insert(session.id.clone(), value);
        Ok(true)
    }

    async fn load(&self, id: &str) -> Result<Option<Session>, SessionStorageError> {
        // Clone the value out so the shard lock is not held while decoding
        let value = self.data.get(id).map(|entry| entry.value().clone());
        value.as_deref().map(decode_session).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, SessionStorageError> {
        Ok(self.data.remove(id).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sticky_cart_core::ShopDomain;

    fn completed_session(shop: &str) -> Session {
        let shop = ShopDomain::parse(shop).unwrap();
        let mut session = Session::begin_offline(&shop, "482913573920184");
        session.complete("shpat_0123456789", "write_script_tags");
        session
    }

    #[tokio::test]
    async fn test_store_then_load_returns_equal_record() {
        let storage = MemorySessionStorage::new();
        let session = completed_session("store.myshopify.com");

        assert!(storage.store(&session).await.unwrap());
        let loaded = storage.load(&session.id).await.unwrap();

        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_absent() {
        let storage = MemorySessionStorage::new();
        assert_eq!(storage.load("offline_nope.myshopify.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_then_load_is_absent() {
        let storage = MemorySessionStorage::new();
        let session = completed_session("store.myshopify.com");
        storage.store(&session).await.unwrap();

        assert!(storage.delete(&session.id).await.unwrap());
        assert_eq!(storage.load(&session.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let storage = MemorySessionStorage::new();
        assert!(!storage.delete("offline_nope.myshopify.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let storage = MemorySessionStorage::new();
        let mut session = completed_session("store.myshopify.com");
        storage.store(&session).await.unwrap();

        session.complete("shpat_rotated", "write_script_tags,read_products");
        storage.store(&session).await.unwrap();

        let loaded = storage.load(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("shpat_rotated"));
        assert_eq!(storage.len(), 1);
    }
}
