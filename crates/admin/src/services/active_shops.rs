//! In-memory table of shops that completed the OAuth handshake.
//!
//! Entries are added by the auth callback and removed by the
//! `app/uninstalled` webhook. The table lives only as long as the process;
//! after a restart every shop goes through `/auth` once more.

use std::collections::HashMap;
use std::sync::Arc;

use sticky_cart_core::ShopDomain;
use tokio::sync::RwLock;

/// Shared shop → granted scope table.
#[derive(Debug, Clone, Default)]
pub struct ActiveShops {
    inner: Arc<RwLock<HashMap<ShopDomain, String>>>,
}

impl ActiveShops {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a shop as active with the scope it granted.
    pub async fn insert(&self, shop: ShopDomain, scope: impl Into<String>) {
        self.inner.write().await.insert(shop, scope.into());
    }

    /// Forget a shop, returning the scope it had granted if it was active.
    pub async fn remove(&self, shop: &ShopDomain) -> Option<String> {
        self.inner.write().await.remove(shop)
    }

    pub async fn contains(&self, shop: &ShopDomain) -> bool {
        self.inner.read().await.contains_key(shop)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shop(name: &str) -> ShopDomain {
        ShopDomain::parse(&format!("{name}.myshopify.com")).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let shops = ActiveShops::new();
        assert!(!shops.contains(&shop("alpha")).await);

        shops.insert(shop("alpha"), "write_script_tags").await;
        assert!(shops.contains(&shop("alpha")).await);

        assert_eq!(
            shops.remove(&shop("alpha")).await.as_deref(),
            Some("write_script_tags")
        );
        assert_eq!(shops.remove(&shop("alpha")).await, None);
        assert_eq!(shops.len().await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_table() {
        let shops = ActiveShops::new();
        let handle = shops.clone();

        handle.insert(shop("beta"), "read_products").await;
        assert!(shops.contains(&shop("beta")).await);
    }
}
