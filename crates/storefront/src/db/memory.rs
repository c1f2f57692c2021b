//! In-memory product store.
//!
//! Used by tests and local demos. Ids are assigned from a counter starting
//! at 1 and never reused, matching a `BIGSERIAL` column.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use uniq_core::{NewProduct, Product, ProductId};

use super::{ProductStore, RepositoryError};

#[derive(Default)]
struct Inner {
    next_id: i64,
    products: BTreeMap<ProductId, Product>,
}

/// Product store held in process memory.
#[derive(Default)]
pub struct MemoryProductStore {
    inner: RwLock<Inner>,
}

impl MemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with products, in order.
    pub async fn with_products(products: impl IntoIterator<Item = NewProduct>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write().await;
            for product in products {
                inner.next_id += 1;
                let id = ProductId::new(inner.next_id);
                inner.products.insert(id, product.with_id(id));
            }
        }
        store
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: NewProduct) -> Result<ProductId, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = ProductId::new(inner.next_id);
        inner.products.insert(id, product.with_id(id));
        Ok(id)
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.inner.write().await.products.remove(&id);
        Ok(())
    }

    async fn replace(&self, id: ProductId, product: NewProduct) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.products.get_mut(&id) {
            *existing = product.with_id(id);
        }
        Ok(())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.inner.read().await.products.values().cloned().collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uniq_core::Price;

    use super::*;

    fn lamp() -> NewProduct {
        NewProduct {
            title: "Lamp".to_string(),
            description: "Desk lamp".to_string(),
            price: Price::parse("24.99").unwrap(),
            image_url: "https://cdn.uniq.test/lamp.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryProductStore::new();
        let first = store.insert(lamp()).await.unwrap();
        store.delete(first).await.unwrap();
        let second = store.insert(lamp()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_replace_missing_id_is_noop() {
        let store = MemoryProductStore::new();
        store.replace(ProductId::new(99), lamp()).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_in_creation_order() {
        let store = MemoryProductStore::with_products([lamp(), lamp(), lamp()]).await;
        let ids: Vec<i64> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
