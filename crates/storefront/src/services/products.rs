//! Product operations.
//!
//! Every operation except [`ProductService::get_all`] requires an
//! authenticated caller and fails with [`ProductError::Unauthorized`]
//! otherwise. The check is authentication only; the `admin` role is enforced
//! by the page guards in front of these calls.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use uniq_core::{NewProduct, Product, ProductId};

use super::events::{ProductChange, ProductEvents};
use super::identity::Identity;
use crate::db::{ProductStore, RepositoryError};

/// Errors returned by product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// No authenticated caller.
    #[error("Unauthorized")]
    Unauthorized,

    /// The store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Product operations over a store, publishing a change after each mutation.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    events: ProductEvents,
}

fn authenticated(identity: Option<&Identity>) -> Result<&Identity, ProductError> {
    identity.ok_or(ProductError::Unauthorized)
}

impl ProductService {
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>, events: ProductEvents) -> Self {
        Self { store, events }
    }

    #[must_use]
    pub const fn events(&self) -> &ProductEvents {
        &self.events
    }

    /// Create a product and return its id.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without a caller, `Repository` if the insert fails.
    #[instrument(skip(self, identity, product), fields(title = %product.title))]
    pub async fn add(
        &self,
        identity: Option<&Identity>,
        product: NewProduct,
    ) -> Result<ProductId, ProductError> {
        let caller = authenticated(identity)?;
        let id = self.store.insert(product).await?;
        tracing::info!(product_id = %id, subject = %caller.subject, "Product added");
        self.events.publish(ProductChange::Added { id });
        Ok(id)
    }

    /// Delete a product. Deleting a missing id succeeds.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without a caller, `Repository` if the delete fails.
    #[instrument(skip(self, identity))]
    pub async fn remove(
        &self,
        identity: Option<&Identity>,
        id: ProductId,
    ) -> Result<(), ProductError> {
        let caller = authenticated(identity)?;
        self.store.delete(id).await?;
        tracing::info!(product_id = %id, subject = %caller.subject, "Product removed");
        self.events.publish(ProductChange::Removed { id });
        Ok(())
    }

    /// Overwrite every field of a product.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without a caller, `Repository` if the update fails.
    #[instrument(skip(self, identity, product))]
    pub async fn update(
        &self,
        identity: Option<&Identity>,
        id: ProductId,
        product: NewProduct,
    ) -> Result<(), ProductError> {
        let caller = authenticated(identity)?;
        self.store.replace(id, product).await?;
        tracing::info!(product_id = %id, subject = %caller.subject, "Product updated");
        self.events.publish(ProductChange::Updated { id });
        Ok(())
    }

    /// Fetch one product. Missing ids yield `None`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without a caller, `Repository` if the query fails.
    #[instrument(skip(self, identity))]
    pub async fn get(
        &self,
        identity: Option<&Identity>,
        id: ProductId,
    ) -> Result<Option<Product>, ProductError> {
        authenticated(identity)?;
        Ok(self.store.find(id).await?)
    }

    /// Fetch every product. Open to anonymous callers.
    ///
    /// # Errors
    ///
    /// `Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Product>, ProductError> {
        Ok(self.store.list().await?)
    }

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// `Repository` if the store does not answer.
    pub async fn ping(&self) -> Result<(), ProductError> {
        Ok(self.store.ping().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uniq_core::{Price, Role};

    use super::*;
    use crate::db::MemoryProductStore;

    fn service() -> ProductService {
        ProductService::new(Arc::new(MemoryProductStore::new()), ProductEvents::new())
    }

    fn caller() -> Identity {
        Identity {
            subject: "user_1".to_string(),
            role: Role::Member,
        }
    }

    fn product(title: &str, price: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: format!("{title} description"),
            price: Price::parse(price).unwrap(),
            image_url: format!("https://cdn.uniq.test/{title}.png"),
        }
    }

    #[tokio::test]
    async fn test_add_then_get_all_includes_exactly_one_new_record() {
        let svc = service();
        let who = caller();
        let id = svc.add(Some(&who), product("Lamp", "24.99")).await.unwrap();
        let all = svc.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].title, "Lamp");
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let svc = service();
        let who = caller();
        let id = svc.add(Some(&who), product("Lamp", "24.99")).await.unwrap();
        let replacement = product("Chair", "80");
        svc.update(Some(&who), id, replacement.clone()).await.unwrap();
        let stored = svc.get(Some(&who), id).await.unwrap().unwrap();
        assert_eq!(stored, replacement.with_id(id));
    }

    #[tokio::test]
    async fn test_remove_twice_is_fine() {
        let svc = service();
        let who = caller();
        let id = svc.add(Some(&who), product("Lamp", "24.99")).await.unwrap();
        svc.remove(Some(&who), id).await.unwrap();
        assert!(svc.get(Some(&who), id).await.unwrap().is_none());
        svc.remove(Some(&who), id).await.unwrap();
    }

    #[tokio::test]
    async fn test_anonymous_callers_are_unauthorized() {
        let svc = service();
        let id = ProductId::new(1);
        assert!(matches!(
            svc.add(None, product("Lamp", "1")).await,
            Err(ProductError::Unauthorized)
        ));
        assert!(matches!(
            svc.remove(None, id).await,
            Err(ProductError::Unauthorized)
        ));
        assert!(matches!(
            svc.update(None, id, product("Lamp", "1")).await,
            Err(ProductError::Unauthorized)
        ));
        assert!(matches!(
            svc.get(None, id).await,
            Err(ProductError::Unauthorized)
        ));
        assert!(svc.get_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_negative_price_is_stored_as_given() {
        let svc = service();
        let who = caller();
        let id = svc.add(Some(&who), product("Refund", "-5")).await.unwrap();
        let stored = svc.get(Some(&who), id).await.unwrap().unwrap();
        assert_eq!(stored.price.display(), "-5.00");
    }

    #[tokio::test]
    async fn test_mutations_publish_changes() {
        let svc = service();
        let mut rx = svc.events().subscribe();
        let who = caller();
        let id = svc.add(Some(&who), product("Lamp", "1")).await.unwrap();
        svc.update(Some(&who), id, product("Lamp", "2")).await.unwrap();
        svc.remove(Some(&who), id).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), ProductChange::Added { id });
        assert_eq!(rx.recv().await.unwrap(), ProductChange::Updated { id });
        assert_eq!(rx.recv().await.unwrap(), ProductChange::Removed { id });
    }

    #[tokio::test]
    async fn test_unauthorized_mutation_publishes_nothing() {
        let svc = service();
        let mut rx = svc.events().subscribe();
        let _ = svc.add(None, product("Lamp", "1")).await;
        assert!(rx.try_recv().is_err());
    }
}
