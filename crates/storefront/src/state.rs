//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::ProductStore;
use crate::services::{
    IdentityError, IdentityVerifier, ImageStorage, PaymentProcessor, ProductEvents, ProductService,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the product store and external service clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: ProductService,
    identity: IdentityVerifier,
    payments: Arc<dyn PaymentProcessor>,
    images: Arc<dyn ImageStorage>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Product storage backend
    /// * `payments` - Hosted checkout client
    /// * `images` - Image upload client
    ///
    /// # Errors
    ///
    /// Returns an error if the identity verification key is invalid.
    pub fn new(
        config: StorefrontConfig,
        store: Arc<dyn ProductStore>,
        payments: Arc<dyn PaymentProcessor>,
        images: Arc<dyn ImageStorage>,
    ) -> Result<Self, IdentityError> {
        let identity = IdentityVerifier::from_config(&config.identity)?;
        let products = ProductService::new(store, ProductEvents::new());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                identity,
                payments,
                images,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product service.
    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.products
    }

    /// Get a reference to the session token verifier.
    #[must_use]
    pub fn identity(&self) -> &IdentityVerifier {
        &self.inner.identity
    }

    /// Get a reference to the payment processor.
    #[must_use]
    pub fn payments(&self) -> &dyn PaymentProcessor {
        self.inner.payments.as_ref()
    }

    /// Get a reference to the image storage client.
    #[must_use]
    pub fn images(&self) -> &dyn ImageStorage {
        self.inner.images.as_ref()
    }
}
