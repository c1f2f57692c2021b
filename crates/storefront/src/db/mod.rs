//! Product persistence.
//!
//! # Database: `uniq_store`
//!
//! ## Tables
//!
//! - `products` - Catalog listings (title, description, price, image URL)
//!
//! Handlers never talk to `PostgreSQL` directly. They go through the
//! [`ProductStore`] trait so the in-memory store can stand in for tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p uniq-cli -- migrate
//! ```

pub mod memory;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use uniq_core::{NewProduct, Product, ProductId};

pub use memory::MemoryProductStore;
pub use products::PgProductStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage backend for products.
///
/// Writes are last-writer-wins per record. Removing or updating a missing id
/// succeeds without effect.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a product and return its new id.
    async fn insert(&self, product: NewProduct) -> Result<ProductId, RepositoryError>;

    /// Delete a product. Missing ids are ignored.
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;

    /// Overwrite every field of a product. Missing ids are ignored.
    async fn replace(&self, id: ProductId, product: NewProduct) -> Result<(), RepositoryError>;

    /// Fetch one product.
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Fetch every product in creation order.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
