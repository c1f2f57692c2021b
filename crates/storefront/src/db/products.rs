//! `PostgreSQL` product repository.
//!
//! Uses runtime queries (`sqlx::query_as`) so the crate builds without an
//! offline query cache.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use uniq_core::{NewProduct, Price, Product, ProductId};

use super::{ProductStore, RepositoryError};

/// Product repository backed by the `products` table.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for product queries.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    title: String,
    description: String,
    price: Price,
    image_url: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
        }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    #[instrument(skip(self, product), fields(title = %product.title))]
    async fn insert(&self, product: NewProduct) -> Result<ProductId, RepositoryError> {
        let (id,): (ProductId,) = sqlx::query_as(
            r"
            INSERT INTO products (title, description, price, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, product))]
    async fn replace(&self, id: ProductId, product: NewProduct) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE products
            SET title = $2, description = $3, price = $4, image_url = $5
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, description, price, image_url
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, description, price, image_url
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
