//! Seed the catalog from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - title: Desk Lamp
//!   description: Warm light for late nights
//!   price: "24.99"
//!   image_url: https://cdn.example.com/lamp.png
//! ```
//!
//! Products are written straight to the store, so no session is needed.
//! Prices are stored as given, without the admin form's validation.

use tracing::info;

use uniq_core::NewProduct;
use uniq_storefront::db::{self, PgProductStore, ProductStore};

use super::{CommandError, database_url};

/// Parse a seed file's contents.
fn parse(content: &str) -> Result<Vec<NewProduct>, CommandError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Insert products from `file_path`.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML list
/// * `clear_existing` - If true, delete every existing product first
///
/// # Errors
///
/// Returns an error if the environment is incomplete, the file cannot be
/// read or parsed, or a database operation fails.
pub async fn products(file_path: &str, clear_existing: bool) -> Result<(), CommandError> {
    // Read and parse before connecting to the database
    let content =
        tokio::fs::read_to_string(file_path)
            .await
            .map_err(|source| CommandError::Io {
                path: file_path.to_string(),
                source,
            })?;
    let products = parse(&content)?;
    info!(path = %file_path, count = products.len(), "Parsed seed file");

    let pool = db::create_pool(&database_url()?).await?;
    let store = PgProductStore::new(pool);
    info!("Connected to database");

    if clear_existing {
        let existing = store.list().await?;
        for product in &existing {
            store.delete(product.id).await?;
        }
        info!(removed = existing.len(), "Cleared existing products");
    }

    for product in products {
        let title = product.title.clone();
        let id = store.insert(product).await?;
        info!(product_id = %id, %title, "Inserted product");
    }

    info!("Seeding complete!");
    Ok(())
}
