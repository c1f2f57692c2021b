//! The product listing, the only persisted entity.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Price,
    /// Public URL of the uploaded image. May be empty.
    pub image_url: String,
}

/// Product fields without an identifier.
///
/// Used both for inserts and for full-overwrite updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
}

impl NewProduct {
    /// Attach an identifier, producing the stored representation.
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
        }
    }
}

impl From<Product> for NewProduct {
    fn from(product: Product) -> Self {
        Self {
            title: product.title,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
        }
    }
}
