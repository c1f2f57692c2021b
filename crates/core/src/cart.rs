//! Session cart and checkout line items.
//!
//! The cart is an ordered list of product snapshots. Adding the same product
//! twice appends a second entry; removing by id drops every matching entry.
//! It is never persisted beyond the browser session.

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId};

/// A product snapshot held in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image_url: String,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
        }
    }
}

/// A line item handed to the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub quantity: u32,
}

/// Ordered list of cart entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an entry. Duplicates are kept.
    pub fn add(&mut self, item: CartItem) {
        self.items.push(item);
    }

    /// Remove every entry with the given id.
    pub fn remove_by_id(&mut self, id: ProductId) {
        self.items.retain(|item| item.id != id);
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of entry prices, saturating at the decimal bounds.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Total formatted with two decimals.
    #[must_use]
    pub fn total_display(&self) -> String {
        self.total().display()
    }

    /// One checkout line per entry, each with quantity 1.
    #[must_use]
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.items
            .iter()
            .map(|item| CheckoutItem {
                id: item.id,
                title: item.title.clone(),
                price: item.price,
                quantity: 1,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, price: &str) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::parse(price).unwrap(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_add_then_contains() {
        let mut cart = Cart::new();
        cart.add(item(1, "10"));
        assert!(cart.contains(ProductId::new(1)));
        assert!(!cart.contains(ProductId::new(2)));
    }

    #[test]
    fn test_duplicate_add_appends() {
        let mut cart = Cart::new();
        cart.add(item(1, "10"));
        cart.add(item(1, "10"));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_display(), "20.00");
    }

    #[test]
    fn test_remove_drops_every_matching_entry() {
        let mut cart = Cart::new();
        cart.add(item(1, "10"));
        cart.add(item(2, "3"));
        cart.add(item(1, "10"));
        cart.remove_by_id(ProductId::new(1));
        assert!(!cart.contains(ProductId::new(1)));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(item(1, "10"));
        cart.remove_by_id(ProductId::new(9));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_total_formats_two_decimals() {
        let mut cart = Cart::new();
        cart.add(item(1, "10"));
        cart.add(item(2, "5.5"));
        assert_eq!(cart.total_display(), "15.50");
    }

    #[test]
    fn test_total_of_huge_prices_does_not_overflow() {
        let huge = "79228162514264337593543950335";
        let mut cart = Cart::new();
        cart.add(item(1, huge));
        cart.add(item(1, huge));
        assert_eq!(cart.total(), Price::parse(huge).unwrap());
        assert_eq!(cart.total_display(), Price::parse(huge).unwrap().display());
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        assert_eq!(Cart::new().total_display(), "0.00");
    }

    #[test]
    fn test_checkout_items_have_quantity_one_in_cart_order() {
        let mut cart = Cart::new();
        cart.add(item(2, "3"));
        cart.add(item(1, "10"));
        cart.add(item(2, "3"));
        let lines = cart.checkout_items();
        let ids: Vec<i64> = lines.iter().map(|l| l.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 1, 2]);
        assert!(lines.iter().all(|l| l.quantity == 1));
    }

    #[test]
    fn test_empty_cart_has_no_checkout_items() {
        assert!(Cart::new().checkout_items().is_empty());
    }
}
