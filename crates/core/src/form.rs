//! Admin product form state.
//!
//! The add and edit forms post their raw field values on every input event.
//! The server answers with a re-rendered submit button whose enabled state
//! is [`ProductForm::is_valid`], and re-checks the same rule on submit.

use serde::{Deserialize, Serialize};

use crate::types::{NewProduct, Price, Product};

/// Raw values of the product form, exactly as posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

impl ProductForm {
    /// Pre-fill the form from a stored product (edit page).
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.amount().normalize().to_string(),
            image_url: product.image_url.clone(),
        }
    }

    /// The parsed price, if the field holds a number.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        Price::parse(&self.price).ok()
    }

    /// Whether the form may be submitted.
    ///
    /// Title and description must contain non-whitespace text, the price must
    /// parse and be greater than zero, and an image URL must be present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && self.price().is_some_and(|p| p.is_positive())
            && !self.image_url.is_empty()
    }

    /// Convert into store input. Returns `None` for an invalid form.
    ///
    /// Text fields are stored as entered, without trimming.
    #[must_use]
    pub fn to_new_product(&self) -> Option<NewProduct> {
        if !self.is_valid() {
            return None;
        }
        Some(NewProduct {
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price()?,
            image_url: self.image_url.clone(),
        })
    }
}

/// Which admin form is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    /// Name used in query strings, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
        }
    }

    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Create => "Add New Product",
            Self::Edit => "Edit Product",
        }
    }

    #[must_use]
    pub const fn subheading(self) -> &'static str {
        match self {
            Self::Create => "Fill in the details to add a new product",
            Self::Edit => "Update the product details",
        }
    }

    /// Submit button label while idle.
    #[must_use]
    pub const fn submit_label(self) -> &'static str {
        match self {
            Self::Create => "Add Product",
            Self::Edit => "Update Product",
        }
    }

    /// Submit button label while the request is in flight.
    #[must_use]
    pub const fn pending_label(self) -> &'static str {
        match self {
            Self::Create => "Adding Product...",
            Self::Edit => "Updating Product...",
        }
    }

    #[must_use]
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Create => "Product added successfully!",
            Self::Edit => "Product updated successfully!",
        }
    }

    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Create => "Failed to add product. Please try again.",
            Self::Edit => "Failed to update product. Please try again.",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn valid_form() -> ProductForm {
        ProductForm {
            title: "Lamp".to_owned(),
            description: "A desk lamp".to_owned(),
            price: "24.99".to_owned(),
            image_url: "https://cdn.example.com/lamp.png".to_owned(),
        }
    }

    #[test]
    fn test_complete_form_is_valid() {
        assert!(valid_form().is_valid());
    }

    #[test]
    fn test_empty_form_is_invalid() {
        assert!(!ProductForm::default().is_valid());
    }

    #[test]
    fn test_whitespace_title_is_invalid() {
        let form = ProductForm {
            title: "   ".to_owned(),
            ..valid_form()
        };
        assert!(!form.is_valid());
    }

    #[test]
    fn test_whitespace_description_is_invalid() {
        let form = ProductForm {
            description: "\n\t".to_owned(),
            ..valid_form()
        };
        assert!(!form.is_valid());
    }

    #[test]
    fn test_non_positive_price_is_invalid() {
        for price in ["0", "0.00", "-5", "", "abc"] {
            let form = ProductForm {
                price: price.to_owned(),
                ..valid_form()
            };
            assert!(!form.is_valid(), "price {price:?} should be invalid");
        }
    }

    #[test]
    fn test_missing_image_is_invalid() {
        let form = ProductForm {
            image_url: String::new(),
            ..valid_form()
        };
        assert!(!form.is_valid());
    }

    #[test]
    fn test_to_new_product_keeps_text_as_entered() {
        let form = ProductForm {
            title: " Lamp ".to_owned(),
            ..valid_form()
        };
        let product = form.to_new_product().unwrap();
        assert_eq!(product.title, " Lamp ");
        assert_eq!(product.price.display(), "24.99");
    }

    #[test]
    fn test_to_new_product_refuses_invalid_form() {
        assert!(ProductForm::default().to_new_product().is_none());
    }

    #[test]
    fn test_from_product_round_trips_into_valid_form() {
        let product = valid_form()
            .to_new_product()
            .unwrap()
            .with_id(ProductId::new(3));
        let form = ProductForm::from_product(&product);
        assert_eq!(form, valid_form());
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(FormMode::Create.pending_label(), "Adding Product...");
        assert_eq!(FormMode::Edit.pending_label(), "Updating Product...");
        assert_eq!(
            FormMode::Edit.failure_message(),
            "Failed to update product. Please try again."
        );
    }

    #[test]
    fn test_mode_query_name_matches_serde() {
        for mode in [FormMode::Create, FormMode::Edit] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }
}
