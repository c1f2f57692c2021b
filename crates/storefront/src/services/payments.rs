//! Hosted checkout via the Stripe Checkout Sessions API.
//!
//! The cart is sent as ad-hoc line items (`price_data`), so products do not
//! need to exist in the payment processor beforehand. The processor answers
//! with a hosted checkout URL the browser is redirected to.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use uniq_core::CheckoutItem;

use crate::config::PaymentsConfig;

/// Errors that can occur when creating a checkout.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A line item price cannot be expressed in minor units.
    #[error("Invalid amount for {0}")]
    InvalidAmount(String),
}

/// Something that turns checkout items into a hosted checkout URL.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Start a checkout. `Ok(None)` means the processor returned no URL.
    async fn pay(&self, items: &[CheckoutItem]) -> Result<Option<String>, PaymentError>;
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    id: String,
    url: Option<String>,
}

/// Stripe Checkout client.
#[derive(Clone)]
pub struct StripeCheckout {
    client: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
    currency: String,
    success_url: String,
    cancel_url: String,
}

impl StripeCheckout {
    /// Create a new client.
    ///
    /// `base_url` is the storefront's public URL; the customer returns there
    /// after paying or cancelling.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentsConfig, base_url: &str) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
            success_url: format!("{base_url}/?checkout=success"),
            cancel_url: format!("{base_url}/?checkout=cancelled"),
        })
    }

    /// Form body for `POST /v1/checkout/sessions`.
    fn checkout_form(&self, items: &[CheckoutItem]) -> Result<Vec<(String, String)>, PaymentError> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];

        for (i, item) in items.iter().enumerate() {
            let unit_amount = item
                .price
                .to_minor_units()
                .ok_or_else(|| PaymentError::InvalidAmount(item.title.clone()))?;
            let prefix = format!("line_items[{i}]");

            form.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                unit_amount.to_string(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.title.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][metadata][product_id]"),
                item.id.to_string(),
            ));
            form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }

        Ok(form)
    }
}

#[async_trait]
impl PaymentProcessor for StripeCheckout {
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    async fn pay(&self, items: &[CheckoutItem]) -> Result<Option<String>, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let form = self.checkout_form(items)?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        tracing::info!(session_id = %session.id, "Checkout session created");
        Ok(session.url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uniq_core::{Price, ProductId};

    use super::*;

    fn client() -> StripeCheckout {
        let config = PaymentsConfig {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: SecretString::from("sk_test_abc"),
            currency: "usd".to_string(),
            checkout_origin: "https://checkout.stripe.com".to_string(),
        };
        StripeCheckout::new(&config, "https://shop.uniq.test").unwrap()
    }

    fn item(id: i64, title: &str, price: &str) -> CheckoutItem {
        CheckoutItem {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::parse(price).unwrap(),
            quantity: 1,
        }
    }

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_form_encodes_line_items_in_cents() {
        let form = client()
            .checkout_form(&[item(1, "Lamp", "10"), item(2, "Mug", "5.5")])
            .unwrap();

        assert_eq!(value(&form, "mode"), Some("payment"));
        assert_eq!(
            value(&form, "success_url"),
            Some("https://shop.uniq.test/?checkout=success")
        );
        assert_eq!(
            value(&form, "line_items[0][price_data][unit_amount]"),
            Some("1000")
        );
        assert_eq!(
            value(&form, "line_items[1][price_data][unit_amount]"),
            Some("550")
        );
        assert_eq!(
            value(&form, "line_items[1][price_data][product_data][name]"),
            Some("Mug")
        );
        assert_eq!(
            value(&form, "line_items[1][price_data][product_data][metadata][product_id]"),
            Some("2")
        );
        assert_eq!(value(&form, "line_items[0][quantity]"), Some("1"));
        assert_eq!(
            value(&form, "line_items[0][price_data][currency]"),
            Some("usd")
        );
    }

    #[test]
    fn test_empty_cart_still_produces_a_request() {
        let form = client().checkout_form(&[]).unwrap();
        assert_eq!(form.len(), 3);
        assert!(form.iter().all(|(k, _)| !k.starts_with("line_items")));
    }
}
