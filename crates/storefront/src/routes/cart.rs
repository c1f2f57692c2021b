//! Cart route handlers.
//!
//! The cart lives in the session as an ordered list of product snapshots.
//! Add and remove answer with the badge fragment and an HTMX trigger; the
//! grid, badge and cart sheet listen for `cart-updated` and re-fetch.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use uniq_core::{Cart, CartItem, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::session::keys;
use crate::state::AppState;

/// HTMX event fired after the cart changes.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session. A missing or unreadable cart is empty.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart from session");
            Cart::new()
        }
    }
}

/// Store the cart in the session.
async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

/// Add/remove form data.
#[derive(Debug, Deserialize)]
pub struct CartItemForm {
    pub id: ProductId,
}

/// Cart sheet fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart.html")]
pub struct CartTemplate {
    pub cart: Cart,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub cart: Cart,
}

/// Cart sheet with items, total and checkout button.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    CartTemplate {
        cart: load_cart(&session).await,
    }
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        cart: load_cart(&session).await,
    }
}

/// Add a product to the cart (HTMX).
///
/// The product is looked up in the public listing so anonymous shoppers can
/// add items. Adding the same product twice appends a second entry.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartItemForm>,
) -> Result<impl IntoResponse> {
    let product = state
        .products()
        .get_all()
        .await?
        .into_iter()
        .find(|p| p.id == form.id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.id)))?;

    let mut cart = load_cart(&session).await;
    cart.add(CartItem::from(&product));
    save_cart(&session, &cart).await?;

    let product_id = form.id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartCountTemplate { cart },
    ))
}

/// Remove every entry of a product from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Form(form): Form<CartItemForm>,
) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await;
    cart.remove_by_id(form.id);
    save_cart(&session, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartCountTemplate { cart },
    ))
}
