//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Catalog page
//! GET  /health                     - Health check
//! GET  /health/ready               - Store reachable
//!
//! # Catalog (HTMX fragments)
//! GET  /products/grid              - Product grid fragment
//! GET  /products/stream            - SSE `products-changed` notifications
//!
//! # Cart (HTMX fragments)
//! GET  /cart                       - Cart sheet fragment
//! GET  /cart/count                 - Cart count badge (fragment)
//! POST /cart/add                   - Add to cart (returns badge, triggers cart-updated)
//! POST /cart/remove                - Remove item (returns badge, triggers cart-updated)
//!
//! # Checkout
//! POST /checkout                   - Redirect to hosted checkout (204 when no URL)
//!
//! # Auth
//! GET  /auth/sign-in               - Redirect to identity provider
//! GET  /auth/sign-out              - Drop session token and cart, then leave
//!
//! # Admin (requires admin role)
//! GET    /admin                    - Redirect to /admin/products
//! GET    /admin/products           - Management table
//! GET    /admin/products/rows      - Table rows fragment
//! GET    /admin/products/new       - Add form
//! POST   /admin/products           - Add action (returns form fragment)
//! POST   /admin/products/validate  - Submit button fragment
//! GET    /admin/products/{id}/edit - Edit form
//! POST   /admin/products/{id}      - Update action (returns form fragment)
//! DELETE /admin/products/{id}      - Remove action (returns rows fragment)
//! POST   /admin/uploads            - Image upload (returns upload widget)
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::checkout_rate_limiter;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/grid", get(catalog::grid))
        .route("/stream", get(catalog::stream))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout router (rate limited, every call opens a payment session).
pub fn checkout_routes(trust_proxy: bool) -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::checkout))
        .layer(checkout_rate_limiter(trust_proxy))
}

/// Create all routes for the storefront.
///
/// `max_upload_bytes` caps image uploads in the admin panel. `trust_proxy`
/// decides whether rate limits key on proxy headers.
pub fn routes(max_upload_bytes: usize, trust_proxy: bool) -> Router<AppState> {
    Router::new()
        // Catalog page
        .route("/", get(catalog::home))
        // Catalog fragments and change stream
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout redirect
        .merge(checkout_routes(trust_proxy))
        // Auth routes
        .route("/auth/sign-in", get(auth::sign_in))
        .route("/auth/sign-out", get(auth::sign_out))
        // Admin panel
        .nest("/admin", admin::routes(max_upload_bytes, trust_proxy))
}
