//! Admin panel route handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin), so
//! anonymous visitors are sent to sign in and non-admins are sent home.

pub mod products;
pub mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::{RequireAdmin, upload_rate_limiter};
use crate::state::AppState;

/// Room for the multipart boundaries and the other form fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the admin routes router.
///
/// `max_upload_bytes` caps the request body of the upload endpoint.
pub fn routes(max_upload_bytes: usize, trust_proxy: bool) -> Router<AppState> {
    let uploads = Router::new()
        .route("/uploads", post(uploads::upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD))
        .layer(upload_rate_limiter(trust_proxy));

    Router::new()
        .route("/", get(index))
        .route(
            "/products",
            get(products::index).post(products::create),
        )
        .route("/products/rows", get(products::rows))
        .route("/products/new", get(products::new))
        .route("/products/validate", post(products::validate))
        .route(
            "/products/{id}",
            post(products::update).delete(products::delete),
        )
        .route("/products/{id}/edit", get(products::edit))
        .merge(uploads)
}

/// The dashboard is the product table.
async fn index(RequireAdmin(_): RequireAdmin) -> Redirect {
    Redirect::to("/admin/products")
}
