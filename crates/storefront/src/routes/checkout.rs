//! Checkout handler.
//!
//! Forwards the session cart to the payment processor and sends the browser
//! to the hosted checkout page. No order state is kept here.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::load_cart;
use crate::error::add_breadcrumb;
use crate::state::AppState;

/// Start a hosted checkout.
///
/// Each cart entry becomes one line item with quantity 1. An empty cart is
/// still sent. When the processor returns no URL, or the call fails, the
/// response is `204 No Content` and the browser stays on the page.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Response {
    let items = load_cart(&session).await.checkout_items();
    add_breadcrumb("checkout", "Checkout started", None);

    match state.payments().pay(&items).await {
        Ok(Some(url)) => Redirect::to(&url).into_response(),
        Ok(None) => {
            tracing::info!(item_count = items.len(), "Payment processor returned no URL");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Checkout failed");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}
