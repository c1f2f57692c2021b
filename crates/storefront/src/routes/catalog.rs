//! Public catalog handlers.
//!
//! The page renders the grid once; afterwards the grid re-fetches itself on
//! `products-changed` (SSE) and `cart-updated` (HTMX) events.

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use async_stream::stream;
use axum::{
    extract::State,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tower_sessions::Session;
use tracing::instrument;

use uniq_core::{Cart, Product};

use super::cart::load_cart;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalIdentity;
use crate::services::Identity;
use crate::services::events::PRODUCTS_CHANGED_EVENT;
use crate::state::AppState;

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<Product>,
    pub cart: Cart,
    pub signed_in: bool,
    pub is_admin: bool,
}

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<Product>,
    pub cart: Cart,
}

/// Display the catalog page.
#[instrument(skip(state, session, identity))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalIdentity(identity): OptionalIdentity,
) -> Result<impl IntoResponse> {
    let products = state.products().get_all().await?;

    Ok(HomeTemplate {
        products,
        cart: load_cart(&session).await,
        signed_in: identity.is_some(),
        is_admin: identity.as_ref().is_some_and(Identity::is_admin),
    })
}

/// Product grid fragment.
#[instrument(skip(state, session))]
pub async fn grid(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let products = state.products().get_all().await?;

    Ok(ProductGridTemplate {
        products,
        cart: load_cart(&session).await,
    })
}

/// Stream product changes as server-sent events.
///
/// Each event is named `products-changed` and carries the change as JSON.
/// A subscriber that falls behind gets one event with an empty object, which
/// triggers the same re-fetch.
#[instrument(skip(state))]
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut changes = state.products().events().subscribe();

    let events = stream! {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    let data = serde_json::to_string(&change).unwrap_or_else(|_| "{}".to_string());
                    yield Ok(Event::default().event(PRODUCTS_CHANGED_EVENT).data(data));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "SSE subscriber lagged");
                    yield Ok(Event::default().event(PRODUCTS_CHANGED_EVENT).data("{}"));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}
