//! Sign-in and sign-out handlers.
//!
//! Sign-in and sign-up happen on the identity provider's hosted pages.
//! Sign-out drops the local session token cookie and the cart session before
//! leaving for the provider's sign-out page (or home when none is set).

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Redirect to the identity provider's sign-in page.
#[instrument(skip(state))]
pub async fn sign_in(State(state): State<AppState>) -> impl IntoResponse {
    Redirect::to(state.identity().sign_in_url())
}

/// Clear the session token and cart, then redirect.
#[instrument(skip_all)]
pub async fn sign_out(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    session.flush().await?;

    let identity = state.identity();
    let jar = jar.remove(Cookie::build((identity.session_cookie().to_string(), "")).path("/"));

    Ok((jar, Redirect::to(identity.sign_out_url())))
}
