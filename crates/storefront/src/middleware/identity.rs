//! Identity extractors.
//!
//! Resolve the caller from the session JWT on each request. Handlers pick the
//! extractor matching how strict they need to be:
//!
//! - [`OptionalIdentity`] never rejects
//! - [`RequireAdmin`] rejects anonymous callers and non-admins
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     RequireAdmin(identity): RequireAdmin,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", identity.subject)
//! }
//! ```

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderValue, Method, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use crate::error::set_sentry_user;
use crate::services::Identity;
use crate::state::AppState;

/// Header set by HTMX on every request it issues.
const HX_REQUEST: &str = "hx-request";

/// Header telling HTMX to perform a full-page navigation.
const HX_REDIRECT: &str = "hx-redirect";

/// Where non-admins are sent.
const HOME_PATH: &str = "/";

/// Rejection returned by the identity extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// Page navigation by an anonymous caller: go to the sign-in page.
    RedirectToSignIn(String),
    /// Page navigation by a signed-in non-admin: go home.
    RedirectHome,
    /// HTMX request that must navigate away instead of swapping.
    HxRedirect(String),
    /// Non-navigation request without an identity.
    Unauthorized,
    /// Non-navigation request from a non-admin.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn(url) => Redirect::to(&url).into_response(),
            Self::RedirectHome => Redirect::to(HOME_PATH).into_response(),
            Self::HxRedirect(url) => match HeaderValue::from_str(&url) {
                Ok(value) => {
                    let mut response = StatusCode::UNAUTHORIZED.into_response();
                    response.headers_mut().insert(HX_REDIRECT, value);
                    response
                }
                Err(_) => StatusCode::UNAUTHORIZED.into_response(),
            },
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// How the request expects to be turned away.
enum Navigation {
    /// Plain browser navigation: a redirect works.
    Page,
    /// HTMX fragment request: needs `HX-Redirect`.
    Htmx,
    /// Anything else gets a bare status.
    Api,
}

fn navigation(parts: &Parts) -> Navigation {
    let is_htmx = parts
        .headers
        .get(HX_REQUEST)
        .is_some_and(|v| v.as_bytes() == b"true");

    if is_htmx {
        Navigation::Htmx
    } else if parts.method == Method::GET {
        Navigation::Page
    } else {
        Navigation::Api
    }
}

fn resolve<S>(parts: &Parts, state: &S) -> (AppState, Option<Identity>)
where
    AppState: FromRef<S>,
{
    let app_state = AppState::from_ref(state);
    let identity = app_state.identity().identify(&parts.headers);
    if let Some(identity) = &identity {
        set_sentry_user(&identity.subject);
    }
    (app_state, identity)
}

fn unauthenticated(parts: &Parts, state: &AppState) -> AuthRejection {
    let sign_in = state.identity().sign_in_url().to_string();
    match navigation(parts) {
        Navigation::Page => AuthRejection::RedirectToSignIn(sign_in),
        Navigation::Htmx => AuthRejection::HxRedirect(sign_in),
        Navigation::Api => AuthRejection::Unauthorized,
    }
}

fn not_admin(parts: &Parts) -> AuthRejection {
    match navigation(parts) {
        Navigation::Page => AuthRejection::RedirectHome,
        Navigation::Htmx => AuthRejection::HxRedirect(HOME_PATH.to_string()),
        Navigation::Api => AuthRejection::Forbidden,
    }
}

/// Extractor that optionally gets the current caller.
///
/// Invalid or expired tokens count as anonymous.
pub struct OptionalIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (_, identity) = resolve(parts, state);
        Ok(Self(identity))
    }
}

/// Extractor that requires a signed-in caller with the `admin` role.
pub struct RequireAdmin(pub Identity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (app_state, identity) = resolve(parts, state);
        let Some(identity) = identity else {
            return Err(unauthenticated(parts, &app_state));
        };

        if !identity.is_admin() {
            tracing::warn!(subject = %identity.subject, path = %parts.uri.path(), "Non-admin denied");
            return Err(not_admin(parts));
        }

        Ok(Self(identity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Request, header};

    use super::*;

    fn parts(method: Method, htmx: bool) -> Parts {
        let mut builder = Request::builder().method(method).uri("/admin/products");
        if htmx {
            builder = builder.header(HX_REQUEST, "true");
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_non_admin_rejections() {
        assert_eq!(not_admin(&parts(Method::GET, false)), AuthRejection::RedirectHome);
        assert_eq!(not_admin(&parts(Method::POST, false)), AuthRejection::Forbidden);
        assert_eq!(
            not_admin(&parts(Method::DELETE, true)),
            AuthRejection::HxRedirect("/".to_string())
        );
    }

    #[test]
    fn test_hx_redirect_response_carries_header() {
        let response = AuthRejection::HxRedirect("/".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(HX_REDIRECT).unwrap(), "/");
    }

    #[test]
    fn test_sign_in_redirect_response() {
        let response =
            AuthRejection::RedirectToSignIn("https://accounts.uniq.test/sign-in".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://accounts.uniq.test/sign-in"
        );
    }
}
