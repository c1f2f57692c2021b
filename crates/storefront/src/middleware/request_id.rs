//! Request correlation IDs.
//!
//! A proxy-supplied `x-request-id` is kept when it is short printable ASCII;
//! anything else is replaced with a fresh UUID v4. The ID lands on the
//! request span, the Sentry scope and the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID accepted verbatim.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Upstream ID if usable, otherwise a new one.
fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_UPSTREAM_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned)
}

/// Tag the request with a correlation ID and echo it back.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    #[test]
    fn test_upstream_id_is_kept() {
        assert_eq!(resolve_request_id(&headers("edge-7f3a")), "edge-7f3a");
    }

    #[test]
    fn test_unusable_upstream_ids_are_replaced() {
        let long = "a".repeat(MAX_UPSTREAM_ID_LEN + 1);
        for id in ["", "has space", long.as_str()] {
            let resolved = resolve_request_id(&headers(id));
            assert_ne!(resolved, id);
            assert!(Uuid::parse_str(&resolved).is_ok());
        }
    }

    #[test]
    fn test_missing_header_gets_uuid() {
        assert!(Uuid::parse_str(&resolve_request_id(&HeaderMap::new())).is_ok());
    }
}
