//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the endpoints that call paid external services are limited:
//! - `checkout_rate_limiter`: each call creates a payment session (~10/min)
//! - `upload_rate_limiter`: each call stores a file (~20/min)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor keyed on the client IP.
///
/// Proxy headers are only read when the deployment sits behind a trusted
/// proxy; otherwise any client could pick its own key. The peer address of
/// the TCP connection is the fallback either way.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    trust_proxy: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy: bool) -> Self {
        Self { trust_proxy }
    }
}

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = if self.trust_proxy {
            ["x-forwarded-for", "x-real-ip"]
                .iter()
                .find_map(|name| header_ip(req, name))
        } else {
            None
        };

        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for checkout: ~10 requests per minute per IP.
///
/// # Panics
///
/// This function will not panic. `per_second(6)` and `burst_size(5)` are
/// always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn checkout_rate_limiter(trust_proxy: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy))
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create rate limiter for image uploads: ~20 requests per minute per IP.
///
/// # Panics
///
/// This function will not panic. `per_second(3)` and `burst_size(10)` are
/// always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn upload_rate_limiter(trust_proxy: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy))
        .per_second(3) // Replenish 1 token every 3 seconds (~20/minute)
        .burst_size(10)
        .finish()
        .expect("rate limiter config with per_second(3) and burst_size(10) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    const PEER: &str = "198.51.100.4:5555";

    fn forwarded_request() -> Request<()> {
        let addr: SocketAddr = PEER.parse().unwrap();
        Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .extension(ConnectInfo(addr))
            .body(())
            .unwrap()
    }

    #[test]
    fn test_trusted_proxy_forwarded_for_takes_first_hop() {
        let ip = ClientIpKeyExtractor::new(true)
            .extract(&forwarded_request())
            .unwrap();
        assert_eq!(ip.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_untrusted_proxy_headers_are_ignored() {
        let ip = ClientIpKeyExtractor::new(false)
            .extract(&forwarded_request())
            .unwrap();
        assert_eq!(ip.to_string(), "198.51.100.4");

        let spoofed_only = Request::builder()
            .header("x-real-ip", "203.0.113.9")
            .body(())
            .unwrap();
        assert!(ClientIpKeyExtractor::new(false).extract(&spoofed_only).is_err());
    }

    #[test]
    fn test_falls_back_to_connect_info() {
        let addr: SocketAddr = PEER.parse().unwrap();
        let req = Request::builder()
            .extension(ConnectInfo(addr))
            .body(())
            .unwrap();
        let ip = ClientIpKeyExtractor::new(true).extract(&req).unwrap();
        assert_eq!(ip.to_string(), "198.51.100.4");
    }

    #[test]
    fn test_no_source_is_an_error() {
        let req = Request::builder().body(()).unwrap();
        assert!(ClientIpKeyExtractor::new(true).extract(&req).is_err());
    }
}
