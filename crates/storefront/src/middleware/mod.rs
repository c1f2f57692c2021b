//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame options, etc.)
//! 5. Session layer (tower-sessions with in-memory store, holds the cart)
//! 6. Rate limiting on checkout and uploads (governor)
//!
//! Identity is resolved per handler through the extractors in [`identity`].

pub mod identity;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use identity::{AuthRejection, OptionalIdentity, RequireAdmin};
pub use rate_limit::{checkout_rate_limiter, upload_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
