//! Session middleware configuration.
//!
//! Sessions hold only the cart. They live in a bounded in-process cache:
//! entries expire after a day of inactivity and the least recently used are
//! evicted once the cache is full. Carts are never persisted and are lost on
//! restart.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "uniq_session";

/// Session expiry time in seconds (1 day of inactivity).
pub const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Most sessions kept in memory at once.
const MAX_SESSIONS: u64 = 100_000;

/// Session keys.
pub mod keys {
    /// Key for the serialized cart.
    pub const CART: &str = "cart";
}

/// Create the session layer with a bounded in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    let store = MokaStore::new(Some(MAX_SESSIONS));

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
