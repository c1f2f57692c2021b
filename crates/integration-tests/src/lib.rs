//! Integration test harness for UniQ Store.
//!
//! Builds the real storefront router over the in-memory product store and
//! stub payment and upload clients, so tests drive it with
//! `tower::ServiceExt::oneshot` and need no database or network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p uniq-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;

use uniq_core::{CheckoutItem, NewProduct, Price};
use uniq_storefront::config::{
    IdentityConfig, IdentityKey, PaymentsConfig, StorefrontConfig, UploadsConfig,
};
use uniq_storefront::db::MemoryProductStore;
use uniq_storefront::services::{
    ImageStorage, ImageUpload, PaymentError, PaymentProcessor, UploadError,
};
use uniq_storefront::state::AppState;

/// Shared secret the test identity provider signs with.
pub const JWT_SECRET: &str = "test-signing-secret-0123456789abcdef";

/// Provider sign-in page in the test configuration.
pub const SIGN_IN_URL: &str = "https://accounts.uniq.test/sign-in";

/// URL the stub upload service hands out.
pub const UPLOADED_IMAGE_URL: &str = "https://files.uniq.test/uploaded.png";

/// Largest upload accepted in tests.
pub const MAX_UPLOAD_BYTES: usize = 1024;

/// Client address sent on every request, for the rate limiter.
const CLIENT_IP: &str = "203.0.113.10";

// =============================================================================
// Stub Clients
// =============================================================================

/// Payment processor stub recording every checkout.
pub struct RecordingPayments {
    url: Option<String>,
    fail: bool,
    calls: Mutex<Vec<Vec<CheckoutItem>>>,
}

impl RecordingPayments {
    #[must_use]
    pub fn returning(url: Option<&str>) -> Self {
        Self {
            url: url.map(str::to_string),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            url: None,
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Items of every call so far, in order.
    pub fn calls(&self) -> Vec<Vec<CheckoutItem>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProcessor for RecordingPayments {
    async fn pay(&self, items: &[CheckoutItem]) -> Result<Option<String>, PaymentError> {
        self.calls.lock().unwrap().push(items.to_vec());
        if self.fail {
            return Err(PaymentError::Api {
                status: 500,
                message: "processor down".to_string(),
            });
        }
        Ok(self.url.clone())
    }
}

/// Image storage stub that accepts everything.
#[derive(Default)]
pub struct StubImages {
    uploads: Mutex<Vec<String>>,
}

impl StubImages {
    /// File names uploaded so far.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStorage for StubImages {
    async fn upload(&self, image: ImageUpload) -> Result<String, UploadError> {
        self.uploads.lock().unwrap().push(image.file_name);
        Ok(UPLOADED_IMAGE_URL.to_string())
    }
}

// =============================================================================
// Test Application
// =============================================================================

/// Configuration pointing at nothing real.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/uniq_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        // Requests carry `x-forwarded-for` instead of a peer address.
        trust_proxy: true,
        identity: IdentityConfig {
            sign_in_url: SIGN_IN_URL.to_string(),
            sign_out_url: None,
            issuer: None,
            session_cookie: "__session".to_string(),
            key: IdentityKey::Shared(SecretString::from(JWT_SECRET)),
        },
        payments: PaymentsConfig {
            api_base: "https://payments.uniq.test".to_string(),
            secret_key: SecretString::from("sk_test_integration"),
            currency: "usd".to_string(),
            checkout_origin: "https://checkout.uniq.test".to_string(),
        },
        uploads: UploadsConfig {
            endpoint: "https://uploads.uniq.test/api/upload".to_string(),
            api_key: SecretString::from("upload_test_key"),
            max_bytes: MAX_UPLOAD_BYTES,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
        json_logs: false,
    }
}

/// A running router and handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub payments: Arc<RecordingPayments>,
    pub images: Arc<StubImages>,
}

impl TestApp {
    /// Empty catalog, processor answering with no URL.
    pub async fn new() -> Self {
        Self::build(Vec::new(), RecordingPayments::returning(None)).await
    }

    /// Catalog pre-filled in order; ids start at 1.
    pub async fn with_products(products: Vec<NewProduct>) -> Self {
        Self::build(products, RecordingPayments::returning(None)).await
    }

    pub async fn build(products: Vec<NewProduct>, payments: RecordingPayments) -> Self {
        let store = Arc::new(MemoryProductStore::with_products(products).await);
        let payments = Arc::new(payments);
        let images = Arc::new(StubImages::default());

        let state = AppState::new(test_config(), store, payments.clone(), images.clone()).unwrap();

        Self {
            router: uniq_storefront::app(state.clone()),
            state,
            payments,
            images,
        }
    }

    /// Send a request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Request builder carrying the client address header.
#[must_use]
pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", CLIENT_IP)
}

/// `GET` request.
#[must_use]
pub fn get(uri: &str) -> Request<Body> {
    request("GET", uri).body(Body::empty()).unwrap()
}

/// URL-encoded form request builder; finish it with [`form_body`].
#[must_use]
pub fn form(method: &str, uri: &str) -> axum::http::request::Builder {
    request(method, uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
}

/// Encode form fields.
#[must_use]
pub fn form_body(fields: &[(&str, &str)]) -> Body {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    Body::from(encoded)
}

/// Multipart body with one file part and the current `image_url`.
#[must_use]
pub fn multipart_upload(
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> (String, Body) {
    const BOUNDARY: &str = "uniq-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image_url\"\r\n\r\nhttps://files.uniq.test/previous.png\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    (
        format!("multipart/form-data; boundary={BOUNDARY}"),
        Body::from(body),
    )
}

/// Read a whole response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` pair of the session cookie a response sets, if any.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("uniq_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

// =============================================================================
// Identities
// =============================================================================

/// Sign a session token for `subject` with an optional role claim.
#[must_use]
pub fn token(subject: &str, role: Option<&str>) -> String {
    let mut claims = json!({
        "sub": subject,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    if let Some(role) = role {
        claims["metadata"] = json!({ "role": role });
    }
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// `Authorization` header value for an admin.
#[must_use]
pub fn admin_bearer() -> String {
    format!("Bearer {}", token("admin_1", Some("admin")))
}

/// `Authorization` header value for a signed-in shopper.
#[must_use]
pub fn member_bearer() -> String {
    format!("Bearer {}", token("member_1", None))
}

// =============================================================================
// Fixtures
// =============================================================================

/// A product with the given title and price.
#[must_use]
pub fn product(title: &str, price: &str) -> NewProduct {
    NewProduct {
        title: title.to_string(),
        description: format!("{title} description"),
        price: Price::parse(price).unwrap(),
        image_url: format!("https://cdn.uniq.test/{}.png", title.to_lowercase()),
    }
}
