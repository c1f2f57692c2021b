//! Integration tests for the admin route guards.

use axum::{
    body::Body,
    http::{StatusCode, header},
};

use uniq_integration_tests::{
    SIGN_IN_URL, TestApp, admin_bearer, body_text, form, form_body, get, member_bearer, product,
    request, session_cookie,
};

#[tokio::test]
async fn test_anonymous_page_visit_redirects_to_sign_in() {
    let app = TestApp::new().await;

    let response = app.send(get("/admin/products")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), SIGN_IN_URL);
}

#[tokio::test]
async fn test_non_admin_page_visit_redirects_home() {
    let app = TestApp::new().await;

    let response = app
        .send(
            request("GET", "/admin/products/new")
                .header(header::AUTHORIZATION, member_bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_anonymous_mutation_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .send(request("DELETE", "/admin/products/1").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_admin_mutation_is_forbidden() {
    let app = TestApp::new().await;

    let response = app
        .send(
            request("DELETE", "/admin/products/1")
                .header(header::AUTHORIZATION, member_bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_htmx_requests_get_hx_redirect() {
    let app = TestApp::new().await;

    let response = app
        .send(
            request("GET", "/admin/products/rows")
                .header("hx-request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("hx-redirect").unwrap(), SIGN_IN_URL);
}

#[tokio::test]
async fn test_expired_or_forged_tokens_count_as_anonymous() {
    let app = TestApp::new().await;

    let response = app
        .send(
            request("GET", "/admin/products")
                .header(header::COOKIE, "__session=not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), SIGN_IN_URL);
}

#[tokio::test]
async fn test_admin_dashboard_redirects_to_products() {
    let app = TestApp::new().await;

    let response = app
        .send(
            request("GET", "/admin")
                .header(header::AUTHORIZATION, admin_bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/products"
    );
}

#[tokio::test]
async fn test_sign_in_redirects_to_provider() {
    let app = TestApp::new().await;

    let response = app.send(get("/auth/sign-in")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), SIGN_IN_URL);
}

#[tokio::test]
async fn test_sign_out_clears_token_cookie_and_cart() {
    let app = TestApp::with_products(vec![product("Lamp", "10")]).await;

    let added = app
        .send(form("POST", "/cart/add").body(form_body(&[("id", "1")])).unwrap())
        .await;
    let cookie = session_cookie(&added).unwrap();

    let response = app
        .send(
            request("GET", "/auth/sign-out")
                .header(header::COOKIE, format!("{cookie}; __session=token"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let removed = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("__session="))
        .unwrap()
        .to_string();
    assert!(removed.contains("Max-Age=0"), "{removed}");

    let cart = app
        .send(
            request("GET", "/cart")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert!(body_text(cart).await.contains("Your cart is empty."));
}
