//! Integration tests for the image upload endpoint.

use axum::http::{StatusCode, header};

use uniq_integration_tests::{
    MAX_UPLOAD_BYTES, TestApp, UPLOADED_IMAGE_URL, admin_bearer, body_text, multipart_upload,
    request,
};

async fn upload(
    app: &TestApp,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
    htmx: bool,
    bearer: Option<String>,
) -> axum::http::Response<axum::body::Body> {
    let (multipart_type, body) = multipart_upload(file_name, content_type, bytes);
    let mut builder = request("POST", "/admin/uploads").header(header::CONTENT_TYPE, multipart_type);
    if htmx {
        builder = builder.header("hx-request", "true");
    }
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }
    app.send(builder.body(body).unwrap()).await
}

#[tokio::test]
async fn test_upload_returns_widget_with_new_url() {
    let app = TestApp::new().await;

    let response = upload(&app, "lamp.png", "image/png", b"png-bytes", true, Some(admin_bearer())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-trigger-after-settle").unwrap(),
        "image-uploaded"
    );

    let body = body_text(response).await;
    assert!(body.contains(UPLOADED_IMAGE_URL));
    assert!(body.contains("Image uploaded successfully"));
    assert_eq!(app.images.uploads(), vec!["lamp.png".to_string()]);
}

#[tokio::test]
async fn test_htmx_upload_error_keeps_previous_url() {
    let app = TestApp::new().await;

    let response = upload(&app, "notes.txt", "text/plain", b"hello", true, Some(admin_bearer())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Only image files can be uploaded."));
    assert!(body.contains("https://files.uniq.test/previous.png"));
    assert!(app.images.uploads().is_empty());
}

#[tokio::test]
async fn test_non_image_is_unsupported_media_type() {
    let app = TestApp::new().await;

    let response = upload(&app, "notes.txt", "text/plain", b"hello", false, Some(admin_bearer())).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_oversized_image_is_rejected() {
    let app = TestApp::new().await;

    let bytes = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let response = upload(&app, "huge.png", "image/png", &bytes, false, Some(admin_bearer())).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.images.uploads().is_empty());
}

#[tokio::test]
async fn test_anonymous_upload_is_unauthorized() {
    let app = TestApp::new().await;

    let response = upload(&app, "lamp.png", "image/png", b"png-bytes", false, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.images.uploads().is_empty());
}
