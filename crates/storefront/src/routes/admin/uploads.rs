//! Image upload handler (the form's `imageUploader` endpoint).
//!
//! The file input posts the whole form as multipart. The answer replaces the
//! upload widget, which holds the hidden `image_url` field the form submits.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{
        Multipart, State,
        multipart::MultipartError,
    },
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Response},
};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::services::{ImageUpload, UploadError};
use crate::state::AppState;

/// Fired once the new widget has settled, so the submit button re-validates.
pub const IMAGE_UPLOADED_EVENT: &str = "image-uploaded";

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Multipart field carrying the current URL.
const IMAGE_URL_FIELD: &str = "image_url";

/// Upload widget state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUploadView {
    /// Value of the hidden `image_url` field.
    pub image_url: String,
    /// Whether this render follows a successful upload.
    pub uploaded: bool,
    pub error: Option<String>,
}

impl ImageUploadView {
    /// Widget showing an already stored image, if any.
    #[must_use]
    pub fn existing(image_url: &str) -> Self {
        Self {
            image_url: image_url.to_string(),
            ..Self::default()
        }
    }
}

/// Upload widget fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/image_upload.html")]
pub struct ImageUploadTemplate {
    pub upload: ImageUploadView,
}

#[derive(Default)]
struct UploadForm {
    image: Option<ImageUpload>,
    current_url: String,
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            Some(IMAGE_URL_FIELD) => form.current_url = field.text().await?,
            _ => {}
        }
    }

    Ok(form)
}

/// Upload an image and return the widget with its new URL.
///
/// HTMX callers get the widget back with an error message on failure (and
/// their previous URL kept); other callers get the error status.
#[instrument(skip(state, admin, headers, multipart), fields(subject = %admin.subject))]
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    let max_bytes = state.config().uploads.max_bytes;
    let result = match form.image {
        None => Err(UploadError::Missing),
        Some(image) => match image.validate(max_bytes) {
            Ok(()) => state.images().upload(image).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(image_url) => {
            tracing::info!(%image_url, "Image uploaded");
            (
                AppendHeaders([("HX-Trigger-After-Settle", IMAGE_UPLOADED_EVENT)]),
                ImageUploadTemplate {
                    upload: ImageUploadView {
                        image_url,
                        uploaded: true,
                        error: None,
                    },
                },
            )
                .into_response()
        }
        Err(e) if headers.contains_key("hx-request") => {
            tracing::warn!(error = %e, "Image upload failed");
            ImageUploadTemplate {
                upload: ImageUploadView {
                    image_url: form.current_url,
                    uploaded: false,
                    error: Some(upload_error_message(&e).to_string()),
                },
            }
            .into_response()
        }
        Err(e) => AppError::Upload(e).into_response(),
    }
}

/// Text shown under the widget. Service failures stay generic.
fn upload_error_message(err: &UploadError) -> &'static str {
    match err {
        UploadError::Missing => "Choose an image to upload.",
        UploadError::UnsupportedType(_) => "Only image files can be uploaded.",
        UploadError::TooLarge { .. } => "The image is too large.",
        UploadError::Http(_) | UploadError::Api { .. } | UploadError::Parse(_) => {
            "Upload failed. Please try again."
        }
    }
}
