//! Product management handlers.
//!
//! The add and edit forms are one template in two [`FormMode`]s. The form
//! swaps itself with the server's answer, so success and failure both come
//! back as `200` fragments carrying a notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use uniq_core::{FormMode, Product, ProductForm, ProductId};

use super::uploads::ImageUploadView;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::services::Identity;
use crate::state::AppState;

/// Delete confirmation prompt.
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this product?";

/// Banner shown above the form after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub success: bool,
    pub message: &'static str,
}

impl Notice {
    const fn success(mode: FormMode) -> Self {
        Self {
            success: true,
            message: mode.success_message(),
        }
    }

    const fn failure(mode: FormMode) -> Self {
        Self {
            success: false,
            message: mode.failure_message(),
        }
    }
}

/// Management table page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<Product>,
    pub confirmation: &'static str,
}

/// Table rows fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_rows.html")]
pub struct ProductRowsTemplate {
    pub products: Vec<Product>,
    pub confirmation: &'static str,
}

/// Add/edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormPageTemplate {
    pub mode: FormMode,
    pub action: String,
    pub form: ProductForm,
    pub valid: bool,
    pub upload: ImageUploadView,
    pub notice: Option<Notice>,
}

/// Form fragment template, returned after a submission (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_form.html")]
pub struct ProductFormTemplate {
    pub mode: FormMode,
    pub action: String,
    pub form: ProductForm,
    pub valid: bool,
    pub upload: ImageUploadView,
    pub notice: Option<Notice>,
}

impl ProductFormTemplate {
    fn new(mode: FormMode, action: String, form: ProductForm, notice: Option<Notice>) -> Self {
        Self {
            mode,
            action,
            valid: form.is_valid(),
            upload: ImageUploadView::existing(&form.image_url),
            form,
            notice,
        }
    }
}

/// Submit button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/submit_button.html")]
pub struct SubmitButtonTemplate {
    pub mode: FormMode,
    pub valid: bool,
}

/// Missing product page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/not_found.html")]
pub struct ProductNotFoundTemplate;

/// Query for the validation endpoint.
#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pub mode: FormMode,
}

fn edit_action(id: ProductId) -> String {
    format!("/admin/products/{id}")
}

/// Display the management table.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    Ok(ProductsIndexTemplate {
        products: state.products().get_all().await?,
        confirmation: DELETE_CONFIRMATION,
    })
}

/// Table rows fragment.
#[instrument(skip(state, _admin))]
pub async fn rows(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    Ok(ProductRowsTemplate {
        products: state.products().get_all().await?,
        confirmation: DELETE_CONFIRMATION,
    })
}

/// Display the empty add form.
#[instrument(skip(_admin))]
pub async fn new(RequireAdmin(_admin): RequireAdmin) -> impl IntoResponse {
    ProductFormPageTemplate {
        mode: FormMode::Create,
        action: "/admin/products".to_string(),
        form: ProductForm::default(),
        valid: false,
        upload: ImageUploadView::default(),
        notice: None,
    }
}

/// Re-render the submit button for the posted values.
#[instrument(skip(_admin, form))]
pub async fn validate(
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ValidateQuery>,
    Form(form): Form<ProductForm>,
) -> impl IntoResponse {
    SubmitButtonTemplate {
        mode: query.mode,
        valid: form.is_valid(),
    }
}

/// Add a product.
///
/// On success the form comes back empty; on failure it keeps the values.
#[instrument(skip(state, admin, form), fields(subject = %admin.subject))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> impl IntoResponse {
    let mode = FormMode::Create;
    let action = "/admin/products".to_string();

    if submit(&state, &admin, mode, &form, None).await {
        ProductFormTemplate::new(
            mode,
            action,
            ProductForm::default(),
            Some(Notice::success(mode)),
        )
    } else {
        ProductFormTemplate::new(mode, action, form, Some(Notice::failure(mode)))
    }
}

/// Display the edit form pre-filled from the stored product.
#[instrument(skip(state, admin))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let Some(product) = state.products().get(Some(&admin), id).await? else {
        return Ok((StatusCode::NOT_FOUND, ProductNotFoundTemplate).into_response());
    };

    let form = ProductForm::from_product(&product);
    Ok(ProductFormPageTemplate {
        mode: FormMode::Edit,
        action: edit_action(id),
        valid: form.is_valid(),
        upload: ImageUploadView::existing(&form.image_url),
        form,
        notice: None,
    }
    .into_response())
}

/// Overwrite a product. The form keeps the submitted values either way.
#[instrument(skip(state, admin, form), fields(subject = %admin.subject))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> impl IntoResponse {
    let mode = FormMode::Edit;
    let notice = if submit(&state, &admin, mode, &form, Some(id)).await {
        Notice::success(mode)
    } else {
        Notice::failure(mode)
    };
    ProductFormTemplate::new(mode, edit_action(id), form, Some(notice))
}

/// Delete a product and return the refreshed rows.
#[instrument(skip(state, admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    state.products().remove(Some(&admin), id).await?;

    Ok(ProductRowsTemplate {
        products: state.products().get_all().await?,
        confirmation: DELETE_CONFIRMATION,
    })
}

/// Run an add (`id` is `None`) or update and report whether it was stored.
/// Invalid forms never reach the store.
///
/// Failures are logged here; callers only show the generic failure notice.
async fn submit(
    state: &AppState,
    admin: &Identity,
    mode: FormMode,
    form: &ProductForm,
    id: Option<ProductId>,
) -> bool {
    let Some(product) = form.to_new_product() else {
        tracing::info!(?mode, "Refusing invalid product form");
        return false;
    };

    let result = match id {
        None => state.products().add(Some(admin), product).await.map(|_| ()),
        Some(id) => state.products().update(Some(admin), id, product).await,
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, ?mode, sentry_event_id = %event_id, "Product submission failed");
            false
        }
    }
}
