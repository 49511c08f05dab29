//! Item route handlers.
//!
//! Product listing, detail pages with comments, and the admin-side item
//! lifecycle (create with image upload, edit, delete).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use larkspur_core::{ItemId, Price};

use crate::db::{CommentRepository, ItemRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::{CommentWithAuthor, CurrentUser, Item};
use crate::routes::auth::NoticeQuery;
use crate::routes::notice;
use crate::services::upload;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Comment form data.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub body: String,
}

/// Fields collected from the multipart item form.
#[derive(Debug, Default)]
struct ItemForm {
    name: String,
    price: String,
    body: String,
    image: Option<(String, Bytes)>,
}

impl ItemForm {
    /// Read the multipart item form.
    ///
    /// An image part with no filename (the browser's "no file chosen") or
    /// no content is treated as absent.
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let field_name = field.name().unwrap_or_default().to_owned();
            match field_name.as_str() {
                "name" => {
                    form.name = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                }
                "price" => {
                    form.price = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                }
                "body" => {
                    form.body = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                }
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_owned();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !filename.is_empty() && !data.is_empty() {
                        form.image = Some((filename, data));
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validate the form, returning the parsed price on success or the
    /// list of inline errors to re-render.
    fn validate(&self, require_image: bool) -> std::result::Result<Price, Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Name is required.".to_owned());
        }

        let price = match Price::parse(&self.price) {
            Ok(price) => Some(price),
            Err(e) => {
                errors.push(format!("Price: {e}."));
                None
            }
        };

        if self.body.trim().is_empty() {
            errors.push("Description is required.".to_owned());
        }

        match &self.image {
            Some((filename, _)) => {
                if upload::sanitize_filename(filename).is_none() {
                    errors.push("Image filename is not usable.".to_owned());
                } else if !upload::has_allowed_extension(filename) {
                    errors.push("Images must be jpg, jpeg, or png.".to_owned());
                }
            }
            None if require_image => {
                errors.push("An image is required.".to_owned());
            }
            None => {}
        }

        match (errors.is_empty(), price) {
            (true, Some(price)) => Ok(price),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub current_user: Option<CurrentUser>,
    pub items: Vec<Item>,
}

/// Product detail page template with comments.
#[derive(Template, WebTemplate)]
#[template(path = "show_product.html")]
pub struct ShowItemTemplate {
    pub current_user: Option<CurrentUser>,
    pub item: Item,
    pub comments: Vec<CommentWithAuthor>,
    pub message: Option<String>,
}

/// Shared create/edit item form template.
#[derive(Template, WebTemplate)]
#[template(path = "add_item.html")]
pub struct ItemFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub is_edit: bool,
    pub action: String,
    pub errors: Vec<String>,
    pub name: String,
    pub price: String,
    pub body: String,
    pub image_path: Option<String>,
}

// =============================================================================
// Listing & Detail Routes
// =============================================================================

/// Display all items.
pub async fn all_products(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<Response> {
    let items = ItemRepository::new(state.pool()).list().await?;

    Ok(ProductsTemplate {
        current_user,
        items,
    }
    .into_response())
}

/// Display one item with its comments and the comment form.
pub async fn show_item(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<i64>,
    Query(query): Query<NoticeQuery>,
) -> Result<Response> {
    let item = fetch_item(&state, id).await?;
    let comments = CommentRepository::new(state.pool())
        .list_for_item(item.id)
        .await?;

    let message = query
        .notice
        .as_deref()
        .and_then(notice::message)
        .map(str::to_owned);

    Ok(ShowItemTemplate {
        current_user,
        item,
        comments,
        message,
    }
    .into_response())
}

/// Handle comment submission on an item.
///
/// Guests are bounced to the login page; a successful insert redirects
/// back to the detail page so a refresh cannot resubmit the comment.
pub async fn post_comment(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let item = fetch_item(&state, id).await?;

    let Some(user) = current_user else {
        return Ok(Redirect::to(&format!("/login?notice={}", notice::LOGIN_REQUIRED))
            .into_response());
    };

    let body = form.body.trim();
    if body.is_empty() {
        return Ok(Redirect::to(&format!(
            "/item/{id}?notice={}",
            notice::EMPTY_COMMENT
        ))
        .into_response());
    }

    CommentRepository::new(state.pool())
        .create(user.id, item.id, body)
        .await?;

    Ok(Redirect::to(&format!("/item/{id}")).into_response())
}

// =============================================================================
// Admin Routes
// =============================================================================

/// Display the new item form.
pub async fn add_item_page(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
    ItemFormTemplate {
        current_user: Some(admin),
        is_edit: false,
        action: "/add_item".to_owned(),
        errors: Vec::new(),
        name: String::new(),
        price: String::new(),
        body: String::new(),
        image_path: None,
    }
}

/// Handle new item submission.
///
/// Persists the uploaded image, then inserts the item tied to the admin's
/// account and redirects to the listing.
pub async fn add_item(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Response> {
    let form = ItemForm::read(multipart).await?;

    let price = match form.validate(true) {
        Ok(price) => price,
        Err(errors) => {
            return Ok(item_form_response(
                Some(admin),
                &form,
                None,
                false,
                "/add_item".to_owned(),
                errors,
            ));
        }
    };

    // Validation guarantees an image is present on the create path.
    let Some((filename, data)) = &form.image else {
        return Err(AppError::Internal("validated image missing".to_owned()));
    };

    let image_path = upload::store_image(&state.config().upload_dir(), filename, data).await?;

    match ItemRepository::new(state.pool())
        .create(admin.id, form.name.trim(), price, &form.body, &image_path)
        .await
    {
        Ok(item) => {
            tracing::info!(item_id = %item.id, name = %item.name, "item created");
            Ok(Redirect::to("/all_procucts").into_response())
        }
        Err(RepositoryError::Conflict(_)) => Ok(item_form_response(
            Some(admin),
            &form,
            None,
            false,
            "/add_item".to_owned(),
            vec!["An item with that name already exists.".to_owned()],
        )),
        Err(e) => Err(e.into()),
    }
}

/// Display the edit form, pre-filled with the item's current values.
pub async fn edit_item_page(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let item = fetch_item(&state, id).await?;

    Ok(ItemFormTemplate {
        current_user,
        is_edit: true,
        action: format!("/edit-item/{id}"),
        errors: Vec::new(),
        name: item.name,
        price: item.price.input_value(),
        body: item.body,
        image_path: item.image_path,
    }
    .into_response())
}

/// Handle item edit submission.
///
/// The stored image path is only replaced when a new file was uploaded;
/// otherwise it is preserved exactly.
pub async fn edit_item(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response> {
    let item = fetch_item(&state, id).await?;

    let form = ItemForm::read(multipart).await?;

    let price = match form.validate(false) {
        Ok(price) => price,
        Err(errors) => {
            return Ok(item_form_response(
                current_user,
                &form,
                item.image_path.as_deref(),
                true,
                format!("/edit-item/{id}"),
                errors,
            ));
        }
    };

    let new_image_path = match &form.image {
        Some((filename, data)) => {
            Some(upload::store_image(&state.config().upload_dir(), filename, data).await?)
        }
        None => None,
    };

    match ItemRepository::new(state.pool())
        .update(
            item.id,
            form.name.trim(),
            price,
            &form.body,
            new_image_path.as_deref(),
        )
        .await
    {
        Ok(()) => Ok(Redirect::to(&format!("/item/{id}")).into_response()),
        Err(RepositoryError::Conflict(_)) => Ok(item_form_response(
            current_user,
            &form,
            item.image_path.as_deref(),
            true,
            format!("/edit-item/{id}"),
            vec!["An item with that name already exists.".to_owned()],
        )),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("item {id}"))),
        Err(e) => Err(e.into()),
    }
}

/// Delete an item and its comments.
pub async fn delete_item(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Response> {
    let deleted = ItemRepository::new(state.pool())
        .delete(ItemId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("item {id}")));
    }

    tracing::info!(item_id = id, "item deleted");
    Ok(Redirect::to("/all_procucts").into_response())
}

// =============================================================================
// Helpers
// =============================================================================

/// Fetch an item or produce a 404.
async fn fetch_item(state: &AppState, id: i64) -> Result<Item> {
    ItemRepository::new(state.pool())
        .get_by_id(ItemId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {id}")))
}

/// Re-render the item form with the submitted values and inline errors.
fn item_form_response(
    current_user: Option<CurrentUser>,
    form: &ItemForm,
    image_path: Option<&str>,
    is_edit: bool,
    action: String,
    errors: Vec<String>,
) -> Response {
    ItemFormTemplate {
        current_user,
        is_edit,
        action,
        errors,
        name: form.name.clone(),
        price: form.price.clone(),
        body: form.body.clone(),
        image_path: image_path.map(str::to_owned),
    }
    .into_response()
}
