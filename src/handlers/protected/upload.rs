// handlers/protected/upload.rs - image uploads for logos and product pictures
//
// Ownership is resolved before the body is read, so a rejected request never
// touches the upload directory.

use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::ownership::owned_product;
use crate::services::upload::read_file_field;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub filename: String,
}

/// POST /uploadfile/profile - replace the caller's business logo
pub async fn upload_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let business = state.store().business_by_owner(user.id).await?;

    let filename = store_upload(&state, multipart).await?;
    if let Err(e) = state.store().set_business_logo(business.id, &filename).await {
        state.images().remove(&filename).await;
        return Err(e.into());
    }

    tracing::info!("User {} set logo of business {} to {}", user.id, business.id, filename);
    Ok(Json(UploadResponse {
        status: "ok",
        filename: state.config().image_url(&filename),
    }))
}

/// POST /uploadfile/product/:id - replace a product image
pub async fn upload_product(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    owned_product(state.store(), &user, id).await?;

    let filename = store_upload(&state, multipart).await?;
    if let Err(e) = state.store().set_product_image(id, &filename).await {
        state.images().remove(&filename).await;
        return Err(e.into());
    }

    tracing::info!("User {} set image of product {} to {}", user.id, id, filename);
    Ok(Json(UploadResponse {
        status: "ok",
        filename: state.config().image_url(&filename),
    }))
}

async fn store_upload(state: &AppState, mut multipart: Multipart) -> Result<String, ApiError> {
    let upload = read_file_field(&mut multipart).await?;
    let validated = state.images().validate(upload)?;
    Ok(state.images().save(validated).await?)
}
