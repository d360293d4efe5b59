// handlers/protected/products.rs - product writes for the caller's business

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::database::models::{Product, ProductInput};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::catalog::draft_product;
use crate::services::ownership::owned_product;
use crate::state::AppState;

/// POST /products - add a product to the caller's business
pub async fn product_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Product> {
    let draft = draft_product(input)?;
    let business = state.store().business_by_owner(user.id).await?;

    let product = state.store().create_product(business.id, draft).await?;
    tracing::info!("User {} created product {} in business {}", user.id, product.id, business.id);
    Ok(ApiResponse::created(product))
}

/// PUT /product/:id - full replace; the discount and publish date are recomputed
pub async fn product_put(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Product> {
    owned_product(state.store(), &user, id).await?;
    let draft = draft_product(input)?;

    let product = state.store().update_product(id, draft).await?;
    tracing::info!("User {} updated product {}", user.id, id);
    Ok(ApiResponse::success(product))
}

/// DELETE /products/:id
pub async fn product_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let (product, _) = owned_product(state.store(), &user, id).await?;
    state.store().delete_product(id).await?;

    tracing::info!("User {} deleted product {}", user.id, id);
    Ok(ApiResponse::success(json!({ "id": product.id, "deleted": true })))
}
