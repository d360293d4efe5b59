// handlers/protected/business.rs - PUT /business/:id

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::database::models::{Business, BusinessUpdate};
use crate::error::ApiError;
use crate::handlers::public::validation::business_field_errors;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::ownership::owned_business;
use crate::state::AppState;

/// Replace the editable profile fields of a business the caller owns
pub async fn business_put(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(update): Json<BusinessUpdate>,
) -> ApiResult<Business> {
    owned_business(state.store(), &user, id).await?;

    let field_errors = business_field_errors(&update.business_name, &update.city, &update.region);
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid business details", Some(field_errors)));
    }

    let business = state.store().update_business(id, update).await?;
    tracing::info!("User {} updated business {}", user.id, business.id);
    Ok(ApiResponse::success(business))
}
