// handlers/protected/profile.rs - POST /user/me

use axum::{extract::State, Extension};
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub verified: bool,
    pub joined_date: String,
    pub logo: String,
}

/// POST /user/me - profile of the authenticated user
///
/// Expected Output:
/// ```json
/// {
///   "status": "ok",
///   "data": {
///     "username": "alice",
///     "email": "alice@example.com",
///     "verified": false,
///     "joined_date": "06-01-2024",
///     "logo": "http://localhost:8000/static/images/default.jpg"
///   }
/// }
/// ```
pub async fn user_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Profile> {
    let business = state.store().business_by_owner(user.id).await?;

    Ok(ApiResponse::success(Profile {
        joined_date: user.join_date.format("%m-%d-%Y").to_string(),
        logo: state.config().image_url(&business.logo),
        username: user.username,
        email: user.email,
        verified: user.is_verified,
    }))
}
