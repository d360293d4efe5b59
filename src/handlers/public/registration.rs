// handlers/public/registration.rs - POST /registration handler

use axum::{extract::State, Json};
use serde::Deserialize;
use url::Url;

use super::validation::registration_field_errors;
use crate::auth::TokenPurpose;
use crate::database::models::{NewUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::email::OutgoingEmail;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// POST /registration - create an account and its business, then send the
/// verification email.
pub async fn registration_post(
    State(state): State<AppState>,
    Json(payload): Json<RegistrationRequest>,
) -> ApiResult<String> {
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_ascii_lowercase();

    let field_errors = registration_field_errors(&username, &email, &payload.password);
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid registration details", Some(field_errors)));
    }

    let password_hash = state.hasher().hash_blocking(payload.password).await?;

    let (user, business) = state
        .store()
        .create_user_with_business(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(
        "Registered user {} ({}) with business {}",
        user.id,
        user.username,
        business.id
    );

    // The account exists at this point; a delivery failure is logged, not returned
    if let Err(e) = send_verification_email(&state, &user).await {
        tracing::error!("Failed to send verification email to user {}: {}", user.id, e);
    }

    Ok(ApiResponse::success(format!(
        "Hello {}, thanks for choosing our services. Please check your email inbox and click on the link to confirm your email",
        user.username
    )))
}

async fn send_verification_email(state: &AppState, user: &User) -> Result<(), ApiError> {
    let token = state.tokens().encode(user, TokenPurpose::EmailVerification)?;
    let link = verification_link(&state.config().server.public_base_url, &token)?;

    let email = OutgoingEmail::verification(
        &user.email,
        &user.username,
        link.as_str(),
        state.config().security.verification_expiry_hours,
    )
    .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    state
        .mailer()
        .send(email)
        .await
        .map_err(|e| ApiError::internal_server_error(e.to_string()))
}

/// `<base>/email-verify?token=<token>`, keeping any path prefix on the base
pub fn verification_link(base_url: &str, token: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ApiError::internal_server_error(format!("invalid public base url: {}", e)))?;

    let path = format!("{}/email-verify", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut().clear().append_pair("token", token);
    Ok(url)
}
