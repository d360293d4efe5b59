// handlers/public/token.rs - POST /token handler

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// OAuth2 password-grant style form body
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /token - exchange username/password for a bearer token
pub async fn token_post(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access_token = state
        .tokens()
        .issue(state.store(), &form.username, &form.password)
        .await?;

    tracing::info!("Issued access token for '{}'", form.username);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens().access_ttl_secs(),
    }))
}
