// handlers/public/verify.rs - GET /email-verify handler

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::auth::TokenPurpose;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "verification.html")]
struct VerificationPage<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// GET /email-verify?token= - confirm the address behind a verification token.
/// Repeating the request is harmless and renders the same page.
pub async fn email_verify_get(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Html<String>, ApiError> {
    let user = state
        .tokens()
        .verify_for(state.store(), &query.token, TokenPurpose::EmailVerification)
        .await?;

    if state.store().mark_user_verified(user.id).await? {
        tracing::info!("Verified email for user {} ({})", user.id, user.username);
    }

    let page = VerificationPage {
        username: &user.username,
    }
    .render()?;
    Ok(Html(page))
}
