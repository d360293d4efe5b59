// handlers/public/system.rs - service info and health

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service name, version and route overview
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "status": "ok",
        "data": {
            "name": "Shopfront API",
            "version": version,
            "endpoints": {
                "auth": "/token, /registration, /email-verify (public)",
                "products": "/product, /product/:id (public)",
                "profile": "/user/me (protected)",
                "business": "/business/:id (protected)",
                "manage": "/products, /product/:id, /products/:id (protected)",
                "upload": "/uploadfile/profile, /uploadfile/product/:id (protected)",
                "images": "/static/images/:filename (public)",
            }
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store().health_check().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("database unavailable")
    })?;

    Ok(Json(json!({
        "status": "ok",
        "data": {
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }
    })))
}
