pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::state::AppState;

// Room for multipart boundaries and headers around the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the full router for the given state
pub fn app(state: AppState) -> Router {
    let upload_dir = state.images().dir().to_path_buf();

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .nest_service("/static/images", ServeDir::new(upload_dir))
        .layer(cors_layer(&state.config().security.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/token", post(public::token_post))
        .route("/registration", post(public::registration_post))
        .route("/email-verify", get(public::email_verify_get))
        .route("/product", get(public::product_list))
        .route("/product/:id", get(public::product_get))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected;

    let body_limit = state.config().server.max_upload_bytes + MULTIPART_OVERHEAD;

    let uploads = Router::new()
        .route("/uploadfile/profile", post(protected::upload_profile))
        .route("/uploadfile/product/:id", post(protected::upload_product))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/user/me", post(protected::user_me))
        .route("/business/:id", put(protected::business_put))
        .route("/products", post(protected::product_post))
        .route("/product/:id", put(protected::product_put))
        .route("/products/:id", delete(protected::product_delete))
        .merge(uploads)
        .route_layer(from_fn_with_state(state, middleware::require_user))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
