pub mod health;
pub mod index;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::classification::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::health_handler))
        // Classification API
        .route("/api/v1/classify", post(handlers::handle_classify))
        .route("/api/v1/classify/text", post(handlers::handle_classify_text))
        .route("/api/v1/model", get(handlers::handle_model_info))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
