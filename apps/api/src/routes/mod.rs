pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::brief::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Brief API
        .route("/api/v1/briefs/catalog", get(handlers::handle_catalog))
        .route("/api/v1/briefs/resolve", post(handlers::handle_resolve))
        .route("/api/v1/briefs/interpret", post(handlers::handle_interpret))
        .fallback(not_found)
        .with_state(state)
}
