//! HTTP surface: webhook, enrollment form, health check.

pub mod form;
pub mod signature;
pub mod webhook;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Build the service router.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/webhook", get(webhook::verify).post(webhook::receive))
        .route("/form/inscripciones", post(form::submit))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "edubot",
    }))
}
