pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/pipelines/split", post(handlers::handle_split))
        .route(
            "/api/v1/pipelines/duplicate",
            post(handlers::handle_duplicate),
        )
        .route("/api/v1/pipelines/two-step", post(handlers::handle_two_step))
        .route(
            "/api/v1/pipelines/rewrite-combined",
            post(handlers::handle_rewrite_combined),
        )
        .route(
            "/api/v1/pipelines/rewrite-variations",
            post(handlers::handle_rewrite_variations),
        )
        .route(
            "/api/v1/pipelines/rewrite-catchcopy",
            post(handlers::handle_rewrite_catchcopy),
        )
        .with_state(state)
}
