use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod poll;
pub mod state;

pub use poll::PollConfig;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/generate", post(handlers::generate))
        .route("/api/runs", post(handlers::create_run))
        .route("/api/runs/:id", get(handlers::run_status))
        .route("/api/runs/:id/result", get(handlers::run_result))
        .layer(cors)
        .with_state(Arc::new(state))
}
