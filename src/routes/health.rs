use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    active_sessions: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    info!("GET /health - Health check");
    Json(HealthStatus {
        status: "ok",
        active_sessions: state.sessions.len(),
    })
}
