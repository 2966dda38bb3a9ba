use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::SessionCreated;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", delete(end_session))
}

pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreated>) {
    info!("POST /api/sessions - Starting new session");
    let (id, created_at) = state.sessions.create();
    (StatusCode::CREATED, Json(SessionCreated { id, created_at }))
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /api/sessions/{} - Ending session", id);
    state.sessions.remove(id).map_err(|e| {
        error!("Failed to end session {}: {}", id, e);
        e
    })?;
    Ok(StatusCode::NO_CONTENT)
}
