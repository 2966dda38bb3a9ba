use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::TickerAnalysisView;
use crate::services::session_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/analysis", get(get_selected_analysis))
        .route("/:id/analysis/:ticker", get(get_ticker_analysis))
}

pub async fn get_selected_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TickerAnalysisView>, AppError> {
    info!("GET /api/sessions/{}/analysis - Fetching selected ticker analysis", id);
    let session = state.sessions.get(id)?;
    let mut session = session.lock().await;
    let view = session_service::selected_view(&mut session).await.map_err(|e| {
        error!("Failed to build analysis view for session {}: {}", id, e);
        e
    })?;
    Ok(Json(view))
}

pub async fn get_ticker_analysis(
    State(state): State<AppState>,
    Path((id, ticker)): Path<(Uuid, String)>,
) -> Result<Json<TickerAnalysisView>, AppError> {
    info!("GET /api/sessions/{}/analysis/{} - Fetching ticker analysis", id, ticker);
    let session = state.sessions.get(id)?;
    let mut session = session.lock().await;
    let view = session_service::ticker_view(&mut session, &ticker)
        .await
        .map_err(|e| {
            error!("Failed to build analysis view for {}: {}", ticker, e);
            e
        })?;
    Ok(Json(view))
}
