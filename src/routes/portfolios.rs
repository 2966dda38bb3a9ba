use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AnalysisPassSummary, PortfolioView, SelectTicker};
use crate::services::session_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/portfolio", post(upload_portfolio).get(get_portfolio))
        .route("/:id/selected", put(select_ticker))
}

/// POST /api/sessions/:id/portfolio
///
/// Body is the raw CSV export. Replaces the session's portfolio and runs
/// the analysis pass before responding.
pub async fn upload_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: String,
) -> Result<Json<AnalysisPassSummary>, AppError> {
    info!("POST /api/sessions/{}/portfolio - Uploading portfolio ({} bytes)", id, body.len());
    let session = state.sessions.get(id)?;
    let mut session = session.lock().await;

    let summary = session_service::upload_portfolio(
        &mut session,
        &body,
        &state.news_service,
        state.llm_service.as_ref(),
    )
    .await
    .map_err(|e| {
        error!("Failed to upload portfolio for session {}: {}", id, e);
        e
    })?;

    info!(
        "Analyzed {} tickers for session {} ({} with errors)",
        summary.tickers.len(),
        id,
        summary.failed_tickers.len()
    );
    Ok(Json(summary))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PortfolioView>, AppError> {
    info!("GET /api/sessions/{}/portfolio - Fetching portfolio", id);
    let session = state.sessions.get(id)?;
    let session = session.lock().await;
    Ok(Json(session.portfolio_view()?))
}

pub async fn select_ticker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<SelectTicker>,
) -> Result<Json<PortfolioView>, AppError> {
    info!("PUT /api/sessions/{}/selected - Selecting {}", id, data.ticker);
    let session = state.sessions.get(id)?;
    let mut session = session.lock().await;
    session.select(&data.ticker).map_err(|e| {
        error!("Failed to select {} in session {}: {}", data.ticker, id, e);
        e
    })?;
    Ok(Json(session.portfolio_view()?))
}
