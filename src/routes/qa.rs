use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ConversationTurn, FollowUpQuestion};
use crate::services::session_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/questions", post(ask_question))
        .route("/:id/conversation", get(get_conversation))
}

/// POST /api/sessions/:id/questions
///
/// Request body: FollowUpQuestion
/// {
///   "query": "How did rate cuts affect tech stocks?"
/// }
///
/// Returns the new ConversationTurn. Non-finance questions get the fixed
/// refusal sentence from the model.
async fn ask_question(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(question): Json<FollowUpQuestion>,
) -> Result<Json<ConversationTurn>, AppError> {
    info!("POST /api/sessions/{}/questions - Question: {}", id, question.query);
    let session = state.sessions.get(id)?;
    let mut session = session.lock().await;

    let turn = session_service::ask_question(
        &mut session,
        &state.news_service,
        state.llm_service.as_ref(),
        &question.query,
    )
    .await
    .map_err(|e| {
        error!("Failed to answer question: {}", e);
        e
    })?;

    info!("Answered question ({} chars)", turn.response.len());
    Ok(Json(turn))
}

async fn get_conversation(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationTurn>>, AppError> {
    info!("GET /api/sessions/{}/conversation - Fetching conversation", id);
    let session = state.sessions.get(id)?;
    let session = session.lock().await;
    Ok(Json(session.conversation().to_vec()))
}
