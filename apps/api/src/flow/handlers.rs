//! Axum route handlers for the screening session API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::flow::controller::Event;
use crate::flow::view::PageView;
use crate::intake::validation::IntakeForm;
use crate::responses::collector::AnswerSubmission;
use crate::session::store::SharedSession;
use crate::state::AppState;

async fn load(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found or expired")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<PageView>), AppError> {
    let (_, session) = state.sessions.create().await;
    let mut session = session.lock().await;
    let page = state.flow.render(&mut session).await;
    Ok((StatusCode::CREATED, Json(page)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_render(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PageView>, AppError> {
    let session = load(&state, id).await?;
    let mut session = session.lock().await;
    Ok(Json(state.flow.render(&mut session).await))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found or expired")))
    }
}

/// POST /api/v1/sessions/:id/candidate
pub async fn handle_submit_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<IntakeForm>,
) -> Result<Json<PageView>, AppError> {
    let session = load(&state, id).await?;
    let mut session = session.lock().await;
    let page = state.flow.handle(&mut session, Event::from_form(form)).await?;
    Ok(Json(page))
}

/// PUT /api/v1/sessions/:id/answers/draft
pub async fn handle_save_drafts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(submission): Json<AnswerSubmission>,
) -> Result<Json<PageView>, AppError> {
    let session = load(&state, id).await?;
    let mut session = session.lock().await;
    let page = state
        .flow
        .handle(&mut session, Event::DraftsSaved(submission))
        .await?;
    Ok(Json(page))
}

/// POST /api/v1/sessions/:id/answers
pub async fn handle_submit_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(submission): Json<AnswerSubmission>,
) -> Result<Json<PageView>, AppError> {
    let session = load(&state, id).await?;
    let mut session = session.lock().await;
    let page = state
        .flow
        .handle(&mut session, Event::AnswersSubmitted(submission))
        .await?;
    Ok(Json(page))
}
