use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::dto::exam_dto::{PauseResponse, ResumeResponse, SubmitAnswerRequest};
use crate::AppState;

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let session = state.session_service.compose(attempt_id).await?;
    Ok(Json(session).into_response())
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> crate::error::Result<Response> {
    let answer = state.answer_service.submit(attempt_id, req).await?;
    Ok((StatusCode::CREATED, Json(answer)).into_response())
}

#[axum::debug_handler]
pub async fn advance(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let next = state.navigation_service.advance(attempt_id).await?;
    Ok(Json(next).into_response())
}

#[axum::debug_handler]
pub async fn pause(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let paused = state.pause_service.pause(attempt_id).await?;
    Ok(Json(PauseResponse {
        success: true,
        pause_count: paused.pause_count,
        pauses_remaining: (state.pause_service.max_pauses() - paused.pause_count).max(0),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn resume(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let resumed = state.attempt_service.resume(attempt_id).await?;
    Ok(Json(ResumeResponse {
        success: true,
        status: resumed.status,
        time_remaining_seconds: resumed.time_remaining_seconds,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn complete(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let completed = state.attempt_service.complete(attempt_id).await?;
    Ok(Json(completed).into_response())
}
