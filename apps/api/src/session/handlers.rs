//! Axum route handlers for the Session API.
//!
//! Submit and regenerate answer 202 with the Pending snapshot and run the
//! generation in the background; clients poll GET for the outcome.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::prompt_builder::Params;
use crate::session::view_model::{SessionError, SessionSnapshot, Ticket, ToolSession};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub task_id: String,
    #[serde(default)]
    pub params: Params,
}

#[derive(Debug, Deserialize)]
pub struct UpdateParamsRequest {
    pub params: Params,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let created = state.sessions.create(&request.task_id).await?;

    if request.params.is_empty() {
        return Ok((StatusCode::CREATED, Json(created)));
    }

    let snapshot = mutate(&state, created.id, |session| {
        session.update_params(request.params)?;
        Ok(session.snapshot())
    })
    .await;

    if snapshot.is_err() {
        state.sessions.remove(created.id).await;
    }
    Ok((StatusCode::CREATED, Json(snapshot?)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .snapshot(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// PUT /api/v1/sessions/:id/params
pub async fn handle_update_params(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateParamsRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = mutate(&state, id, |session| {
        session.update_params(request.params)?;
        Ok(session.snapshot())
    })
    .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    start(state, id, ToolSession::submit).await
}

/// POST /api/v1/sessions/:id/regenerate
pub async fn handle_regenerate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    start(state, id, ToolSession::regenerate).await
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = mutate(&state, id, |session| {
        session.reset();
        Ok(session.snapshot())
    })
    .await?;
    Ok(Json(snapshot))
}

/// Issues a ticket through `transition` and runs it in the background.
async fn start(
    state: AppState,
    id: Uuid,
    transition: fn(&mut ToolSession) -> Result<Ticket, SessionError>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let (ticket, snapshot) = mutate(&state, id, |session| {
        let ticket = transition(session)?;
        Ok((ticket, session.snapshot()))
    })
    .await?;

    let AppState {
        generator,
        sessions,
    } = state;
    tokio::spawn(async move {
        sessions.run(&generator, id, ticket).await;
    });

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

async fn mutate<R>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut ToolSession) -> Result<R, SessionError>,
) -> Result<R, AppError> {
    state
        .sessions
        .with_session(id, f)
        .await
        .ok_or_else(|| not_found(id))?
        .map_err(AppError::from)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
