//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::error::GenerationError;
use crate::generation::generator::{Generation, Sampling};
use crate::generation::prompt_builder::{default_params, Params};
use crate::generation::prompts::{template_for, FieldSpec};
use crate::generation::router::resolve_model;
use crate::generation::tasks::{OutputShape, TaskCategory, TASKS};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub params: Params,
    #[serde(flatten)]
    pub sampling: Sampling,
}

#[derive(Debug, Serialize)]
pub struct TaskSummary {
    pub id: &'static str,
    pub category: TaskCategory,
    pub output_shape: OutputShape,
    pub model: &'static str,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
    pub required_params: &'static [&'static str],
    pub default_params: Params,
    pub fields: &'static [FieldSpec],
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/tasks
///
/// Lists every registered task with its routing and input contract.
pub async fn handle_list_tasks() -> Result<Json<Vec<TaskSummary>>, AppError> {
    let summaries = TASKS
        .iter()
        .map(|task| {
            let template = template_for(task.id)
                .ok_or_else(|| GenerationError::UnknownTask(task.id.to_string()))?;
            Ok(TaskSummary {
                id: task.id,
                category: task.category,
                output_shape: task.output_shape,
                model: resolve_model(task.id)?,
                default_temperature: task.default_temperature,
                default_max_tokens: task.default_max_tokens,
                required_params: template.required,
                default_params: default_params(task.id)?,
                fields: template.fields,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(Json(summaries))
}

/// POST /api/v1/generate/:task_id
///
/// One-shot generation. Body: `{"params": {...}, "temperature"?, "max_tokens"?}`.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<Generation>, AppError> {
    let generation = state
        .generator
        .generate_with_meta(&task_id, &request.params, request.sampling)
        .await?;

    Ok(Json(generation))
}
