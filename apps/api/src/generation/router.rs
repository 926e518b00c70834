//! Model Router: task id → backing model id.
//!
//! Each provider model has its own rate allowance, so categories are spread
//! over several models. This table is the only place a model string appears.

use serde::Serialize;

use crate::generation::error::GenerationError;
use crate::generation::tasks::{find_task, TaskCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelBinding {
    pub category: TaskCategory,
    pub model_id: &'static str,
}

pub static MODEL_BINDINGS: &[ModelBinding] = &[
    ModelBinding {
        category: TaskCategory::CreativeNames,
        model_id: "llama-3.3-70b-versatile",
    },
    ModelBinding {
        category: TaskCategory::Creative,
        model_id: "llama3-70b-8192",
    },
    ModelBinding {
        category: TaskCategory::Marketing,
        model_id: "llama-3.3-70b-versatile",
    },
    ModelBinding {
        category: TaskCategory::Analysis,
        model_id: "mixtral-8x7b-32768",
    },
    ModelBinding {
        category: TaskCategory::Summarize,
        model_id: "llama-3.1-8b-instant",
    },
    ModelBinding {
        category: TaskCategory::Paragraph,
        model_id: "llama-3.1-8b-instant",
    },
    ModelBinding {
        category: TaskCategory::Translate,
        model_id: "gemma2-9b-it",
    },
];

fn model_for_category(category: TaskCategory) -> Option<&'static str> {
    MODEL_BINDINGS
        .iter()
        .find(|b| b.category == category)
        .map(|b| b.model_id)
}

/// Resolves the model for a registered task. Pure lookup over static tables.
///
/// An unknown id, or a category with no binding, is `UnknownTask`; there is
/// no fallback model.
pub fn resolve_model(task_id: &str) -> Result<&'static str, GenerationError> {
    find_task(task_id)
        .and_then(|task| model_for_category(task.category))
        .ok_or_else(|| GenerationError::UnknownTask(task_id.to_string()))
}
