//! Task registry: one `TaskSpec` per generation feature.
//!
//! The table is static: adding or re-tuning a task means editing this file and
//! redeploying. Prompt templates (generation::prompts) and model bindings
//! (generation::router) are keyed by the same ids.

use serde::Serialize;

/// Structural type a task's completion must be extracted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    Text,
    JsonArray,
    JsonObject,
}

/// Coarse task grouping. Each category is bound to one backing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    CreativeNames,
    Creative,
    Marketing,
    Analysis,
    Summarize,
    Paragraph,
    Translate,
}

#[cfg(test)]
impl TaskCategory {
    pub const ALL: [TaskCategory; 7] = [
        TaskCategory::CreativeNames,
        TaskCategory::Creative,
        TaskCategory::Marketing,
        TaskCategory::Analysis,
        TaskCategory::Summarize,
        TaskCategory::Paragraph,
        TaskCategory::Translate,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskSpec {
    pub id: &'static str,
    pub category: TaskCategory,
    pub output_shape: OutputShape,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
}

pub const BUSINESS_NAMES: &str = "businessNames";
pub const SLOGANS: &str = "slogans";
pub const AD_COPY: &str = "adCopy";
pub const SEO_KEYWORDS: &str = "seoKeywords";
pub const MEME_CONCEPTS: &str = "memeConcepts";
pub const PRODUCT_DESCRIPTION: &str = "productDescription";
pub const SUMMARIZE: &str = "summarize";
pub const PARAGRAPH: &str = "paragraph";
pub const TRANSLATE: &str = "translate";

pub static TASKS: &[TaskSpec] = &[
    TaskSpec {
        id: BUSINESS_NAMES,
        category: TaskCategory::CreativeNames,
        output_shape: OutputShape::JsonArray,
        default_temperature: 0.9,
        default_max_tokens: 1024,
    },
    TaskSpec {
        id: SLOGANS,
        category: TaskCategory::CreativeNames,
        output_shape: OutputShape::JsonArray,
        default_temperature: 0.9,
        default_max_tokens: 800,
    },
    TaskSpec {
        id: AD_COPY,
        category: TaskCategory::Marketing,
        output_shape: OutputShape::JsonArray,
        default_temperature: 0.8,
        default_max_tokens: 1200,
    },
    TaskSpec {
        id: SEO_KEYWORDS,
        category: TaskCategory::Analysis,
        output_shape: OutputShape::JsonArray,
        default_temperature: 0.4,
        default_max_tokens: 1500,
    },
    TaskSpec {
        id: MEME_CONCEPTS,
        category: TaskCategory::Creative,
        output_shape: OutputShape::JsonArray,
        default_temperature: 1.0,
        default_max_tokens: 1000,
    },
    TaskSpec {
        id: PRODUCT_DESCRIPTION,
        category: TaskCategory::Marketing,
        output_shape: OutputShape::JsonObject,
        default_temperature: 0.7,
        default_max_tokens: 900,
    },
    TaskSpec {
        id: SUMMARIZE,
        category: TaskCategory::Summarize,
        output_shape: OutputShape::Text,
        default_temperature: 0.3,
        default_max_tokens: 600,
    },
    TaskSpec {
        id: PARAGRAPH,
        category: TaskCategory::Paragraph,
        output_shape: OutputShape::Text,
        default_temperature: 0.7,
        default_max_tokens: 800,
    },
    TaskSpec {
        id: TRANSLATE,
        category: TaskCategory::Translate,
        output_shape: OutputShape::Text,
        default_temperature: 0.2,
        default_max_tokens: 1000,
    },
];

/// Looks up a registered task by its stable id.
pub fn find_task(task_id: &str) -> Option<&'static TaskSpec> {
    TASKS.iter().find(|t| t.id == task_id)
}
