//! Generation Facade: the one call every tool page makes.
//!
//! Flow: task lookup → resolve_model → build_prompt → transport.send →
//!       extract into the task's output shape → conform records to their type.
//!
//! Short-circuits on the first failure. No caching, no de-duplication, no
//! retry: two identical calls are two independent model samples.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::generation::error::GenerationError;
use crate::generation::extractor::{extract, ExtractedResult};
use crate::generation::prompt_builder::{build_prompt, Params};
use crate::generation::records::conform;
use crate::generation::router::resolve_model;
use crate::generation::tasks::find_task;
use crate::llm_client::{ChatTransport, GenerationRequest, Usage};

/// Upper bound accepted for a temperature override.
const MAX_TEMPERATURE: f32 = 2.0;

/// Optional per-call overrides of a task's sampling defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Sampling {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// A generation result plus which task and model produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Generation<T = Value> {
    pub task_id: &'static str,
    pub model: String,
    pub result: ExtractedResult<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Clone)]
pub struct Generator {
    transport: Arc<dyn ChatTransport>,
}

impl Generator {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Runs `task_id` with the task's default sampling and untyped records.
    pub async fn generate(
        &self,
        task_id: &str,
        params: &Params,
    ) -> Result<ExtractedResult, GenerationError> {
        self.generate_as::<Value>(task_id, params).await
    }

    /// Runs `task_id` and deserializes records into `T`.
    pub async fn generate_as<T: DeserializeOwned>(
        &self,
        task_id: &str,
        params: &Params,
    ) -> Result<ExtractedResult<T>, GenerationError> {
        self.generate_with_meta(task_id, params, Sampling::default())
            .await
            .map(|generation| generation.result)
    }

    pub async fn generate_with_meta<T: DeserializeOwned>(
        &self,
        task_id: &str,
        params: &Params,
        sampling: Sampling,
    ) -> Result<Generation<T>, GenerationError> {
        let task =
            find_task(task_id).ok_or_else(|| GenerationError::UnknownTask(task_id.to_string()))?;
        let model_id = resolve_model(task.id)?;
        let messages = build_prompt(task.id, params)?;

        let request = GenerationRequest {
            messages,
            model_id: model_id.to_string(),
            temperature: sampling
                .temperature
                .unwrap_or(task.default_temperature)
                .clamp(0.0, MAX_TEMPERATURE),
            max_tokens: sampling.max_tokens.unwrap_or(task.default_max_tokens),
        };

        debug!("Generating task={} model={}", task.id, model_id);

        let completion = self.transport.send(&request).await.map_err(|e| {
            warn!(
                "Generation transport failure: task={} model={} status={:?} error={}",
                task.id,
                model_id,
                e.status(),
                e
            );
            GenerationError::from(e)
        })?;

        match completion.usage {
            Some(usage) => info!(
                "Generated task={} model={} prompt_tokens={} completion_tokens={}",
                task.id, model_id, usage.prompt_tokens, usage.completion_tokens
            ),
            None => info!("Generated task={} model={} (no usage reported)", task.id, model_id),
        }

        let result = extract::<Value>(&completion.content, task.output_shape)
            .and_then(|extracted| conform::<T>(task.id, extracted, &completion.content))
            .map_err(|e| {
                warn!(
                    "Generation extraction failure: task={} model={} error={} raw={:?}",
                    task.id,
                    model_id,
                    e,
                    e.raw_snippet()
                );
                GenerationError::from(e)
            })?;

        Ok(Generation {
            task_id: task.id,
            model: completion.model.unwrap_or_else(|| model_id.to_string()),
            result,
            usage: completion.usage,
        })
    }
}
