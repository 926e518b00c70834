//! Unified error taxonomy for the generation layer.

use serde::Serialize;
use thiserror::Error;

use crate::generation::extractor::ExtractError;
use crate::llm_client::TransportError;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Programmer error: no registered task, template or binding for this id.
    #[error("unknown task: {0}")]
    UnknownTask(String),

    /// A required input was absent or blank. Detected before any network call.
    #[error("required field '{field}' is empty")]
    EmptyInput { field: String },

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed completion: {0}")]
    Malformed(#[from] ExtractError),
}

/// The kind of a failure, safe to expose to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTask,
    EmptyInput,
    Transport,
    Timeout,
    Malformed,
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::UnknownTask(_) => ErrorKind::UnknownTask,
            GenerationError::EmptyInput { .. } => ErrorKind::EmptyInput,
            GenerationError::Transport(TransportError::Timeout) => ErrorKind::Timeout,
            GenerationError::Transport(_) => ErrorKind::Transport,
            GenerationError::Malformed(_) => ErrorKind::Malformed,
        }
    }

    /// Message for the end user. Never contains provider text or raw completions.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::UnknownTask(_) => "This tool is not available right now.".to_string(),
            GenerationError::EmptyInput { field } => {
                format!("Please fill in the \"{field}\" field before generating.")
            }
            GenerationError::Transport(TransportError::Timeout) => {
                "The generator took too long to respond. Please try again.".to_string()
            }
            GenerationError::Transport(_) => {
                "We couldn't reach the generator. Please try again.".to_string()
            }
            GenerationError::Malformed(_) => {
                "The generator returned an unexpected answer. Please try again.".to_string()
            }
        }
    }
}
