//! Tool session: the view-model every tool page runs around the facade.
//!
//! States: Idle → Pending → Succeeded | Failed. `reset` returns to Idle from
//! anywhere; `regenerate` goes from Succeeded/Failed back to Pending with the
//! last submitted params.
//!
//! Every submission gets a fresh request id. Only the outcome carrying the
//! id of the current Pending state is applied; anything else is a stale
//! response from a call the page has moved past and is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::generation::error::{ErrorKind, GenerationError};
use crate::generation::extractor::ExtractedResult;
use crate::generation::prompt_builder::{default_params, validate_params, Params};
use crate::generation::tasks::{find_task, TaskSpec};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Pending { request_id: u64 },
    Succeeded { result: ExtractedResult },
    Failed { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a generation is already in progress")]
    Busy,

    #[error("nothing has been generated yet")]
    NothingToRegenerate,

    #[error("'{0}' is not an input of this tool")]
    UnknownParam(String),

    #[error("required field '{field}' is empty")]
    EmptyInput { field: String },
}

/// One in-flight generation: what to run and which request it answers.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub request_id: u64,
    pub task_id: &'static str,
    pub params: Params,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub task_id: &'static str,
    pub state: SessionState,
    pub params: Params,
    pub last_submitted: Option<Params>,
    /// False while Pending: the page must disable its generate control.
    pub controls_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ToolSession {
    id: Uuid,
    task: &'static TaskSpec,
    defaults: Params,
    params: Params,
    last_submitted: Option<Params>,
    state: SessionState,
    latest_request: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ToolSession {
    pub fn new(task_id: &str) -> Result<Self, GenerationError> {
        let task =
            find_task(task_id).ok_or_else(|| GenerationError::UnknownTask(task_id.to_string()))?;
        let defaults = default_params(task.id)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            task,
            params: defaults.clone(),
            defaults,
            last_submitted: None,
            state: SessionState::Idle,
            latest_request: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn controls_enabled(&self) -> bool {
        !matches!(self.state, SessionState::Pending { .. })
    }

    /// Merges input changes. Only the tool's declared inputs are accepted.
    pub fn update_params(&mut self, changes: Params) -> Result<(), SessionError> {
        if let Some(unknown) = changes.keys().find(|k| !self.defaults.contains_key(*k)) {
            return Err(SessionError::UnknownParam(unknown.clone()));
        }
        self.params.extend(changes);
        self.touch();
        Ok(())
    }

    /// Starts a generation with the current inputs.
    ///
    /// Blank required inputs fail here, before any network call, and leave
    /// the session in `Failed(EmptyInput)`.
    pub fn submit(&mut self) -> Result<Ticket, SessionError> {
        if !self.controls_enabled() {
            return Err(SessionError::Busy);
        }

        if let Err(GenerationError::EmptyInput { field }) = validate_params(self.task.id, &self.params)
        {
            let err = GenerationError::EmptyInput {
                field: field.clone(),
            };
            self.fail(&err);
            return Err(SessionError::EmptyInput { field });
        }

        self.last_submitted = Some(self.params.clone());
        Ok(self.begin(self.params.clone()))
    }

    /// Re-runs the last submitted inputs. Edits made since then stay in the
    /// form and go out with the next `submit`.
    pub fn regenerate(&mut self) -> Result<Ticket, SessionError> {
        match self.state {
            SessionState::Pending { .. } => return Err(SessionError::Busy),
            SessionState::Idle => return Err(SessionError::NothingToRegenerate),
            SessionState::Succeeded { .. } | SessionState::Failed { .. } => {}
        }

        let params = self
            .last_submitted
            .clone()
            .ok_or(SessionError::NothingToRegenerate)?;
        Ok(self.begin(params))
    }

    /// Applies a finished generation. Returns false when the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: &Ticket,
        outcome: Result<ExtractedResult, GenerationError>,
    ) -> bool {
        match self.state {
            SessionState::Pending { request_id } if request_id == ticket.request_id => {}
            _ => {
                debug!(
                    "Discarding stale response for session {} (request {}, latest {})",
                    self.id, ticket.request_id, self.latest_request
                );
                return false;
            }
        }

        match outcome {
            Ok(result) => {
                self.state = SessionState::Succeeded { result };
                self.touch();
            }
            Err(err) => self.fail(&err),
        }
        true
    }

    /// Back to Idle with default inputs. Any in-flight call becomes stale.
    pub fn reset(&mut self) {
        self.params = self.defaults.clone();
        self.last_submitted = None;
        self.state = SessionState::Idle;
        self.latest_request += 1;
        self.touch();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            task_id: self.task.id,
            state: self.state.clone(),
            params: self.params.clone(),
            last_submitted: self.last_submitted.clone(),
            controls_enabled: self.controls_enabled(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn begin(&mut self, params: Params) -> Ticket {
        self.latest_request += 1;
        self.state = SessionState::Pending {
            request_id: self.latest_request,
        };
        self.touch();
        Ticket {
            request_id: self.latest_request,
            task_id: self.task.id,
            params,
        }
    }

    fn fail(&mut self, err: &GenerationError) {
        self.state = SessionState::Failed {
            kind: err.kind(),
            message: err.user_message(),
        };
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
