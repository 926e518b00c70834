//! Scripted `ChatTransport` for tests. Never touches the network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{ChatTransport, GenerationRequest, RawCompletion, TransportError, Usage};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(&'static str),
    Status(u16, &'static str),
    Timeout,
}

impl Reply {
    /// Usage is reported as one prompt token per message and one
    /// completion token per byte of reply.
    fn into_result(self, request: &GenerationRequest) -> Result<RawCompletion, TransportError> {
        match self {
            Reply::Text(text) => Ok(RawCompletion {
                content: text.to_string(),
                model: Some(request.model_id.clone()),
                usage: Some(Usage {
                    prompt_tokens: request.messages.len() as u32,
                    completion_tokens: text.len() as u32,
                }),
            }),
            Reply::Status(status, message) => Err(TransportError::Status {
                status,
                message: message.to_string(),
            }),
            Reply::Timeout => Err(TransportError::Timeout),
        }
    }
}

/// Answers each call with the next scripted reply; the last one repeats.
pub struct StubTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: Reply) -> Self {
        Self::new([reply])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn send(&self, request: &GenerationRequest) -> Result<RawCompletion, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        };
        reply
            .unwrap_or(Reply::Status(500, "no scripted reply"))
            .into_result(request)
    }
}
