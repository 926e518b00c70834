/// LLM Client: the single point of entry for all chat-completion calls in Toolsmith.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// Generation code talks to a `ChatTransport`; `HttpTransport` is the only
/// implementation that touches the network.
///
/// One request per call. No retries, no backoff: the page decides whether to
/// regenerate.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// Default endpoint: any OpenAI-compatible chat-completions URL works.
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("could not decode provider response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl TransportError {
    /// HTTP status of the failure, `None` when the provider was never reached.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err)
        } else {
            TransportError::Network(err)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Ordered messages for one call. Built fresh per call, never persisted.
pub type PromptMessages = Vec<ChatMessage>;

/// Everything the transport needs for a single chat completion.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub messages: PromptMessages,
    #[serde(rename = "model")]
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The provider's unparsed answer plus what it reported about the call.
#[derive(Debug, Clone)]
pub struct RawCompletion {
    pub content: String,
    pub model: Option<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionResponse {
    /// Reads `choices[0].message.content`; an absent choice yields empty text.
    fn into_completion(self) -> RawCompletion {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        RawCompletion {
            content,
            model: self.model,
            usage: self.usage,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Pulls the human-readable message out of an error body, falling back to the body itself.
fn provider_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Sends one fully-formed request to a chat-completion provider.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &GenerationRequest) -> Result<RawCompletion, TransportError>;
}

/// Bearer-authenticated HTTP transport for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &GenerationRequest) -> Result<RawCompletion, TransportError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM provider returned {}: {}", status, body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: provider_message(body),
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(TransportError::from_reqwest)?;

        debug!("LLM call succeeded: model={}", request.model_id);
        Ok(completion.into_completion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    const TEST_KEY: &str = "sk-test";

    fn request() -> GenerationRequest {
        GenerationRequest {
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            model_id: "llama-3.1-8b-instant".to_string(),
            temperature: 0.5,
            max_tokens: 64,
        }
    }

    /// Serves `router` on an ephemeral local port; returns the endpoint URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn transport(url: String, key: &str) -> HttpTransport {
        HttpTransport::new(url, key, Duration::from_secs(5)).unwrap()
    }

    /// Chat-completions endpoint that checks the bearer key and echoes the
    /// request back in the completion.
    async fn chat_completions(headers: HeaderMap, Json(body): Json<Value>) -> Response {
        let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if auth != Some("Bearer sk-test") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Invalid API Key", "type": "invalid_request_error"}})),
            )
                .into_response();
        }

        let summary = format!(
            "{} messages, last: {}, max_tokens: {}",
            body["messages"].as_array().map_or(0, Vec::len),
            body["messages"][1]["content"].as_str().unwrap_or_default(),
            body["max_tokens"]
        );
        Json(json!({
            "model": body["model"],
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": summary}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"prompt_tokens": 9, "completion_tokens": 4, "total_tokens": 13}
        }))
        .into_response()
    }

    #[tokio::test]
    async fn test_http_send_reads_first_choice() {
        let url = serve(Router::new().route("/v1/chat/completions", post(chat_completions))).await;

        let completion = transport(url, TEST_KEY).send(&request()).await.unwrap();

        assert_eq!(completion.content, "2 messages, last: hi, max_tokens: 64");
        assert_eq!(completion.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(
            completion.usage,
            Some(Usage {
                prompt_tokens: 9,
                completion_tokens: 4
            })
        );
    }

    #[tokio::test]
    async fn test_http_send_without_valid_key_is_status_error() {
        let url = serve(Router::new().route("/v1/chat/completions", post(chat_completions))).await;

        let err = transport(url, "sk-wrong").send(&request()).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(matches!(err, TransportError::Status { ref message, .. } if message == "Invalid API Key"));
    }

    #[tokio::test]
    async fn test_http_rate_limit_carries_provider_message() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "Rate limit reached for model", "type": "tokens"}})),
                )
            }),
        );
        let url = serve(router).await;

        let err = transport(url, TEST_KEY).send(&request()).await.unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert!(
            matches!(err, TransportError::Status { ref message, .. } if message == "Rate limit reached for model")
        );
    }

    #[tokio::test]
    async fn test_http_plain_error_body_is_kept_verbatim() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
        );
        let url = serve(router).await;

        let err = transport(url, TEST_KEY).send(&request()).await.unwrap_err();

        assert!(matches!(err, TransportError::Status { status: 502, ref message } if message == "upstream unavailable"));
    }

    #[tokio::test]
    async fn test_http_undecodable_success_body_is_decode_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { "<html>maintenance</html>" }),
        );
        let url = serve(router).await;

        let err = transport(url, TEST_KEY).send(&request()).await.unwrap_err();

        assert!(matches!(err, TransportError::Decode(_)), "got {err:?}");
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_http_slow_provider_times_out() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        );
        let url = serve(router).await;
        let transport = HttpTransport::new(url, TEST_KEY, Duration::from_millis(100)).unwrap();

        let err = transport.send(&request()).await.unwrap_err();

        assert!(matches!(err, TransportError::Timeout), "got {err:?}");
    }

    #[tokio::test]
    async fn test_http_refused_connection_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport(format!("http://{addr}/v1/chat/completions"), TEST_KEY)
            .send(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Network(_)), "got {err:?}");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_request_serializes_to_chat_completion_body() {
        let body = serde_json::to_value(request()).unwrap();
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!(body.get("model_id").is_none());
    }

    #[test]
    fn test_completion_reads_first_choice_content() {
        let json = r#"{
            "model": "llama-3.1-8b-instant",
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        let completion = parsed.into_completion();
        assert_eq!(completion.content, "first");
        assert_eq!(completion.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(completion.usage.unwrap().completion_tokens, 3);
    }

    #[test]
    fn test_completion_without_choices_is_empty_text() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(parsed.into_completion().content, "");
    }

    #[test]
    fn test_provider_message_prefers_error_body() {
        let body = r#"{"error": {"message": "Rate limit reached", "type": "tokens"}}"#;
        assert_eq!(provider_message(body.to_string()), "Rate limit reached");
        assert_eq!(provider_message("gateway down".to_string()), "gateway down");
    }

    #[test]
    fn test_status_is_none_for_unreached_provider() {
        assert_eq!(TransportError::Timeout.status(), None);
        let err = TransportError::Status {
            status: 429,
            message: "slow down".to_string(),
        };
        assert_eq!(err.status(), Some(429));
    }
}
