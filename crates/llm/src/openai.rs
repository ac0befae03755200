//! OpenAI-compatible chat-completions provider.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, MessageRole, ResponseFormat,
    TokenCount, TokenUsage,
};
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Public OpenAI API root. `/chat/completions` is appended.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest slice of an error body carried into [`LlmError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Connection settings for [`OpenAiProvider`].
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Whole-request timeout, connect through body.
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Chat-completions client. One HTTP request per [`LlmProvider::complete`] call.
#[derive(Debug)]
pub struct OpenAiProvider {
    http: Client,
    config: OpenAiConfig,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("HTTP client: {e}")))?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.config.timeout)
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = build_request(&request);
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers().get(RETRY_AFTER));
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let err = map_status(status, retry_after, &text);
            warn!(status = status.as_u16(), error = %err, "Chat completion rejected");
            return Err(err);
        }

        parse_response(&text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OaiMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OaiResponseFormat>,
}

#[derive(Serialize)]
struct OaiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OaiResponseFormat {
    r#type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn role_name(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

fn build_request(request: &CompletionRequest) -> ChatRequest<'_> {
    ChatRequest {
        model: request.model.as_str(),
        messages: request
            .messages
            .iter()
            .map(|m| OaiMessage {
                role: role_name(m.role),
                content: &m.content,
            })
            .collect(),
        temperature: request.temperature,
        response_format: match request.response_format {
            ResponseFormat::JsonObject => Some(OaiResponseFormat {
                r#type: "json_object",
            }),
            ResponseFormat::Text => None,
        },
    }
}

fn parse_response(body: &str) -> Result<CompletionResponse, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::MalformedResponse(format!("invalid JSON envelope: {e}")))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedResponse("response has no choices".to_string()))?
        .message
        .content
        .ok_or_else(|| LlmError::MalformedResponse("first choice has no content".to_string()))?;

    Ok(CompletionResponse {
        content,
        usage: parsed.usage.map(|u| TokenUsage {
            prompt_tokens: TokenCount::new(u.prompt_tokens),
            completion_tokens: TokenCount::new(u.completion_tokens),
        }),
    })
}

fn map_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> LlmError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { retry_after },
        _ => LlmError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// `error.message` from an OpenAI error envelope, or the start of the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}

/// Only the delay-seconds form of `Retry-After` is understood.
fn parse_retry_after(value: Option<&HeaderValue>) -> Option<Duration> {
    let secs: u64 = value?.to_str().ok()?.trim().parse().ok()?;
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use pipeline::{ChatMessage, ModelId};

    use super::*;

    fn request(format: ResponseFormat) -> CompletionRequest {
        CompletionRequest {
            model: ModelId::new("gpt-4o").unwrap(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hello")],
            temperature: 0.7,
            response_format: format,
        }
    }

    #[test]
    fn json_mode_sets_response_format() {
        let req = request(ResponseFormat::JsonObject);
        let value = serde_json::to_value(build_request(&req)).unwrap();
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    #[test]
    fn text_mode_omits_response_format() {
        let req = request(ResponseFormat::Text);
        let value = serde_json::to_value(build_request(&req)).unwrap();
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn parses_content_and_usage() {
        let body = r#"{
            "choices": [{ "message": { "role": "assistant", "content": "{\"ok\":true}" } }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150 }
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.content, "{\"ok\":true}");
        assert_eq!(response.usage.unwrap().total().as_u64(), 150);
    }

    #[test]
    fn empty_choices_are_malformed() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn null_content_is_malformed() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert!(matches!(
            parse_response(body),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            parse_response("<html>bad gateway</html>"),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn auth_failures_carry_the_provider_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(
            map_status(StatusCode::UNAUTHORIZED, None, body),
            LlmError::Authentication("Incorrect API key provided".into())
        );
    }

    #[test]
    fn throttling_keeps_retry_after() {
        let err = map_status(
            StatusCode::TOO_MANY_REQUESTS,
            Some(Duration::from_secs(12)),
            "",
        );
        assert_eq!(
            err,
            LlmError::RateLimited {
                retry_after: Some(Duration::from_secs(12))
            }
        );
    }

    #[test]
    fn other_statuses_are_api_errors_with_raw_body() {
        match map_status(StatusCode::BAD_GATEWAY, None, "  upstream down  ") {
            LlmError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn retry_after_accepts_seconds_only() {
        assert_eq!(
            parse_retry_after(Some(&HeaderValue::from_static("7"))),
            Some(Duration::from_secs(7))
        );
        assert_eq!(
            parse_retry_after(Some(&HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"))),
            None
        );
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn config_debug_redacts_the_key() {
        let config = OpenAiConfig::new("sk-secret-value");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn empty_key_is_a_configuration_error() {
        assert!(matches!(
            OpenAiProvider::new(OpenAiConfig::new("  ")),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let provider =
            OpenAiProvider::new(OpenAiConfig::new("sk-test").with_base_url("http://localhost:8080/v1/"))
                .unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let provider = OpenAiProvider::new(
            OpenAiConfig::new("sk-test")
                .with_base_url(format!("http://127.0.0.1:{port}/v1"))
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        let err = provider
            .complete(request(ResponseFormat::JsonObject))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)), "got {err:?}");
    }
}
