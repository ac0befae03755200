//! Port trait for the hosted LLM capability.
//!
//! The pipeline treats the LLM as an opaque request/response service: a list
//! of role-tagged messages goes in, a completion comes out. Infrastructure
//! crates (see the `llm` crate) supply implementations; the domain never sees
//! HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::LlmError;
use crate::identifiers::ModelId;
use crate::types::TokenCount;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Output mode requested from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free text.
    #[default]
    Text,
    /// The provider's JSON mode: the completion is guaranteed to be a JSON object.
    JsonObject,
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: ModelId,
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: TokenCount,
    pub completion_tokens: TokenCount,
}

impl TokenUsage {
    /// Prompt plus completion tokens.
    pub fn total(self) -> TokenCount {
        self.prompt_tokens + self.completion_tokens
    }
}

/// The provider's answer to a [`CompletionRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Raw completion text (JSON when [`ResponseFormat::JsonObject`] was requested).
    pub content: String,
    /// Usage figures, when the provider reports them.
    pub usage: Option<TokenUsage>,
}

/// A hosted LLM completion capability.
///
/// Implementations issue exactly one request per call and do not retry;
/// timeouts are the implementation's own concern.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name for logs (e.g. `"openai"`).
    fn name(&self) -> &str;

    /// Sends one completion request.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
