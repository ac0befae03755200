//! The single path from a node to the LLM.
//!
//! Every node asks for a value of a known [`StructuredOutput`] shape. The
//! gateway builds the [`CompletionRequest`], calls the provider exactly once,
//! and decodes the completion. Transport failures become
//! [`PipelineError::Llm`]; a completion that does not decode or validate
//! becomes [`PipelineError::SchemaMismatch`]. There is no retry here.

use std::sync::Arc;
use std::time::Instant;

use pipeline::{
    decode_structured, ChatMessage, CompletionRequest, LlmProvider, ModelId, PipelineError,
    ResponseFormat, StructuredOutput,
};
use tracing::{debug, warn};

/// Model used when the configuration does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Shared handle to the configured provider and model.
///
/// Cheap to clone; every node holds its own copy.
#[derive(Clone)]
pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
    model: ModelId,
    json_mode: bool,
}

impl std::fmt::Debug for LlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmGateway")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("json_mode", &self.json_mode)
            .finish()
    }
}

impl LlmGateway {
    /// Creates a gateway with JSON mode enabled.
    pub fn new(provider: Arc<dyn LlmProvider>, model: ModelId) -> Self {
        Self {
            provider,
            model,
            json_mode: true,
        }
    }

    /// Turns the provider's JSON response mode on or off. With it off the
    /// model is still told to answer in JSON, but the provider does not
    /// enforce it.
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    /// Model every request is sent to.
    pub fn model(&self) -> &ModelId {
        &self.model
    }

    /// Whether requests ask the provider for a JSON object.
    pub fn json_mode(&self) -> bool {
        self.json_mode
    }

    /// Sends `messages` and decodes the answer as `T`.
    pub async fn invoke_structured<T: StructuredOutput>(
        &self,
        node: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<T, PipelineError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            response_format: if self.json_mode {
                ResponseFormat::JsonObject
            } else {
                ResponseFormat::Text
            },
        };

        let started = Instant::now();
        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|source| PipelineError::Llm {
                node: node.to_string(),
                source,
            })?;

        debug!(
            node,
            provider = self.provider.name(),
            model = %self.model,
            shape = T::SHAPE,
            elapsed_ms = started.elapsed().as_millis() as u64,
            prompt_tokens = response.usage.map(|u| u.prompt_tokens.as_u64()),
            completion_tokens = response.usage.map(|u| u.completion_tokens.as_u64()),
            total_tokens = response.usage.map(|u| u.total().as_u64()),
            "LLM call complete"
        );

        decode_structured::<T>(&response.content).map_err(|err| {
            warn!(
                node,
                shape = T::SHAPE,
                response_len = response.content.len(),
                "LLM response did not match the requested shape"
            );
            PipelineError::SchemaMismatch {
                node: node.to_string(),
                shape: T::SHAPE,
                message: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use pipeline::{AudienceInsights, LlmError, MessageRole};

    use super::*;
    use crate::testing::ScriptedLlmProvider;

    fn gateway(provider: Arc<ScriptedLlmProvider>) -> LlmGateway {
        LlmGateway::new(provider, ModelId::new(DEFAULT_MODEL).unwrap())
    }

    const INSIGHTS: &str = r#"{
        "persona_summary": "Time-poor commuters",
        "pain_points": ["No time for breakfast"],
        "motivations": [],
        "objections": [],
        "preferred_tone": "upbeat"
    }"#;

    #[tokio::test]
    async fn builds_a_json_mode_request_with_the_configured_model() {
        let provider = Arc::new(ScriptedLlmProvider::new().with_reply(INSIGHTS));
        let insights: AudienceInsights = gateway(provider.clone())
            .invoke_structured("test_node", vec![ChatMessage::user("hi")], 0.3)
            .await
            .unwrap();
        assert_eq!(insights.preferred_tone, "upbeat");

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model.as_str(), DEFAULT_MODEL);
        assert_eq!(requests[0].response_format, ResponseFormat::JsonObject);
        assert_eq!(requests[0].temperature, 0.3);
        assert_eq!(requests[0].messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn text_mode_is_honoured() {
        let provider = Arc::new(ScriptedLlmProvider::new().with_reply(INSIGHTS));
        gateway(provider.clone())
            .with_json_mode(false)
            .invoke_structured::<AudienceInsights>("test_node", vec![], 0.0)
            .await
            .unwrap();
        assert_eq!(provider.requests().await[0].response_format, ResponseFormat::Text);
    }

    #[tokio::test]
    async fn transport_failures_keep_their_source() {
        let provider = Arc::new(
            ScriptedLlmProvider::new().with_error(LlmError::Transport("connection reset".into())),
        );
        let err = gateway(provider)
            .invoke_structured::<AudienceInsights>("test_node", vec![], 0.0)
            .await
            .unwrap_err();
        match err {
            PipelineError::Llm { node, source } => {
                assert_eq!(node, "test_node");
                assert_eq!(source, LlmError::Transport("connection reset".into()));
            }
            other => panic!("expected Llm, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_answers_are_schema_mismatches() {
        let provider = Arc::new(ScriptedLlmProvider::new().with_reply("Sure! Here you go."));
        let err = gateway(provider.clone())
            .invoke_structured::<AudienceInsights>("test_node", vec![], 0.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SchemaMismatch { shape: "AudienceInsights", .. }
        ));
        assert_eq!(provider.call_count(), 1);
    }
}
