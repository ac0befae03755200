//! Variation-Generation: approved draft → three A/B-test variants.
//!
//! The precondition is checked before any request is built. On success only
//! `final_scripts_variants` changes; every other field is carried over.

use async_trait::async_trait;
use pipeline::node_ids::VARIATION_GENERATION;
use pipeline::{AgentState, FinalScriptVariants, Node, PipelineError, StructuredOutput};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::{log_failure, prompts};

/// Produces three A/B variants of an approved draft.
pub struct VariationGenerationNode {
    gateway: LlmGateway,
}

impl VariationGenerationNode {
    /// Sampling temperature for this node's request.
    pub const TEMPERATURE: f32 = 0.7;

    /// Creates the Variation-Generation node on `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    async fn execute(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        let messages = prompts::variation_generation_messages(&state)?;
        let variants: FinalScriptVariants = self
            .gateway
            .invoke_structured(VARIATION_GENERATION, messages, Self::TEMPERATURE)
            .await?;

        let expected = state.script_draft.as_ref().map(|draft| draft.format());
        if let Some(off) = variants
            .iter()
            .find(|v| Some(v.ad_script.format()) != expected)
        {
            return Err(PipelineError::SchemaMismatch {
                node: VARIATION_GENERATION.to_string(),
                shape: FinalScriptVariants::SHAPE,
                message: format!(
                    "variant '{}' is a {} script; the approved draft is not",
                    off.variant_name,
                    off.ad_script.format()
                ),
            });
        }

        info!(count = variants.len(), "Script variants generated");
        Ok(AgentState {
            final_scripts_variants: Some(variants),
            ..state
        })
    }
}

#[async_trait]
impl Node<AgentState> for VariationGenerationNode {
    async fn run(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        self.execute(state)
            .await
            .inspect_err(|err| log_failure(VARIATION_GENERATION, err))
    }
}
