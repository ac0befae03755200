//! Script-Generation: insights + strategy → first [`AdScript`] draft.
//!
//! The model is asked for the format named in the brief; a script of the
//! other format is rejected as a schema mismatch.

use async_trait::async_trait;
use pipeline::node_ids::SCRIPT_GENERATION;
use pipeline::{AdScript, AgentState, Node, PipelineError, ScriptFormat, StructuredOutput};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::{log_failure, prompts};

/// Writes the first draft in the format the brief asks for.
pub struct ScriptGenerationNode {
    gateway: LlmGateway,
}

impl ScriptGenerationNode {
    /// Sampling temperature; matches Creative-Strategy.
    pub const TEMPERATURE: f32 = 0.8;

    /// Creates the Script-Generation node on `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    async fn execute(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        let messages = prompts::script_generation_messages(&state)?;
        let script: AdScript = self
            .gateway
            .invoke_structured(SCRIPT_GENERATION, messages, Self::TEMPERATURE)
            .await?;
        ensure_format(SCRIPT_GENERATION, &script, state.brief.format)?;
        info!(format = %script.format(), "Script draft written");
        Ok(AgentState {
            script_draft: Some(script),
            ..state
        })
    }
}

#[async_trait]
impl Node<AgentState> for ScriptGenerationNode {
    async fn run(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        self.execute(state)
            .await
            .inspect_err(|err| log_failure(SCRIPT_GENERATION, err))
    }
}

/// Fails with a schema mismatch unless `script` is of the `expected` format.
pub(crate) fn ensure_format(
    node: &str,
    script: &AdScript,
    expected: ScriptFormat,
) -> Result<(), PipelineError> {
    if script.format() == expected {
        return Ok(());
    }
    Err(PipelineError::SchemaMismatch {
        node: node.to_string(),
        shape: AdScript::SHAPE,
        message: format!("expected a {expected} script, got {}", script.format()),
    })
}
