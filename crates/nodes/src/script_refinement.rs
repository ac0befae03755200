//! Script-Refinement: draft + feedback → revised draft.
//!
//! `iteration_count` is incremented only after the revised draft has been
//! produced, so a failed refinement does not consume budget. With a ceiling
//! of three this allows three refinements and four evaluations.

use async_trait::async_trait;
use pipeline::node_ids::SCRIPT_REFINEMENT;
use pipeline::{AdScript, AgentState, Node, PipelineError, MAX_REFINEMENT_ITERATIONS};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::script_generation::ensure_format;
use crate::{log_failure, prompts};

/// Rewrites the draft against the reviewer's feedback.
pub struct ScriptRefinementNode {
    gateway: LlmGateway,
}

impl ScriptRefinementNode {
    /// Sampling temperature for this node's request.
    pub const TEMPERATURE: f32 = 0.6;

    /// Creates the Script-Refinement node on `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    async fn execute(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        let messages = prompts::script_refinement_messages(&state)?;
        let expected = state
            .script_draft
            .as_ref()
            .map(AdScript::format)
            .unwrap_or(state.brief.format);

        let revised: AdScript = self
            .gateway
            .invoke_structured(SCRIPT_REFINEMENT, messages, Self::TEMPERATURE)
            .await?;
        ensure_format(SCRIPT_REFINEMENT, &revised, expected)?;

        let iteration_count = state.iteration_count + 1;
        info!(
            iteration = iteration_count,
            max = MAX_REFINEMENT_ITERATIONS,
            "Script revised"
        );
        Ok(AgentState {
            script_draft: Some(revised),
            iteration_count,
            ..state
        })
    }
}

#[async_trait]
impl Node<AgentState> for ScriptRefinementNode {
    async fn run(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        self.execute(state)
            .await
            .inspect_err(|err| log_failure(SCRIPT_REFINEMENT, err))
    }
}
