//! Script-Evaluation: draft → [`EvaluationReport`].

use async_trait::async_trait;
use pipeline::node_ids::SCRIPT_EVALUATION;
use pipeline::{AgentState, EvaluationReport, Node, PipelineError};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::{log_failure, prompts};

/// Scores the current draft and decides whether it is approved.
pub struct ScriptEvaluationNode {
    gateway: LlmGateway,
}

impl ScriptEvaluationNode {
    /// Sampling temperature for this node's request.
    pub const TEMPERATURE: f32 = 0.2;

    /// Creates the Script-Evaluation node on `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    async fn execute(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        let messages = prompts::script_evaluation_messages(&state)?;
        let report: EvaluationReport = self
            .gateway
            .invoke_structured(SCRIPT_EVALUATION, messages, Self::TEMPERATURE)
            .await?;
        info!(
            score = %report.overall_score,
            approved = report.is_approved_for_next_stage,
            iteration = state.iteration_count,
            "Script evaluated"
        );
        Ok(AgentState {
            evaluation_report: Some(report),
            ..state
        })
    }
}

#[async_trait]
impl Node<AgentState> for ScriptEvaluationNode {
    async fn run(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        self.execute(state)
            .await
            .inspect_err(|err| log_failure(SCRIPT_EVALUATION, err))
    }
}
