//! Creative-Strategy: insights → [`CreativeStrategy`].

use async_trait::async_trait;
use pipeline::node_ids::CREATIVE_STRATEGY;
use pipeline::{AgentState, CreativeStrategy, Node, PipelineError};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::{log_failure, prompts};

/// Picks the core message and creative angle from the audience insights.
pub struct CreativeStrategyNode {
    gateway: LlmGateway,
}

impl CreativeStrategyNode {
    /// Sampling temperature for this node's request.
    pub const TEMPERATURE: f32 = 0.8;

    /// Creates the Creative-Strategy node on `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    async fn execute(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        let messages = prompts::creative_strategy_messages(&state)?;
        let strategy: CreativeStrategy = self
            .gateway
            .invoke_structured(CREATIVE_STRATEGY, messages, Self::TEMPERATURE)
            .await?;
        info!(angle = %strategy.creative_angle, "Creative strategy chosen");
        Ok(AgentState {
            creative_strategy: Some(strategy),
            ..state
        })
    }
}

#[async_trait]
impl Node<AgentState> for CreativeStrategyNode {
    async fn run(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        self.execute(state)
            .await
            .inspect_err(|err| log_failure(CREATIVE_STRATEGY, err))
    }
}
