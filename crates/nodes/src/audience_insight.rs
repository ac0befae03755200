//! Audience-Insight: brief → [`AudienceInsights`].

use async_trait::async_trait;
use pipeline::node_ids::AUDIENCE_INSIGHT;
use pipeline::{AgentState, AudienceInsights, Node, PipelineError};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::{log_failure, prompts};

/// Turns the brief into a picture of who the ad speaks to.
pub struct AudienceInsightNode {
    gateway: LlmGateway,
}

impl AudienceInsightNode {
    /// Sampling temperature.
    pub const TEMPERATURE: f32 = 0.4;

    /// Creates the Audience-Insight node on `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    async fn execute(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        let messages = prompts::audience_insight_messages(&state)?;
        let insights: AudienceInsights = self
            .gateway
            .invoke_structured(AUDIENCE_INSIGHT, messages, Self::TEMPERATURE)
            .await?;
        info!(
            pain_points = insights.pain_points.len(),
            motivations = insights.motivations.len(),
            "Audience insights ready"
        );
        Ok(AgentState {
            audience_insights: Some(insights),
            ..state
        })
    }
}

#[async_trait]
impl Node<AgentState> for AudienceInsightNode {
    async fn run(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        self.execute(state)
            .await
            .inspect_err(|err| log_failure(AUDIENCE_INSIGHT, err))
    }
}
