//! The two built-in pipelines and a session-level facade over them.
//!
//! ```text
//! Draft-and-refine:
//!   START → audience_insight → creative_strategy → script_generation
//!         → script_evaluation ─┬─► END (approved or ceiling reached)
//!                      ▲       └─► script_refinement ─┐
//!                      └──────────────────────────────┘
//!
//! Variations:
//!   START → variation_generation → END
//! ```

use pipeline::node_ids::{
    AUDIENCE_INSIGHT, CREATIVE_STRATEGY, SCRIPT_EVALUATION, SCRIPT_GENERATION, SCRIPT_REFINEMENT,
    VARIATION_GENERATION,
};
use pipeline::{
    AgentState, CampaignSession, CompiledGraph, DraftOutcome, GraphError, PipelineError,
    RefinementRouter, StateGraph, END, START,
};
use tracing::{info, info_span, warn, Instrument};

use crate::audience_insight::AudienceInsightNode;
use crate::creative_strategy::CreativeStrategyNode;
use crate::gateway::LlmGateway;
use crate::script_evaluation::ScriptEvaluationNode;
use crate::script_generation::ScriptGenerationNode;
use crate::script_refinement::ScriptRefinementNode;
use crate::variation_generation::VariationGenerationNode;

/// Assembles the draft-and-refine pipeline.
pub fn build_draft_and_refine_graph(
    gateway: &LlmGateway,
) -> Result<CompiledGraph<AgentState>, GraphError> {
    let mut builder = StateGraph::new();
    builder
        .add_node(AUDIENCE_INSIGHT, Box::new(AudienceInsightNode::new(gateway.clone())))
        .add_node(CREATIVE_STRATEGY, Box::new(CreativeStrategyNode::new(gateway.clone())))
        .add_node(SCRIPT_GENERATION, Box::new(ScriptGenerationNode::new(gateway.clone())))
        .add_node(SCRIPT_EVALUATION, Box::new(ScriptEvaluationNode::new(gateway.clone())))
        .add_node(SCRIPT_REFINEMENT, Box::new(ScriptRefinementNode::new(gateway.clone())))
        .add_edge(START, AUDIENCE_INSIGHT)
        .add_edge(AUDIENCE_INSIGHT, CREATIVE_STRATEGY)
        .add_edge(CREATIVE_STRATEGY, SCRIPT_GENERATION)
        .add_edge(SCRIPT_GENERATION, SCRIPT_EVALUATION)
        .add_conditional_edges(
            SCRIPT_EVALUATION,
            Box::new(RefinementRouter),
            [(SCRIPT_REFINEMENT, SCRIPT_REFINEMENT), (END, END)],
        )
        .add_edge(SCRIPT_REFINEMENT, SCRIPT_EVALUATION);
    builder.compile()
}

/// Assembles the single-node variation pipeline.
pub fn build_variation_graph(
    gateway: &LlmGateway,
) -> Result<CompiledGraph<AgentState>, GraphError> {
    let mut builder = StateGraph::new();
    builder
        .add_node(
            VARIATION_GENERATION,
            Box::new(VariationGenerationNode::new(gateway.clone())),
        )
        .add_edge(START, VARIATION_GENERATION)
        .add_edge(VARIATION_GENERATION, END);
    builder.compile()
}

/// Both pipelines, compiled once and reused for every run.
#[derive(Debug)]
pub struct AdScriptPipelines {
    draft: CompiledGraph<AgentState>,
    variations: CompiledGraph<AgentState>,
}

impl AdScriptPipelines {
    /// Compiles both pipelines against one gateway.
    pub fn new(gateway: &LlmGateway) -> Result<Self, GraphError> {
        Ok(Self {
            draft: build_draft_and_refine_graph(gateway)?,
            variations: build_variation_graph(gateway)?,
        })
    }

    pub fn draft_graph(&self) -> &CompiledGraph<AgentState> {
        &self.draft
    }

    pub fn variation_graph(&self) -> &CompiledGraph<AgentState> {
        &self.variations
    }

    /// Runs draft-and-refine to one of its two terminal outcomes.
    pub async fn run_draft(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        let span = info_span!(
            "draft_pipeline",
            goal = state.campaign_goal.as_str(),
            platform = state.ad_platform.as_str(),
        );
        async {
            let run = self.draft.invoke_traced(state).await?;
            match run.state.draft_outcome() {
                Some(DraftOutcome::Approved) => info!(
                    steps = run.visited.len(),
                    iterations = run.state.iteration_count,
                    "Draft approved"
                ),
                Some(DraftOutcome::BudgetExhausted) => warn!(
                    steps = run.visited.len(),
                    iterations = run.state.iteration_count,
                    "Draft not approved before the refinement ceiling"
                ),
                None => {}
            }
            Ok::<_, PipelineError>(run.state)
        }
        .instrument(span)
        .await
    }

    /// Runs variation generation on `state`.
    pub async fn run_variations(&self, state: AgentState) -> Result<AgentState, PipelineError> {
        self.variations
            .invoke(state)
            .instrument(info_span!("variation_pipeline"))
            .await
    }

    /// Runs draft-and-refine and stores the result in `session`.
    pub async fn generate_for_session<'s>(
        &self,
        session: &'s mut CampaignSession,
        state: AgentState,
    ) -> Result<&'s AgentState, PipelineError> {
        let result = self
            .run_draft(state)
            .instrument(info_span!("session", id = %session.id))
            .await?;
        Ok(session.record_workflow(result))
    }

    /// Runs variation generation on the session's workflow result and stores
    /// the outcome. Fails before any LLM call if there is no workflow result.
    pub async fn variations_for_session<'s>(
        &self,
        session: &'s mut CampaignSession,
    ) -> Result<&'s AgentState, PipelineError> {
        let base = session.require_workflow_result()?.clone();
        let result = self
            .run_variations(base)
            .instrument(info_span!("session", id = %session.id))
            .await?;
        Ok(session.record_variations(result))
    }
}
