//! Ad-script pipeline nodes, the LLM gateway, and the pipeline assemblies.
//!
//! This crate provides the six node implementations (Audience-Insight through
//! Variation-Generation), the [`gateway::LlmGateway`] every node calls the LLM
//! through, the message builders that turn state into prompts, and the two
//! compiled pipelines.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Nodes sequence calls between business logic in the
//! [`pipeline`] crate and the [`pipeline::LlmProvider`] port. They contain no
//! domain rules of their own: preconditions, shapes and routing live in
//! `pipeline`.
//!
//! ## Failure handling
//!
//! Every node logs its failure at `error` with the node id and error kind,
//! then returns it unchanged. Nothing here retries.

pub mod audience_insight;
pub mod creative_strategy;
pub mod gateway;
pub mod graphs;
pub mod prompts;
pub mod script_evaluation;
pub mod script_generation;
pub mod script_refinement;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod variation_generation;

pub use audience_insight::AudienceInsightNode;
pub use creative_strategy::CreativeStrategyNode;
pub use gateway::{LlmGateway, DEFAULT_MODEL};
pub use graphs::{build_draft_and_refine_graph, build_variation_graph, AdScriptPipelines};
pub use script_evaluation::ScriptEvaluationNode;
pub use script_generation::ScriptGenerationNode;
pub use script_refinement::ScriptRefinementNode;
pub use variation_generation::VariationGenerationNode;

use pipeline::PipelineError;
use tracing::error;

fn log_failure(node: &str, err: &PipelineError) {
    error!(node, kind = err.kind(), error = %err, "Node failed");
}
