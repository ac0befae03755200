//! Node identifiers of the two built-in pipelines.
//!
//! The ids double as router labels: the refinement router answers
//! [`SCRIPT_REFINEMENT`] when it wants another pass.

pub const AUDIENCE_INSIGHT: &str = "audience_insight_node";
pub const CREATIVE_STRATEGY: &str = "creative_strategy_node";
pub const SCRIPT_GENERATION: &str = "script_generation_node";
pub const SCRIPT_EVALUATION: &str = "script_evaluation_node";
pub const SCRIPT_REFINEMENT: &str = "script_refinement_node";
pub const VARIATION_GENERATION: &str = "variation_generation_node";
