//! Core domain for the ad-script pipeline.
//!
//! This crate contains every domain concept used to turn a campaign brief into
//! an evaluated ad script and a set of variants: the campaign inputs, the
//! structured artefacts each step produces, the agent state that threads them
//! together, the bounded refinement policy, and the state-graph engine that
//! runs the steps. Infrastructure crates implement the traits defined here;
//! they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ModelId`, `SessionId`) |
//! | [`types`] | Shared value types (`TokenCount`, `QualityScore`, `Timestamp`) |
//! | [`campaign`] | Brief, goal, platform, audience insights, creative strategy |
//! | [`script`] | Ad scripts, evaluation reports, variants |
//! | [`state`] | [`AgentState`] and [`DraftOutcome`] |
//! | [`structured`] | Decode-with-validation of JSON completions |
//! | [`ports`] | The [`LlmProvider`] port and its request/response types |
//! | [`graph`] | State-graph assembly, validation and execution |
//! | [`routing`] | The bounded refinement policy |
//! | [`node_ids`] | Node ids of the built-in pipelines |
//! | [`session`] | Per-user session holding the last results |
//! | [`errors`] | LLM, pipeline and graph error types |

pub mod campaign;
pub mod errors;
pub mod graph;
pub mod identifiers;
pub mod node_ids;
pub mod ports;
pub mod routing;
pub mod script;
pub mod session;
pub mod state;
pub mod structured;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use campaign::{
    AdPlatform, AudienceInsights, CampaignBrief, CampaignGoal, CreativeStrategy, ScriptFormat,
};
pub use errors::{GraphError, LlmError, PipelineError};
pub use graph::{CompiledGraph, GraphRun, Node, Router, StateGraph, END, START};
pub use identifiers::{ModelId, SessionId};
pub use ports::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, MessageRole,
    ResponseFormat, TokenUsage,
};
pub use routing::{
    route_after_evaluation, RefinementDecision, RefinementRouter, MAX_REFINEMENT_ITERATIONS,
};
pub use script::{
    AdScript, CriterionScore, EvaluationReport, FinalScriptVariants, Scene, ScriptVariant,
    StaticScript, VariantType, VideoScript,
};
pub use session::{CampaignSession, NO_BASE_SCRIPT};
pub use state::{AgentState, DraftOutcome};
pub use structured::{decode_structured, DecodeError, StructuredOutput};
pub use types::{QualityScore, Timestamp, TokenCount};
