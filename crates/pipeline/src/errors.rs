//! Error taxonomy for the ad-script pipeline domain.
//!
//! Three layers, each with its own type:
//!
//! - [`LlmError`]: the LLM capability failed to answer (transport, auth,
//!   rate limit, upstream error, unreadable envelope).
//! - [`PipelineError`]: a node or pipeline invocation failed. Wraps
//!   [`LlmError`] with the failing node, and separates precondition failures
//!   and schema mismatches from transport failures.
//! - [`GraphError`]: a pipeline assembly was rejected at compile time.
//!
//! Refinement-budget exhaustion has no variant here: it is a terminal
//! outcome ([`crate::DraftOutcome::BudgetExhausted`]), not an error.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// LLM capability errors
// ---------------------------------------------------------------------------

/// Failures reported by an [`crate::LlmProvider`] implementation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    /// The request never reached the provider or the connection dropped.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider did not answer within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The credential was rejected (HTTP 401/403).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The provider throttled the request (HTTP 429).
    #[error("rate limited by provider")]
    RateLimited {
        /// Delay suggested by the provider's `Retry-After` header, if any.
        retry_after: Option<Duration>,
    },

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// The provider answered 2xx but the envelope was unreadable (no choices,
    /// no content, invalid JSON).
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The adapter could not be constructed from its configuration.
    #[error("provider configuration error: {0}")]
    Configuration(String),
}

// ---------------------------------------------------------------------------
// Node / pipeline errors
// ---------------------------------------------------------------------------

/// Failure of a node or of a whole pipeline invocation.
///
/// Nodes never swallow errors and pipelines never catch them: every variant
/// propagates to the caller, which may re-run the pipeline from scratch.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required state field was missing or blank when the node started.
    ///
    /// Raised before any remote call; never retried.
    #[error("{node}: precondition failed: {message}")]
    Precondition {
        /// Node that rejected the state.
        node: String,
        /// What was missing.
        message: String,
    },

    /// The LLM request itself failed.
    #[error("{node}: LLM request failed: {source}")]
    Llm {
        /// Node that issued the request.
        node: String,
        /// Underlying transport/provider error.
        #[source]
        source: LlmError,
    },

    /// The LLM answered, but not with a valid value of the requested shape.
    #[error("{node}: response did not match {shape}: {message}")]
    SchemaMismatch {
        /// Node that issued the request.
        node: String,
        /// Expected shape name.
        shape: &'static str,
        /// Decoder or validator message.
        message: String,
    },

    /// A router returned a label its conditional edge does not map.
    #[error("{node}: router returned unmapped label '{label}'")]
    Routing {
        /// Node whose outgoing conditional edge was evaluated.
        node: String,
        /// The offending label.
        label: String,
    },

    /// The executor took more steps than its recursion limit allows.
    #[error("recursion limit of {limit} steps reached without reaching END")]
    RecursionLimit {
        /// Configured step limit.
        limit: usize,
    },
}

impl PipelineError {
    /// Builds a [`PipelineError::Precondition`].
    pub fn precondition(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Precondition {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Precondition { .. } => "precondition",
            PipelineError::Llm { .. } => "llm",
            PipelineError::SchemaMismatch { .. } => "schema_mismatch",
            PipelineError::Routing { .. } => "routing",
            PipelineError::RecursionLimit { .. } => "recursion_limit",
        }
    }
}

// ---------------------------------------------------------------------------
// Graph assembly errors
// ---------------------------------------------------------------------------

/// Reasons a [`crate::graph::StateGraph`] refuses to compile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// No edge leaves `START`.
    #[error("graph has no entry edge from START")]
    MissingEntry,

    /// A node id was empty.
    #[error("node ids must not be empty")]
    EmptyNodeId,

    /// The same id was registered twice.
    #[error("node '{0}' registered more than once")]
    DuplicateNode(String),

    /// An edge or path map references a node that was never registered.
    #[error("{referenced_by} references unknown node '{node}'")]
    UnknownNode {
        /// The missing node id.
        node: String,
        /// Description of the referencing edge (e.g. `"edge from 'a'"`).
        referenced_by: String,
    },

    /// A registered node has no path from `START`.
    #[error("node '{0}' is unreachable from START")]
    UnreachableNode(String),

    /// A registered node has no outgoing transition.
    #[error("node '{0}' has no outgoing edge")]
    DanglingNode(String),

    /// A node has more than one outgoing transition.
    #[error("node '{0}' has more than one outgoing transition")]
    ConflictingEdges(String),

    /// A router label has no destination in the path map.
    #[error("conditional edge from '{from}' has no target for label '{label}'")]
    MissingBranchTarget {
        /// Node owning the conditional edge.
        from: String,
        /// The unmapped label.
        label: String,
    },

    /// The path map contains a label the router never returns.
    #[error("conditional edge from '{from}' maps label '{label}' that the router never returns")]
    UnknownBranchLabel {
        /// Node owning the conditional edge.
        from: String,
        /// The unexpected label.
        label: String,
    },
}
