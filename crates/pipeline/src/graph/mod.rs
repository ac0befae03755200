//! State graph: nodes, plain edges, and conditional edges; compile, then invoke.
//!
//! A [`StateGraph`] is assembled with [`StateGraph::add_node`],
//! [`StateGraph::add_edge`] and [`StateGraph::add_conditional_edges`], then
//! validated by [`StateGraph::compile`]. The resulting [`CompiledGraph`] is
//! immutable and runs nodes strictly one after another.
//!
//! ```text
//! START ──► a ──► b ──► (router) ──► END
//!                 ▲          │
//!                 └── c ◄────┘
//! ```

mod builder;
mod compiled;
mod node;

pub use builder::StateGraph;
pub use compiled::{CompiledGraph, GraphRun};
pub use node::{Node, Router};

/// Virtual entry point. Only valid as the source of an edge.
pub const START: &str = "__start__";

/// Virtual exit point. Valid as an edge target and as a router label.
pub const END: &str = "__end__";

/// Default cap on node executions per invocation.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;
